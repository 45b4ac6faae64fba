/// Unit test target exercising the public streak and progress API
mod basic_tests;
mod streak_properties;
