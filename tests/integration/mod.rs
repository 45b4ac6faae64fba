/// Integration test target: on-disk storage and full MCP sessions
mod basic_integration;
mod mcp_session;
