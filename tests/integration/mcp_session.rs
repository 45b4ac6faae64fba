/// Full JSON-RPC sessions through the MCP server
use habit_streak_mcp::*;
use serde_json::{json, Value};

fn request(id: u64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    request(id, "tools/call", json!({"name": name, "arguments": arguments}))
}

fn responses(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is one JSON response"))
        .collect()
}

/// The structured payload of a successful tool result
fn payload(response: &Value) -> Value {
    let text = response["result"]["content"][1]["text"].as_str().expect("payload text");
    serde_json::from_str(text).expect("payload is JSON")
}

#[cfg(test)]
mod mcp_session_tests {
    use super::*;

    #[tokio::test]
    async fn test_handshake_session() {
        let input = [
            request(1, "initialize", json!({"protocolVersion": "2024-11-05", "clientInfo": {"name": "test", "version": "1"}})),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
            request(2, "ping", json!({})),
            request(3, "tools/list", json!({})),
        ]
        .join("\n");

        let mut server = McpServer::new(HabitStreakServer::in_memory().unwrap());
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let replies = responses(&output);
        // The notification gets no reply
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["result"]["protocolVersion"], json!(protocol::MCP_VERSION));
        assert_eq!(replies[1]["id"], json!(2));
        assert_eq!(replies[2]["result"]["tools"].as_array().unwrap().len(), tool_definitions().len());
        assert!(server.is_initialized());
    }

    #[test]
    fn test_create_log_and_status_session() {
        let mut server = McpServer::new(HabitStreakServer::in_memory().unwrap());

        tokio_test::block_on(async {
            let created = server
                .process_line(&tool_call(1, "habit_create", json!({"title": "Read", "frequency": "daily", "target_quantity": 20, "unit": "pages"})))
                .await
                .unwrap();
            let created = serde_json::to_value(created).unwrap();
            let habit_id = payload(&created)["habit_id"].as_str().unwrap().to_string();

            for (id, day) in [(2, "2024-03-01"), (3, "2024-03-02")] {
                server
                    .process_line(&tool_call(id, "habit_log", json!({"habit_id": habit_id, "date": day})))
                    .await
                    .unwrap();
            }
            let logged = server
                .process_line(&tool_call(4, "habit_log", json!({"habit_id": habit_id, "date": "2024-03-03", "quantity": 25})))
                .await
                .unwrap();
            let logged = serde_json::to_value(logged).unwrap();
            assert_eq!(payload(&logged)["streak"]["current_streak"], json!(3));
            assert_eq!(payload(&logged)["new_achievements"][0]["milestone"], json!(3));

            let achievements = server
                .process_line(&tool_call(7, "habit_achievements", json!({"habit_id": habit_id})))
                .await
                .unwrap();
            let achievements = serde_json::to_value(achievements).unwrap();
            assert_eq!(payload(&achievements)["achievements"].as_array().unwrap().len(), 1);

            let progress = server
                .process_line(&tool_call(5, "habit_progress", json!({"habit_id": habit_id, "start_date": "2024-03-01", "end_date": "2024-03-04"})))
                .await
                .unwrap();
            let progress = serde_json::to_value(progress).unwrap();
            let report = &payload(&progress)["report"];
            assert_eq!(report["completed"], json!(3));
            assert_eq!(report["expected"], json!(4));
            assert_eq!(report["percentage"], json!(75));

            let unknown = server
                .process_line(&tool_call(6, "habit_log", json!({"habit_id": HabitId::new().to_string()})))
                .await
                .unwrap();
            let unknown = serde_json::to_value(unknown).unwrap();
            assert_eq!(unknown["result"]["isError"], json!(true));
        });
    }

    #[tokio::test]
    async fn test_undated_log_lands_on_the_configured_zone_day() {
        let clock: Clock = "Pacific/Kiritimati".parse().unwrap();
        let server = HabitStreakServer::in_memory().unwrap().with_clock(clock);
        assert_eq!(server.clock(), clock);
        let mut server = McpServer::new(server);

        let created = server
            .process_line(&tool_call(1, "habit_create", json!({"title": "Swim", "frequency": "daily"})))
            .await
            .unwrap();
        let created = serde_json::to_value(created).unwrap();
        let habit_id = payload(&created)["habit_id"].as_str().unwrap().to_string();

        let logged = server
            .process_line(&tool_call(2, "habit_log", json!({"habit_id": habit_id})))
            .await
            .unwrap();
        let logged = serde_json::to_value(logged).unwrap();
        assert_eq!(
            payload(&logged)["streak"]["last_completion_date"],
            json!(clock.today().to_string())
        );
    }
}
