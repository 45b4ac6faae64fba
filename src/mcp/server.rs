/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads line-delimited JSON-RPC requests
/// 2. Routes tool calls to the habit tools
/// 3. Writes JSON-RPC responses, one per line

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{HabitStreakServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit streak server
    habit_server: HabitStreakServer,
    /// Whether the client has confirmed initialization
    initialized: bool,
}

/// Why a tool call could not produce a tool result
type RpcFailure = (i32, String);

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_server: HabitStreakServer) -> Self {
        Self {
            habit_server,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve requests from `reader` until it is exhausted
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                    None,
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle a JSON-RPC request that expects a response
    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        match params.client_info {
            Some(client) => info!(
                "MCP client connected: {} {}",
                client.name,
                client.version.unwrap_or_default()
            ),
            None => info!("MCP client connected"),
        }
        if let Some(version) = params.protocol_version.filter(|v| v != MCP_VERSION) {
            warn!("Client requested protocol {}, answering with {}", version, MCP_VERSION);
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Streak MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        respond(id, &json!({ "tools": tool_definitions() }))
    }

    /// Handle tools/call request
    fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        debug!("Calling tool {}", tool_params.name);

        match self.call_tool(&tool_params.name, tool_params.arguments) {
            Ok(result) => respond(id, &result),
            Err((code, message)) => {
                JsonRpcResponse::error(id, code, message, Some(json!({ "tool": tool_params.name })))
            }
        }
    }

    /// Run a tool and render its response
    ///
    /// Failures the caller can correct come back as an error tool result;
    /// storage and internal failures become JSON-RPC errors.
    fn call_tool(&self, name: &str, args: Map<String, Value>) -> Result<ToolCallResult, RpcFailure> {
        let storage = self.habit_server.storage();
        let analytics = self.habit_server.analytics();
        let today = self.habit_server.clock().today();

        let outcome = match name {
            "habit_create" => {
                tools::create_habit(storage, parse_args(args)?).map(|r| render(&r.message, &r))
            }
            "habit_update" => {
                tools::update_habit(storage, parse_args(args)?).map(|r| render(&r.message, &r))
            }
            "habit_delete" => {
                tools::delete_habit(storage, parse_args(args)?).map(|r| render(&r.message, &r))
            }
            "habit_list" => tools::list_habits(storage, parse_args(args)?, today)
                .map(|r| render(&list_message(&r), &r)),
            "habit_log" => {
                tools::log_habit(storage, parse_args(args)?, today).map(|r| render(&r.message, &r))
            }
            "habit_log_delete" => {
                tools::delete_log(storage, parse_args(args)?).map(|r| render(&r.message, &r))
            }
            "habit_status" => tools::get_habit_status(storage, parse_args(args)?, today)
                .map(|r| render(&r.message, &r)),
            "habit_progress" => {
                tools::get_habit_progress(storage, analytics, parse_args(args)?, today)
                    .map(|r| render(&r.message, &r))
            }
            "habit_stats" => {
                tools::get_habit_stats(storage, analytics, parse_args(args)?, today)
                    .map(|r| render(&r.message, &r))
            }
            "habit_achievements" => tools::list_achievements(storage, parse_args(args)?)
                .map(|r| render(&r.message, &r)),
            _ => {
                return Err((
                    error_codes::INVALID_PARAMS,
                    format!("Unknown tool: {}", name),
                ))
            }
        };

        outcome.or_else(|e| tool_failure(name, e))
    }
}

fn tool_failure(name: &str, error: ToolError) -> Result<ToolCallResult, RpcFailure> {
    let code = tool_error_to_json_rpc_code(&error);
    match code {
        error_codes::STORAGE_ERROR | error_codes::INTERNAL_ERROR => {
            error!("Tool {} failed: {}", name, error);
            Err((code, error.to_string()))
        }
        _ => {
            debug!("Tool {} rejected the call: {}", name, error);
            Ok(ToolCallResult::error(error.to_string()))
        }
    }
}

/// Every tool this server offers, with schemas derived from the parameter types
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        definition::<tools::CreateHabitParams>(
            "habit_create",
            "Create a new habit with a daily, weekly, monthly, specific-days or multiple-times-daily schedule",
        ),
        definition::<tools::UpdateHabitParams>(
            "habit_update",
            "Change a habit's title, schedule, target or archived state",
        ),
        definition::<tools::DeleteHabitParams>(
            "habit_delete",
            "Delete a habit together with its whole history",
        ),
        definition::<tools::ListHabitsParams>(
            "habit_list",
            "List habits with their schedule and current streak",
        ),
        definition::<tools::LogHabitParams>(
            "habit_log",
            "Record whether a habit was done, partially done, skipped or failed on a day",
        ),
        definition::<tools::DeleteLogParams>(
            "habit_log_delete",
            "Remove a single log entry and recompute the streak",
        ),
        definition::<tools::StatusParams>(
            "habit_status",
            "Current and best streak, and whether a habit is due today",
        ),
        definition::<tools::ProgressParams>(
            "habit_progress",
            "Completed versus expected occurrences over a date range (default last 30 days)",
        ),
        definition::<tools::StatsParams>(
            "habit_stats",
            "Completions, weekday activity and the best streak across all habits",
        ),
        definition::<tools::AchievementsParams>(
            "habit_achievements",
            "Streak milestones each habit has reached, newest first",
        ),
    ]
}

fn definition<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(P);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" })),
    }
}

fn parse_args<P: DeserializeOwned>(args: Map<String, Value>) -> Result<P, RpcFailure> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| (error_codes::INVALID_PARAMS, format!("Invalid arguments: {}", e)))
}

fn render<T: Serialize>(message: &str, response: &T) -> ToolCallResult {
    let payload = serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!("{{\"error\": \"unserializable response: {}\"}}", e));
    ToolCallResult::success(message.to_string(), payload)
}

fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {}", e),
            None,
        ),
    }
}

fn list_message(response: &tools::ListHabitsResponse) -> String {
    if response.habits.is_empty() {
        return "No habits found. Create your first habit to get started!".to_string();
    }

    let details = response
        .habits
        .iter()
        .map(|h| {
            format!(
                "🎯 **{}** ({})\n   📅 {} | 🔥 Streak: {} | 🏆 Best: {}{}{}",
                h.title,
                h.habit_id,
                h.frequency,
                h.current_streak,
                h.longest_streak,
                h.target.as_ref().map(|t| format!(" | 🎯 Target: {}", t)).unwrap_or_default(),
                if h.archived { " 📦 (archived)" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("📋 **Habit Summary** ({} habits)\n\n{}", response.total_habits, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HabitStreakServer;

    fn server() -> McpServer {
        McpServer::new(HabitStreakServer::in_memory().unwrap())
    }

    async fn call(server: &mut McpServer, line: &str) -> JsonRpcResponse {
        server.process_line(line).await.unwrap()
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let mut server = server();
        let reply = server
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(reply.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_json() {
        let mut server = server();

        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#).await;
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let response = call(&mut server, "{not json").await;
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
        assert_eq!(response.id, Value::Null);
    }

    #[tokio::test]
    async fn test_tools_list_has_generated_schemas() {
        let mut server = server();
        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 10);

        let create = tools.iter().find(|t| t["name"] == "habit_create").unwrap();
        let required = create["inputSchema"]["required"].as_array().unwrap();
        assert!(required.contains(&json!("title")));
        assert!(required.contains(&json!("frequency")));
    }

    #[tokio::test]
    async fn test_validation_failure_is_a_tool_error() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"habit_create","arguments":{"title":"Run","frequency":"hourly"}}}"#,
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        assert!(result["content"][0]["text"].as_str().unwrap().contains("Invalid frequency"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_params() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"habit_log","arguments":{}}}"#,
        )
        .await;
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }
}
