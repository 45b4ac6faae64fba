/// MCP (Model Context Protocol) message structures and JSON-RPC handling
///
/// This module defines the JSON-RPC message format that MCP clients use to
/// talk to the habit streak server. Field names on the wire are camelCase.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::StorageError;
use crate::tools::ToolError;

/// MCP protocol version we support
pub const MCP_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request message
///
/// A request without an `id` is a notification and gets no response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request identifier, absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
    /// The method to call (e.g., "tools/call")
    pub method: String,
    /// Parameters for the method call
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response message
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID that we're responding to
    pub id: Value,
    /// Successful result (if no error occurred)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (if something went wrong)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code (standard JSON-RPC codes)
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP tool call parameters
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call (e.g., "habit_create")
    pub name: String,
    /// Arguments to pass to the tool
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// MCP tool call result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Tool execution results
    pub content: Vec<ToolContent>,
    /// Whether this is an error result
    pub is_error: bool,
}

/// Content returned by a tool
#[derive(Debug, Serialize)]
pub struct ToolContent {
    /// Type of content (always "text")
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// MCP tool definition
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (e.g., "habit_create")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

/// MCP server capabilities
#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tools capability information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// The tool list never changes at runtime
    pub list_changed: bool,
}

/// MCP initialization request
///
/// Every field is optional; the server answers regardless of what the client
/// announces.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: Option<String>,
    pub client_info: Option<ClientInfo>,
}

/// Information about the MCP client
#[derive(Debug, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// MCP initialization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Information about this server
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// JSON-RPC error codes
pub mod error_codes {
    /// Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The requested method doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Method exists but parameters are wrong
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application-specific codes live in -32000 to -32099
    /// The specified habit or log doesn't exist
    pub const NOT_FOUND: i32 = -32001;
    /// Input validation failed
    pub const VALIDATION_ERROR: i32 = -32003;
    /// Database or storage operation failed
    pub const STORAGE_ERROR: i32 = -32004;
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }
}

impl ToolCallResult {
    /// A successful result: the human-readable message, then the structured payload
    pub fn success(message: String, payload: String) -> Self {
        Self {
            content: vec![ToolContent::text(message), ToolContent::text(payload)],
            is_error: false,
        }
    }

    /// An error result
    pub fn error(error_message: String) -> Self {
        Self {
            content: vec![ToolContent::text(format!("Error: {}", error_message))],
            is_error: true,
        }
    }
}

impl ToolContent {
    pub fn text(text: String) -> Self {
        Self {
            content_type: "text".to_string(),
            text,
        }
    }
}

/// Map a tool failure to the JSON-RPC error code reported to the client
pub fn tool_error_to_json_rpc_code(error: &ToolError) -> i32 {
    match error {
        ToolError::InvalidParams(_) => error_codes::INVALID_PARAMS,
        ToolError::Domain(_) => error_codes::VALIDATION_ERROR,
        ToolError::Storage(StorageError::HabitNotFound { .. })
        | ToolError::Storage(StorageError::LogNotFound { .. }) => error_codes::NOT_FOUND,
        ToolError::Storage(StorageError::Serialization(_)) => error_codes::INTERNAL_ERROR,
        ToolError::Storage(_) => error_codes::STORAGE_ERROR,
    }
}
