//! Notebook protocol messages for the Bosque kernel.
//!
//! Defines the requests a notebook client sends, the replies the kernel
//! answers with, and the broadcast (IOPub) messages emitted while a request
//! is being served. The shapes follow the Jupyter messaging protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bosque_core::highlight::Token;

/// Jupyter messaging protocol version implemented by the kernel.
pub const PROTOCOL_VERSION: &str = "5.3";

/// Messages sent from client to kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum Request {
    /// Compile and run a cell.
    ExecuteRequest {
        /// Cell source.
        code: String,
        /// Suppress broadcast messages and do not count the execution.
        #[serde(default)]
        silent: bool,
        /// Count this execution in the execution counter.
        #[serde(default = "default_store_history")]
        store_history: bool,
    },

    /// Ask for kernel and language metadata.
    KernelInfoRequest,

    /// Tokenize source for syntax highlighting.
    HighlightRequest {
        /// Source to tokenize.
        code: String,
    },

    /// Stop the kernel.
    ShutdownRequest {
        /// Whether the client intends to start the kernel again.
        #[serde(default)]
        restart: bool,
    },
}

fn default_store_history() -> bool {
    true
}

impl Request {
    /// Shorthand for a non-silent execute request.
    pub fn execute(code: impl Into<String>) -> Self {
        Self::ExecuteRequest {
            code: code.into(),
            silent: false,
            store_history: true,
        }
    }
}

/// Kernel activity reported on the broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Busy,
    Idle,
}

/// Output stream a `stream` message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamName {
    Stdout,
    Stderr,
}

/// Broadcast messages emitted while serving a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum IopubMessage {
    /// Kernel became busy or idle.
    Status {
        /// New state.
        execution_state: ExecutionState,
    },

    /// Captured program output.
    Stream {
        /// Stream name.
        name: StreamName,
        /// Output text.
        text: String,
    },

    /// A cell failed.
    Error(ErrorContent),
}

/// Error description shared by `error` broadcasts and error replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContent {
    /// Error class (`CompilationError`, `ExecutionError`, ...).
    pub ename: String,
    /// Error message, including the child's diagnostic text.
    pub evalue: String,
    /// Always empty: the external toolchain provides no frames.
    #[serde(default)]
    pub traceback: Vec<String>,
}

impl ErrorContent {
    /// Describe a core error.
    pub fn from_error(error: &bosque_core::Error) -> Self {
        Self {
            ename: error.kind().to_string(),
            evalue: error.to_string(),
            traceback: Vec::new(),
        }
    }
}

/// Result of an execute request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecuteReply {
    /// The cell compiled and ran.
    Ok {
        /// Execution counter after this request.
        execution_count: u32,
        /// Unused, always empty.
        #[serde(default)]
        payload: Vec<Value>,
        /// Unused, always empty.
        #[serde(default)]
        user_expressions: Map<String, Value>,
    },

    /// The cell failed to compile or run.
    Error {
        /// Execution counter after this request.
        execution_count: u32,
        /// Error class.
        ename: String,
        /// Error message.
        evalue: String,
        /// Always empty.
        #[serde(default)]
        traceback: Vec<String>,
    },
}

impl ExecuteReply {
    /// Successful reply.
    pub fn ok(execution_count: u32) -> Self {
        Self::Ok {
            execution_count,
            payload: Vec::new(),
            user_expressions: Map::new(),
        }
    }

    /// Error reply describing `error`.
    pub fn error(execution_count: u32, error: ErrorContent) -> Self {
        Self::Error {
            execution_count,
            ename: error.ename,
            evalue: error.evalue,
            traceback: error.traceback,
        }
    }

    /// Returns true if the execution succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Execution counter carried by the reply.
    pub fn execution_count(&self) -> u32 {
        match self {
            Self::Ok { execution_count, .. } | Self::Error { execution_count, .. } => {
                *execution_count
            }
        }
    }
}

/// Language metadata advertised to the notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// Language name.
    pub name: String,
    /// Language version.
    pub version: String,
    /// MIME type of cell sources.
    pub mimetype: String,
    /// File extension of Bosque sources.
    pub file_extension: String,
    /// Name of the highlighting lexer.
    pub pygments_lexer: String,
}

/// Content of a `kernel_info_reply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelInfo {
    /// Always `ok`.
    pub status: String,
    /// Messaging protocol version.
    pub protocol_version: String,
    /// Kernel implementation name.
    pub implementation: String,
    /// Kernel implementation version.
    pub implementation_version: String,
    /// Language metadata.
    pub language_info: LanguageInfo,
    /// Banner shown by consoles.
    pub banner: String,
}

impl Default for KernelInfo {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            implementation: "BosqueKernel".to_string(),
            implementation_version: "1.0".to_string(),
            language_info: LanguageInfo {
                name: "bosque".to_string(),
                version: "1.0".to_string(),
                mimetype: "text/x-bosque".to_string(),
                file_extension: ".bsq".to_string(),
                pygments_lexer: "bosque".to_string(),
            },
            banner: "Bosque Language Kernel".to_string(),
        }
    }
}

/// Replies sent from kernel to client, one per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum Reply {
    /// Answer to `execute_request`.
    ExecuteReply(ExecuteReply),

    /// Answer to `kernel_info_request`.
    KernelInfoReply(KernelInfo),

    /// Answer to `highlight_request`.
    HighlightReply {
        /// Tokens covering the requested code.
        tokens: Vec<Token>,
    },

    /// Answer to `shutdown_request`.
    ShutdownReply {
        /// Echo of the request's restart flag.
        restart: bool,
    },

    /// The request could not be parsed or served.
    ProtocolError {
        /// Error description.
        message: String,
    },
}

/// A request as read from the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Client-chosen message id, echoed as `parent_msg_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,

    #[serde(flatten)]
    pub request: Request,
}

/// Channel an outgoing message belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum Outgoing {
    /// Broadcast message.
    Iopub(IopubMessage),
    /// Direct reply.
    Shell(Reply),
}

/// A message as written to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingEnvelope {
    /// Fresh message id.
    pub msg_id: String,

    /// Id of the request this message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_msg_id: Option<String>,

    #[serde(flatten)]
    pub message: Outgoing,
}

impl OutgoingEnvelope {
    /// Wrap `message` with a new message id.
    pub fn new(message: Outgoing, parent_msg_id: Option<String>) -> Self {
        Self {
            msg_id: uuid::Uuid::new_v4().to_string(),
            parent_msg_id,
            message,
        }
    }
}
