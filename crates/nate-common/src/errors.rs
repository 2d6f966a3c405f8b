use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Control signals raised while accepting user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The input matched a reserved termination token; the caller should end
    /// the session instead of advancing it.
    #[error("session terminated by user input {0:?}")]
    Termination(String),
}

/// Failures raised by tool registration, argument validation and table
/// queries. A dispatch either fully succeeds or returns one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    #[error("{tool} is missing required args {missing:?}")]
    MissingArgument { tool: String, missing: Vec<String> },

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("unknown artifact: {0}")]
    UnknownArtifact(String),

    #[error("unknown columns {0:?}")]
    UnknownColumn(Vec<String>),

    #[error("invalid column name {0:?}: only letters, digits, underscore and space are allowed")]
    InvalidColumnName(String),

    #[error("operator {0:?} is not allowed")]
    DisallowedOperator(String),

    #[error("cannot cast {value:?} to {target}")]
    TypeCast { value: String, target: String },

    #[error("row limit {0} is out of range [1, 20]")]
    InvalidLimit(i64),

    #[error("tool execution failed: {0}")]
    Execution(String),
}

/// Failures talking to the external biodiversity data provider.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed payload: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("{0}")]
    Other(String),
}
