use std::path::PathBuf;
use thiserror::Error;

/// Result type for augmentation operations
pub type Result<T> = std::result::Result<T, AugmentError>;

/// Errors that can occur while augmenting calls
///
/// None of these abort a batch. File-level errors mark the source unusable
/// for the rest of the run; the others only affect the call being decoded.
#[derive(Error, Debug)]
pub enum AugmentError {
    /// Source file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file did not parse cleanly
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Source file exceeds the configured size limit
    #[error("Source file {} is {size} bytes, limit is {limit}", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Source file is empty
    #[error("Source file {} is empty", .path.display())]
    EmptyFile { path: PathBuf },

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// Line number outside the file
    #[error("Line {line} is outside the file ({lines} lines)")]
    LineOutOfRange { line: usize, lines: usize },

    /// No syntax node starts at or after the line
    #[error("No syntax node at or after line {line}")]
    NotLocatable { line: usize },

    /// Located node is neither a call nor a function declaration
    #[error("Unhandled node kind: {kind}")]
    UnhandledNode { kind: String },

    /// Call argument expression has no decoding rule
    #[error("Unhandled argument kind: {kind}")]
    UnhandledArgument { kind: String },

    /// Argument declaration cannot be classified
    #[error("Unclassifiable argument `{name}`: {reason}")]
    Unclassifiable { name: String, reason: &'static str },

    /// Type expression cannot be reduced to a base name
    #[error("Unsupported type expression: {kind}")]
    UnsupportedType { kind: String },

    /// Fewer raw words left than the type needs
    #[error("Type {type_name} needs {needed} word(s), {available} left")]
    MissingWords {
        type_name: String,
        needed: usize,
        available: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file did not deserialize
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AugmentError {
    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitter(msg.into())
    }
}
