use thiserror::Error;

/// Errors surfaced by the transformer and by the runtime contract model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The source text could not be parsed as a TS/JSX module.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Options coming from the JS side were not valid JSON for `TemplateOptions`.
    #[error("invalid transform options: {0}")]
    InvalidOptions(String),

    /// The namespace loader rejected a request.
    #[error("failed to load namespaces for locale '{locale}': {message}")]
    NamespaceLoad { locale: String, message: String },
}

impl TransformError {
    pub fn parse(path: &str, message: impl Into<String>) -> Self {
        TransformError::Parse {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::InvalidOptions(err.to_string())
    }
}
