/// Errors raised while constructing a [`Value`](crate::Value).
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("invalid base64 in byte literal: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid RFC 3339 date `{input}`: {source}")]
    Date {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("failed to convert value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot {operation} a value of kind `{kind}`")]
    NotAContainer {
        operation: &'static str,
        kind: &'static str,
    },
}
