use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error("no valid messages found ({skipped} malformed headers skipped)")]
    UnparseableInput { skipped: usize },

    #[error("malformed timestamp '{date}, {time}': {reason}")]
    MalformedTimestamp {
        date: String,
        time: String,
        reason: String,
    },

    #[error("{engine} needs at least {needed} messages, got {got}")]
    AggregationInputEmpty {
        engine: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ChatError {
    pub(crate) fn malformed(date: &str, time: &str, reason: impl Into<String>) -> Self {
        ChatError::MalformedTimestamp {
            date: date.to_string(),
            time: time.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_not_enough_data(&self) -> bool {
        matches!(self, ChatError::AggregationInputEmpty { .. })
    }
}
