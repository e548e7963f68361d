/// Failures the engine can name.
///
/// Only [`EngineError::MissingScore`] ever reaches a caller as an `Err`. The
/// facade logs the rest and turns them into `false`, `None` or an outcome
/// message.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid session state: {0}")]
    State(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("could not parse {field} from {value:?}")]
    Parse { field: String, value: String },

    #[error("cannot compare a score against a missing score")]
    MissingScore,
}

impl EngineError {
    pub fn parse(field: &str, value: &str) -> Self {
        EngineError::Parse {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
