use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid holiday date '{value}': {source}")]
    InvalidHolidayDate {
        value: String,
        source: chrono::ParseError,
    },
}
