use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatingsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("No profitable trading opportunity: {0}")]
    NoProfitableOpportunity(String),

    #[error("External fetch error: {0}")]
    ExternalFetch(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl RatingsError {
    /// Prefix the message with the operation that failed, keeping the variant.
    pub fn context(self, operation: impl std::fmt::Display) -> Self {
        match self {
            RatingsError::NotFound(m) => RatingsError::NotFound(format!("{}: {}", operation, m)),
            RatingsError::Validation(m) => RatingsError::Validation(format!("{}: {}", operation, m)),
            RatingsError::InsufficientData(m) => {
                RatingsError::InsufficientData(format!("{}: {}", operation, m))
            }
            RatingsError::NoProfitableOpportunity(m) => {
                RatingsError::NoProfitableOpportunity(format!("{}: {}", operation, m))
            }
            RatingsError::ExternalFetch(m) => {
                RatingsError::ExternalFetch(format!("{}: {}", operation, m))
            }
            RatingsError::Persistence(m) => RatingsError::Persistence(format!("{}: {}", operation, m)),
        }
    }
}

pub type RatingsResult<T> = Result<T, RatingsError>;
