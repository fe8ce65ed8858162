use super::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid sort selection: '{0}'")]
    InvalidSortSelection(String),
}
