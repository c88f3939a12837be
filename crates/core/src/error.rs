#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A required input was missing or empty. Never reaches the network.
    #[error("Validation failed: {0}")]
    Validation(String),
}
