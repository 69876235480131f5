use super::domain::{QuoteRequest, RawQuote};

/// Premium lookup seam. Production implementations query the rate store;
/// tests and the CLI demo use in-memory tables.
pub trait PricingSource: Send + Sync {
    fn quotes(&self, request: &QuoteRequest) -> Result<Vec<RawQuote>, PricingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("missing applicant parameter: {0}")]
    MissingParameter(&'static str),
    #[error("pricing source unavailable: {0}")]
    Unavailable(String),
}
