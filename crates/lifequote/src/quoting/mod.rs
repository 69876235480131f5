//! The quoting pipeline: eligibility rules on one side, priced quotes on
//! the other, composed by [`service::QuoteService`] and exposed through
//! [`router::quote_router`].

pub mod eligibility;
pub mod quotes;
pub mod router;
pub mod service;

pub use router::quote_router;
pub use service::{QuoteService, QuoteServiceError};
