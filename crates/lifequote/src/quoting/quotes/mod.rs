//! Priced-quote handling: applicant parameters, the pricing and preference
//! seams, and decline annotation of the final result list.

pub mod annotate;
pub mod domain;
pub mod preferences;
pub mod pricing;

pub use annotate::{annotate, sort_quotes};
pub use domain::{AnnotatedQuote, QuoteRequest, QuoteSort, RawQuote, Sex, UnderwritingClass};
pub use preferences::{CarrierPreferences, PreferenceMask, PreferenceStore, PreferenceStoreError};
pub use pricing::{PricingError, PricingSource};
