use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::quoting::eligibility::CoverageType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// FEX underwriting classes with their wire labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnderwritingClass {
    #[serde(rename = "level")]
    Level,
    #[serde(rename = "graded/modified")]
    GradedModified,
    #[serde(rename = "guaranteed")]
    Guaranteed,
    #[serde(rename = "limited pay")]
    LimitedPay,
}

impl UnderwritingClass {
    pub const fn tier_name(self) -> &'static str {
        match self {
            UnderwritingClass::Level => "Level Benefit",
            UnderwritingClass::GradedModified => "Graded Benefit",
            UnderwritingClass::Guaranteed => "Guaranteed Issue",
            UnderwritingClass::LimitedPay => "Limited Pay",
        }
    }
}

/// Normalized applicant parameters handed to the pricing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub coverage: CoverageType,
    pub face_amount: u32,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    pub sex: Sex,
    #[serde(default)]
    pub tobacco: bool,
    /// Term length in years; term coverage only.
    #[serde(default)]
    pub term_length: Option<u8>,
    /// FEX coverage only.
    #[serde(default)]
    pub underwriting_class: Option<UnderwritingClass>,
    pub state: String,
}

impl QuoteRequest {
    /// Explicit age wins; otherwise derive from the birthday, counting a
    /// year only once the birthday has passed.
    pub fn applicant_age(&self, today: NaiveDate) -> Option<u8> {
        if let Some(age) = self.age {
            return Some(age);
        }
        let birthday = self.birthday?;
        let mut age = today.year() - birthday.year();
        if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
            age -= 1;
        }
        u8::try_from(age).ok()
    }
}

/// One priced row from the pricing collaborator, before eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub carrier: String,
    pub plan_name: String,
    pub tier_name: String,
    pub monthly_premium: f64,
    pub annual_premium: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eapp: Option<String>,
}

/// A quote row with the aggregated underwriting outcome attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedQuote {
    #[serde(flatten)]
    pub quote: RawQuote,
    pub decline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
}

/// Caller-selected result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSort {
    #[default]
    Price,
    Carrier,
}
