use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use lifequote::config::RuleConfig;
use lifequote::quoting::eligibility::{CoverageType, RuleRepository};
use lifequote::quoting::quotes::{
    CarrierPreferences, PreferenceStore, PreferenceStoreError, PricingError, PricingSource,
    QuoteRequest, QuoteSort, RawQuote, Sex, UnderwritingClass,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load both rule sheets from the configured paths. Failures degrade to an
/// unavailable coverage inside the repository.
pub(crate) fn load_rules(config: &RuleConfig) -> RuleRepository {
    let mut repository = RuleRepository::new();
    repository.load_sheet_path(CoverageType::Term, &config.term_sheet);
    repository.load_sheet_path(CoverageType::Fex, &config.fex_sheet);
    repository
}

#[derive(Default)]
pub(crate) struct InMemoryPreferenceStore {
    entries: Mutex<HashMap<String, CarrierPreferences>>,
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load(&self, agency_id: &str) -> Result<Option<CarrierPreferences>, PreferenceStoreError> {
        let guard = self.entries.lock().expect("preference mutex poisoned");
        Ok(guard.get(agency_id).cloned())
    }

    fn save(
        &self,
        agency_id: &str,
        preferences: &CarrierPreferences,
    ) -> Result<(), PreferenceStoreError> {
        let mut guard = self.entries.lock().expect("preference mutex poisoned");
        guard.insert(agency_id.to_string(), preferences.clone());
        Ok(())
    }
}

const TERM_PLANS: &[(&str, &str, f64)] = &[
    ("American Amicable (Term Made Simple)", "Term Made Simple", 0.92),
    ("Foresters (Your Term)", "Your Term", 0.97),
    ("Mutual of Omaha (Term Life Express)", "Term Life Express", 1.0),
    ("Protective (Classic Choice Term)", "Classic Choice Term", 1.05),
    ("Royal Neighbors (Jet Term)", "Jet Term", 1.12),
];

const FEX_PLANS: &[(&str, &str, f64)] = &[
    ("Aetna (Protection Series)", "Protection Series", 0.95),
    ("Foresters (PlanRight)", "PlanRight", 1.0),
    ("Gerber", "Guaranteed Life", 1.18),
    ("Mutual of Omaha (Living Promise)", "Living Promise", 0.9),
    ("Royal Neighbors (Ensured Legacy)", "Ensured Legacy", 1.07),
];

/// Deterministic in-memory rate table standing in for the production rate
/// store. Rates follow the usual per-thousand age bands.
pub(crate) struct StaticRateTable {
    today: NaiveDate,
}

impl StaticRateTable {
    pub(crate) fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl PricingSource for StaticRateTable {
    fn quotes(&self, request: &QuoteRequest) -> Result<Vec<RawQuote>, PricingError> {
        let age = request
            .applicant_age(self.today)
            .ok_or(PricingError::MissingParameter("age or birthday"))?;
        let face = f64::from(request.face_amount);

        let (plans, base, tier_name) = match request.coverage {
            CoverageType::Term => {
                let term_length = request
                    .term_length
                    .ok_or(PricingError::MissingParameter("termLength"))?;
                let mut base = face / 1000.0
                    * term_rate_per_thousand(age, request.sex)
                    * term_length_factor(term_length);
                if request.tobacco {
                    base *= 2.2;
                }
                let tier = if request.tobacco { "Tobacco" } else { "Preferred" };
                (TERM_PLANS, base, tier)
            }
            CoverageType::Fex => {
                let class = request
                    .underwriting_class
                    .unwrap_or(UnderwritingClass::Level);
                let mut base =
                    face / 1000.0 * fex_rate_per_thousand(age, request.sex) * class_factor(class);
                if request.tobacco {
                    base *= 1.6;
                }
                (FEX_PLANS, base, class.tier_name())
            }
        };

        Ok(plans
            .iter()
            .map(|(carrier, plan_name, factor)| {
                let monthly = round_cents(base * factor);
                RawQuote {
                    carrier: carrier.to_string(),
                    plan_name: plan_name.to_string(),
                    tier_name: tier_name.to_string(),
                    monthly_premium: monthly,
                    annual_premium: round_cents(monthly * 12.0),
                    warnings: None,
                    eapp: None,
                }
            })
            .collect())
    }
}

fn term_rate_per_thousand(age: u8, sex: Sex) -> f64 {
    let male = matches!(sex, Sex::Male);
    match age {
        0..=30 => {
            if male {
                0.16
            } else {
                0.14
            }
        }
        31..=40 => {
            if male {
                0.22
            } else {
                0.18
            }
        }
        41..=50 => {
            if male {
                0.42
            } else {
                0.36
            }
        }
        51..=60 => {
            if male {
                0.96
            } else {
                0.75
            }
        }
        61..=65 => {
            if male {
                1.75
            } else {
                1.36
            }
        }
        66..=70 => {
            if male {
                2.40
            } else {
                1.90
            }
        }
        _ => {
            if male {
                3.5
            } else {
                2.8
            }
        }
    }
}

fn term_length_factor(years: u8) -> f64 {
    match years {
        0..=10 => 0.7,
        11..=15 => 0.85,
        16..=20 => 1.0,
        21..=25 => 1.3,
        _ => 1.5,
    }
}

fn fex_rate_per_thousand(age: u8, sex: Sex) -> f64 {
    let male = matches!(sex, Sex::Male);
    match age {
        0..=50 => {
            if male {
                0.30
            } else {
                0.24
            }
        }
        51..=60 => {
            if male {
                0.50
            } else {
                0.40
            }
        }
        61..=70 => {
            if male {
                0.85
            } else {
                0.70
            }
        }
        71..=80 => {
            if male {
                1.35
            } else {
                1.10
            }
        }
        _ => {
            if male {
                2.10
            } else {
                1.70
            }
        }
    }
}

fn class_factor(class: UnderwritingClass) -> f64 {
    match class {
        UnderwritingClass::Level => 1.0,
        UnderwritingClass::GradedModified => 1.4,
        UnderwritingClass::Guaranteed => 1.9,
        UnderwritingClass::LimitedPay => 1.3,
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub(crate) fn parse_coverage(raw: &str) -> Result<CoverageType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "term" => Ok(CoverageType::Term),
        "fex" => Ok(CoverageType::Fex),
        other => Err(format!("unknown coverage '{other}', expected term or fex")),
    }
}

pub(crate) fn parse_sex(raw: &str) -> Result<Sex, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "male" | "m" => Ok(Sex::Male),
        "female" | "f" => Ok(Sex::Female),
        other => Err(format!("unknown sex '{other}', expected male or female")),
    }
}

pub(crate) fn parse_class(raw: &str) -> Result<UnderwritingClass, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "level" => Ok(UnderwritingClass::Level),
        "graded" | "graded/modified" => Ok(UnderwritingClass::GradedModified),
        "guaranteed" => Ok(UnderwritingClass::Guaranteed),
        "limited" | "limited pay" => Ok(UnderwritingClass::LimitedPay),
        other => Err(format!("unknown underwriting class '{other}'")),
    }
}

pub(crate) fn parse_sort(raw: &str) -> Result<QuoteSort, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "price" => Ok(QuoteSort::Price),
        "carrier" => Ok(QuoteSort::Carrier),
        other => Err(format!("unknown sort '{other}', expected price or carrier")),
    }
}
