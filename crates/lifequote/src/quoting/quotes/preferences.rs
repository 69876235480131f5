use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::quoting::eligibility::CoverageType;

/// Per-agency carrier visibility, split by coverage universe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierPreferences {
    #[serde(rename = "termPreferences", default)]
    pub term: BTreeMap<String, bool>,
    #[serde(rename = "fexPreferences", default)]
    pub fex: BTreeMap<String, bool>,
}

impl CarrierPreferences {
    pub fn mask(&self, coverage: CoverageType) -> PreferenceMask {
        let entries = match coverage {
            CoverageType::Term => &self.term,
            CoverageType::Fex => &self.fex,
        };
        PreferenceMask {
            entries: entries.clone(),
        }
    }
}

/// Visibility filter applied after eligibility aggregation. Carriers the
/// mask does not mention stay visible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceMask {
    entries: BTreeMap<String, bool>,
}

impl PreferenceMask {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<String, bool>) -> Self {
        Self { entries }
    }

    pub fn is_visible(&self, carrier: &str) -> bool {
        self.entries.get(carrier).copied().unwrap_or(true)
    }

    pub fn suppress(&mut self, carrier: &str) {
        self.entries.insert(carrier.to_string(), false);
    }
}

/// Storage seam for carrier preferences keyed by requesting agency.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, agency_id: &str) -> Result<Option<CarrierPreferences>, PreferenceStoreError>;
    fn save(
        &self,
        agency_id: &str,
        preferences: &CarrierPreferences,
    ) -> Result<(), PreferenceStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceStoreError {
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_carriers_stay_visible() {
        let mut mask = PreferenceMask::allow_all();
        assert!(mask.is_visible("Gerber"));

        mask.suppress("Gerber");
        assert!(!mask.is_visible("Gerber"));
        assert!(mask.is_visible("Foresters (PlanRight)"));
    }

    #[test]
    fn mask_picks_the_coverage_universe() {
        let mut preferences = CarrierPreferences::default();
        preferences.term.insert("Foresters (Your Term)".to_string(), false);
        preferences.fex.insert("Foresters (PlanRight)".to_string(), true);

        let term = preferences.mask(CoverageType::Term);
        assert!(!term.is_visible("Foresters (Your Term)"));
        assert!(term.is_visible("Foresters (PlanRight)"));

        let fex = preferences.mask(CoverageType::Fex);
        assert!(fex.is_visible("Foresters (Your Term)"));
    }
}
