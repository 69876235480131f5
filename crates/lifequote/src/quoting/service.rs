use std::sync::Arc;

use tracing::warn;

use super::eligibility::{
    aggregate, AnswerOutcome, ConditionTree, CoverageType, RuleRepository, SelectedCondition,
};
use super::quotes::annotate::annotate;
use super::quotes::domain::{AnnotatedQuote, QuoteRequest, QuoteSort};
use super::quotes::preferences::{
    CarrierPreferences, PreferenceMask, PreferenceStore, PreferenceStoreError,
};
use super::quotes::pricing::{PricingError, PricingSource};

/// Composes the rule repository with the pricing and preference seams.
///
/// Every operation is a pure function of its inputs plus the read-only rule
/// data, so one service instance can serve concurrent sessions without
/// coordination.
pub struct QuoteService<P, S> {
    rules: Arc<RuleRepository>,
    pricing: Arc<P>,
    preferences: Arc<S>,
}

impl<P, S> QuoteService<P, S>
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    pub fn new(rules: Arc<RuleRepository>, pricing: Arc<P>, preferences: Arc<S>) -> Self {
        Self {
            rules,
            pricing,
            preferences,
        }
    }

    pub fn rules(&self) -> &RuleRepository {
        &self.rules
    }

    pub fn condition_names(&self, coverage: CoverageType) -> Vec<String> {
        self.rules
            .condition_names(coverage)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn search_conditions(&self, coverage: CoverageType, query: &str) -> Vec<String> {
        self.rules.search(coverage, query)
    }

    pub fn condition_tree(&self, coverage: CoverageType, name: &str) -> Option<ConditionTree> {
        self.rules.tree(coverage, name).cloned()
    }

    /// Record one answer for a selected condition and advance its walk. A
    /// condition missing from the rule data ends the walk with no verdicts
    /// instead of failing the session.
    pub fn submit_answer(
        &self,
        coverage: CoverageType,
        selection: &mut SelectedCondition,
        question_text: &str,
        value: &str,
    ) -> AnswerOutcome {
        match self.rules.tree(coverage, &selection.name) {
            Some(tree) => selection.submit_answer(tree, question_text, value),
            None => {
                warn!(
                    condition = %selection.name,
                    coverage = coverage.label(),
                    "condition missing from rule data, treating as undetermined"
                );
                selection
                    .answers
                    .insert(question_text.to_string(), value.to_string());
                selection.final_result_id = None;
                AnswerOutcome::Undetermined
            }
        }
    }

    /// End-to-end pipeline: price, aggregate eligibility, annotate, filter,
    /// sort.
    pub fn annotated_quotes(
        &self,
        agency_id: Option<&str>,
        request: &QuoteRequest,
        conditions: &[SelectedCondition],
        sort: QuoteSort,
    ) -> Result<Vec<AnnotatedQuote>, QuoteServiceError> {
        let raw = self.pricing.quotes(request)?;
        let carriers: Vec<String> = raw.iter().map(|quote| quote.carrier.clone()).collect();
        let verdicts = aggregate(conditions, &self.rules, request.coverage, &carriers);
        let mask = self.preference_mask(agency_id, request.coverage);
        Ok(annotate(raw, &verdicts, &mask, sort))
    }

    /// Preference lookup fails open to all-visible.
    pub fn preference_mask(&self, agency_id: Option<&str>, coverage: CoverageType) -> PreferenceMask {
        let Some(agency_id) = agency_id else {
            return PreferenceMask::allow_all();
        };
        match self.preferences.load(agency_id) {
            Ok(Some(preferences)) => preferences.mask(coverage),
            Ok(None) => PreferenceMask::allow_all(),
            Err(err) => {
                warn!(
                    agency = agency_id,
                    error = %err,
                    "preference store failed, showing all carriers"
                );
                PreferenceMask::allow_all()
            }
        }
    }

    pub fn load_preferences(
        &self,
        agency_id: &str,
    ) -> Result<Option<CarrierPreferences>, PreferenceStoreError> {
        self.preferences.load(agency_id)
    }

    pub fn save_preferences(
        &self,
        agency_id: &str,
        preferences: &CarrierPreferences,
    ) -> Result<(), PreferenceStoreError> {
        self.preferences.save(agency_id, preferences)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteServiceError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Preferences(#[from] PreferenceStoreError),
}
