use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::matcher::carrier_names_match;
use super::repository::RuleRepository;
use super::rules::{CoverageType, UnderwritingVerdict};
use super::session::SelectedCondition;
use super::traversal::{resolve, Resolution};

/// Aggregated underwriting outcome for one carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierVerdict {
    pub declined: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CarrierVerdict {
    pub fn accepted() -> Self {
        Self {
            declined: false,
            reason: None,
        }
    }

    fn declined(reason: String) -> Self {
        Self {
            declined: true,
            reason: Some(reason),
        }
    }
}

/// Reduce every selected condition's verdicts to one outcome per carrier.
///
/// Per carrier this is a left fold over the conditions in selection order
/// with decline as the absorbing element: the first decline found keeps its
/// reason and no later condition can clear it. Carriers no condition
/// mentions stay accepted, as does everything when the selection is empty
/// or the repository is unavailable.
pub fn aggregate(
    conditions: &[SelectedCondition],
    repository: &RuleRepository,
    coverage: CoverageType,
    quote_carriers: &[String],
) -> BTreeMap<String, CarrierVerdict> {
    let resolved = resolve_conditions(conditions, repository, coverage);

    quote_carriers
        .iter()
        .map(|carrier| {
            let verdict = resolved
                .iter()
                .fold(CarrierVerdict::accepted(), |acc, (name, verdicts)| {
                    if acc.declined {
                        acc
                    } else {
                        condition_verdict(carrier, name, verdicts).unwrap_or(acc)
                    }
                });
            (carrier.clone(), verdict)
        })
        .collect()
}

/// Resolve each condition once up front. Conditions that are incomplete,
/// undetermined, or missing from the rule data contribute nothing.
fn resolve_conditions<'a>(
    conditions: &'a [SelectedCondition],
    repository: &'a RuleRepository,
    coverage: CoverageType,
) -> Vec<(&'a str, &'a [UnderwritingVerdict])> {
    conditions
        .iter()
        .filter_map(|condition| {
            let tree = repository.tree(coverage, &condition.name)?;
            match resolve(tree, &condition.answers) {
                Resolution::Final { final_result_id } => Some((
                    condition.name.as_str(),
                    tree.verdicts_for(final_result_id),
                )),
                Resolution::Undetermined | Resolution::Incomplete { .. } => None,
            }
        })
        .collect()
}

/// First verdict row matching the carrier decides; extra matches are a
/// known free-text ambiguity and only logged.
fn condition_verdict(
    carrier: &str,
    condition_name: &str,
    verdicts: &[UnderwritingVerdict],
) -> Option<CarrierVerdict> {
    let mut matches = verdicts
        .iter()
        .filter(|verdict| carrier_names_match(carrier, &verdict.company));
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        debug!(
            carrier,
            condition = condition_name,
            extra,
            "carrier matched multiple verdict entries, keeping the first"
        );
    }

    if first.is_decline() {
        let reason = first
            .reason_text()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Declined due to {condition_name}"));
        Some(CarrierVerdict::declined(reason))
    } else {
        Some(CarrierVerdict::accepted())
    }
}
