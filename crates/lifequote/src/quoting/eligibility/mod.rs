//! Health-condition eligibility: rule trees, traversal, carrier matching,
//! and the cross-condition decline aggregation.

mod aggregate;
mod matcher;
mod repository;
mod rules;
mod session;
mod sheet;
mod traversal;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate, CarrierVerdict};
pub use matcher::carrier_names_match;
pub use repository::RuleRepository;
pub use rules::{
    Answer, AnswerTarget, ConditionTree, CoverageBlock, CoverageType, FinalResult, Question,
    QuestionKind, RuleSheet, UnderwritingVerdict,
};
pub use session::{AnswerOutcome, SelectedCondition, SelectedConditions};
pub use sheet::parse_sheet;
pub use traversal::{resolve, Resolution};
