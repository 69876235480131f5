use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::{ConditionTree, Question};
use super::traversal::{resolve, Resolution};

/// A condition the applicant attached to their quote request, with the
/// answers collected so far keyed by question text. Owned by the calling
/// session; nothing here touches ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCondition {
    pub name: String,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    /// Terminal node reached by the stored answers, kept in sync by
    /// `submit_answer` so callers can show completion without re-walking.
    #[serde(rename = "finalResultId", default, skip_serializing_if = "Option::is_none")]
    pub final_result_id: Option<String>,
}

impl SelectedCondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            answers: BTreeMap::new(),
            final_result_id: None,
        }
    }

    /// Record one answer and advance the walk a single step.
    pub fn submit_answer(
        &mut self,
        tree: &ConditionTree,
        question_text: &str,
        value: &str,
    ) -> AnswerOutcome {
        self.answers
            .insert(question_text.to_string(), value.to_string());
        self.resync(tree)
    }

    /// Re-derive the terminal state from the stored answers. Re-answering an
    /// earlier question resolves from the top, so stale downstream answers
    /// cannot fabricate a terminal.
    pub fn resync(&mut self, tree: &ConditionTree) -> AnswerOutcome {
        match resolve(tree, &self.answers) {
            Resolution::Final { final_result_id } => {
                self.final_result_id = Some(final_result_id.to_string());
                AnswerOutcome::Terminal {
                    final_result_id: final_result_id.to_string(),
                }
            }
            Resolution::Undetermined => {
                self.final_result_id = None;
                AnswerOutcome::Undetermined
            }
            Resolution::Incomplete { question } => {
                self.final_result_id = None;
                AnswerOutcome::NextQuestion {
                    question: question.clone(),
                }
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.final_result_id.is_some()
    }
}

/// What the caller should do after an answer lands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AnswerOutcome {
    /// Ask this question next.
    NextQuestion { question: Question },
    /// The walk reached a terminal node.
    #[serde(rename_all = "camelCase")]
    Terminal { final_result_id: String },
    /// The stored answers no longer select a path; the condition
    /// contributes no verdicts.
    Undetermined,
}

/// Insertion-ordered set of selected conditions for one quoting session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedConditions {
    conditions: Vec<SelectedCondition>,
}

impl SelectedConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a condition; re-adding an existing name returns the existing
    /// entry untouched.
    pub fn add(&mut self, name: &str) -> &mut SelectedCondition {
        match self.position(name) {
            Some(index) => &mut self.conditions[index],
            None => {
                self.conditions.push(SelectedCondition::new(name));
                let last = self.conditions.len() - 1;
                &mut self.conditions[last]
            }
        }
    }

    /// Detach a condition, discarding its answers.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.conditions.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&SelectedCondition> {
        self.position(name).map(|index| &self.conditions[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SelectedCondition> {
        self.position(name)
            .map(|index| &mut self.conditions[index])
    }

    pub fn as_slice(&self) -> &[SelectedCondition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.conditions
            .iter()
            .position(|condition| condition.name == name)
    }
}
