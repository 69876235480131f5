use std::collections::BTreeMap;

use tracing::warn;

use super::rules::{AnswerTarget, ConditionTree, Question};

/// Outcome of walking a condition tree against a set of answers keyed by
/// question text.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// Every hop landed on a known answer and reached a terminal node.
    Final { final_result_id: &'a str },
    /// An answer was supplied that the current question does not offer; the
    /// condition contributes no verdicts.
    Undetermined,
    /// The walk stopped at a question the caller has not answered yet.
    Incomplete { question: &'a Question },
}

/// Walk from the tree's first question, following the answer chosen for each
/// question's text, until a terminal node or an unanswered question.
///
/// Deterministic and idempotent: the same tree and answers always produce
/// the same resolution, whether driven one answer at a time or in one call.
pub fn resolve<'a>(tree: &'a ConditionTree, answers: &BTreeMap<String, String>) -> Resolution<'a> {
    let Some(mut current) = tree.entry_question() else {
        return Resolution::Undetermined;
    };

    let mut hops = 0usize;
    loop {
        let Some(value) = answers.get(&current.text) else {
            return Resolution::Incomplete { question: current };
        };
        let Some(answer) = current.answer(value) else {
            return Resolution::Undetermined;
        };
        match answer.target() {
            AnswerTarget::Terminal(id) => {
                return Resolution::Final {
                    final_result_id: id,
                }
            }
            AnswerTarget::Question(id) => match tree.question(id) {
                Some(next) => {
                    // Rule data can cycle; once the walk has taken more hops
                    // than the tree has questions, it has revisited one.
                    hops += 1;
                    if hops > tree.questions.len() {
                        warn!(
                            question = %current.id,
                            next = %id,
                            "condition tree cycles, stopping traversal"
                        );
                        return Resolution::Incomplete { question: current };
                    }
                    current = next;
                }
                None => {
                    warn!(
                        question = %current.id,
                        next = %id,
                        "answer references a question missing from the tree"
                    );
                    return Resolution::Incomplete { question: current };
                }
            },
        }
    }
}
