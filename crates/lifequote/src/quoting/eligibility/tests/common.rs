use std::collections::BTreeMap;

use crate::quoting::eligibility::{
    Answer, ConditionTree, CoverageType, FinalResult, Question, QuestionKind, RuleRepository,
    SelectedCondition, UnderwritingVerdict,
};

pub(super) fn verdict(company: &str, decision: &str, reason: Option<&str>) -> UnderwritingVerdict {
    UnderwritingVerdict {
        company: company.to_string(),
        decision: decision.to_string(),
        reason: reason.map(str::to_string),
        complete_rule: None,
    }
}

pub(super) fn answer(value: &str, next: &str) -> Answer {
    Answer {
        value: value.to_string(),
        next_question_id: next.to_string(),
    }
}

pub(super) fn question(id: &str, text: &str, answers: Vec<Answer>) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        kind: QuestionKind::YesNo,
        answers,
    }
}

/// Two-question cancer tree:
/// q1 "Diagnosed with cancer?" -> No => final1 (all approved)
///                             -> Yes => q2
/// q2 "Treatment within the last 2 years?" -> Yes => final2 (declines)
///                                         -> No  => final3 (mixed)
pub(super) fn cancer_tree() -> ConditionTree {
    ConditionTree {
        questions: vec![
            question(
                "q1",
                "Diagnosed with cancer?",
                vec![answer("No", "final1"), answer("Yes", "q2")],
            ),
            question(
                "q2",
                "Treatment within the last 2 years?",
                vec![answer("Yes", "final2"), answer("No", "final3")],
            ),
        ],
        final_results: vec![
            FinalResult {
                id: "final1".to_string(),
                verdicts: vec![
                    verdict("Acme Life", "Approved", None),
                    verdict("Foresters", "Approved", None),
                ],
            },
            FinalResult {
                id: "final2".to_string(),
                verdicts: vec![
                    verdict("Acme Life", "Decline", Some("Recent cancer diagnosis")),
                    verdict("Foresters", "Declined", None),
                ],
            },
            FinalResult {
                id: "final3".to_string(),
                verdicts: vec![
                    verdict("Acme Life", "Approved", None),
                    verdict("Foresters", "Decline", Some("Two year lookback")),
                ],
            },
        ],
    }
}

/// Single-question tree that approves Acme Life on both branches.
pub(super) fn diabetes_tree() -> ConditionTree {
    ConditionTree {
        questions: vec![question(
            "q1",
            "Insulin dependent?",
            vec![answer("No", "final1"), answer("Yes", "final2")],
        )],
        final_results: vec![
            FinalResult {
                id: "final1".to_string(),
                verdicts: vec![verdict("Acme Life", "Approved", None)],
            },
            FinalResult {
                id: "final2".to_string(),
                verdicts: vec![
                    verdict("Acme Life", "Approved", None),
                    verdict("Sentinel", "Decline", None),
                ],
            },
        ],
    }
}

pub(super) fn repository() -> RuleRepository {
    let mut repository = RuleRepository::new();
    repository.insert_tree(CoverageType::Term, "Cancer", cancer_tree());
    repository.insert_tree(CoverageType::Term, "Diabetes", diabetes_tree());
    repository
}

pub(super) fn selected(name: &str, answers: &[(&str, &str)]) -> SelectedCondition {
    let mut condition = SelectedCondition::new(name);
    condition.answers = answers
        .iter()
        .map(|(question, value)| (question.to_string(), value.to_string()))
        .collect();
    condition
}

pub(super) fn answers(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(question, value)| (question.to_string(), value.to_string()))
        .collect()
}

pub(super) fn carriers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
