use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The two independent rule and pricing universes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CoverageType {
    #[default]
    Term,
    Fex,
}

impl CoverageType {
    /// Key used by the coverage-first rule sheets.
    pub const fn sheet_label(self) -> &'static str {
        match self {
            CoverageType::Term => "Term",
            CoverageType::Fex => "FEX",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CoverageType::Term => "term",
            CoverageType::Fex => "fex",
        }
    }
}

/// One coverage universe of a rule sheet: `{ "Conditions": { name: tree } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverageBlock {
    #[serde(rename = "Conditions", default)]
    pub conditions: BTreeMap<String, ConditionTree>,
}

/// Top-level rule sheet wire shape, keyed by coverage label ("Term", "FEX").
pub type RuleSheet = BTreeMap<String, CoverageBlock>;

/// A condition's question/answer decision tree. Immutable after load; the
/// first question in `questions` is the traversal entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionTree {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(rename = "finalResults", default)]
    pub final_results: Vec<FinalResult>,
}

impl ConditionTree {
    pub fn entry_question(&self) -> Option<&Question> {
        self.questions.first()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn final_result(&self, id: &str) -> Option<&FinalResult> {
        self.final_results.iter().find(|result| result.id == id)
    }

    /// Verdicts carried by a terminal node. An unknown id means the
    /// condition places no constraint, so the slice is simply empty.
    pub fn verdicts_for(&self, final_result_id: &str) -> &[UnderwritingVerdict] {
        self.final_result(final_result_id)
            .map(|result| result.verdicts.as_slice())
            .unwrap_or(&[])
    }
}

/// How the intake surface should solicit the answer. Traversal semantics do
/// not depend on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    YesNo,
    Date,
    #[default]
    #[serde(other)]
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "questionText", alias = "text")]
    pub text: String,
    #[serde(rename = "questionType", default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn answer(&self, value: &str) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub value: String,
    #[serde(rename = "nextQuestionId")]
    pub next_question_id: String,
}

/// Where an answer leads. The rule files encode terminal hops as ids with a
/// `"final"` prefix; that convention is decoded here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerTarget<'a> {
    Question(&'a str),
    Terminal(&'a str),
}

impl Answer {
    pub fn target(&self) -> AnswerTarget<'_> {
        let id = self.next_question_id.as_str();
        if id
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("final"))
        {
            AnswerTarget::Terminal(id)
        } else {
            AnswerTarget::Question(id)
        }
    }
}

/// Terminal node of a condition tree, bearing per-carrier verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub id: String,
    #[serde(rename = "underwriting", default)]
    pub verdicts: Vec<UnderwritingVerdict>,
}

/// One carrier's accept/decline outcome attached to a final result. Company
/// names are free text and need not match the pricing engine's carrier
/// names exactly; correlation goes through the carrier matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingVerdict {
    pub company: String,
    #[serde(rename = "status")]
    pub decision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "completeRule", default, skip_serializing_if = "Option::is_none")]
    pub complete_rule: Option<String>,
}

impl UnderwritingVerdict {
    /// Only `Decline`/`Declined` (any casing) counts as a decline; every
    /// other decision string is an accept.
    pub fn is_decline(&self) -> bool {
        matches!(
            self.decision.trim().to_ascii_lowercase().as_str(),
            "decline" | "declined"
        )
    }

    /// Display reason, preferring `reason` over the raw rule text.
    pub fn reason_text(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .or_else(|| {
                self.complete_rule
                    .as_deref()
                    .filter(|text| !text.trim().is_empty())
            })
    }
}
