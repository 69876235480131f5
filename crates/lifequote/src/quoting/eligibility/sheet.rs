use std::collections::BTreeMap;
use std::io::Read;

use tracing::warn;

use super::rules::{Answer, ConditionTree, FinalResult, Question, QuestionKind, UnderwritingVerdict};

const CONDITION_COLUMN: &str = "Condition";
const TREATMENT_DATE_COLUMN: &str = "Treatment_Date";
const CARRIER_PREFIX: &str = "Carrier_";

pub(crate) const TREATMENT_DATE_QUESTION: &str = "Date of last treatment:";

/// Import a legacy CSV underwriting sheet into condition trees.
///
/// The sheet carries one row per (condition, treatment-date bucket) with the
/// per-carrier decision in `Carrier_<Name>` columns. Each condition becomes
/// a single date question whose answers map buckets to final results, so
/// imported rules flow through the same traversal as the JSON sheets.
pub fn parse_sheet<R: Read>(reader: R) -> Result<BTreeMap<String, ConditionTree>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let carrier_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            header
                .strip_prefix(CARRIER_PREFIX)
                .map(|name| (index, name.to_string()))
        })
        .collect();
    let condition_index = headers.iter().position(|header| header == CONDITION_COLUMN);
    let date_index = headers
        .iter()
        .position(|header| header == TREATMENT_DATE_COLUMN);

    let (Some(condition_index), Some(date_index)) = (condition_index, date_index) else {
        warn!("underwriting sheet is missing the Condition/Treatment_Date columns");
        return Ok(BTreeMap::new());
    };

    let mut buckets: BTreeMap<String, Vec<(String, Vec<UnderwritingVerdict>)>> = BTreeMap::new();
    for record in csv_reader.records() {
        let record = record?;
        let Some(condition) = record.get(condition_index).filter(|name| !name.is_empty()) else {
            continue;
        };
        let Some(date) = record.get(date_index).filter(|value| !value.is_empty()) else {
            continue;
        };

        let verdicts = carrier_columns
            .iter()
            .filter_map(|(index, company)| {
                record
                    .get(*index)
                    .filter(|status| !status.is_empty())
                    .map(|status| UnderwritingVerdict {
                        company: company.clone(),
                        decision: status.to_string(),
                        reason: None,
                        complete_rule: None,
                    })
            })
            .collect();

        buckets
            .entry(condition.to_string())
            .or_default()
            .push((date.to_string(), verdicts));
    }

    let mut trees = BTreeMap::new();
    for (condition, entries) in buckets {
        let mut answers = Vec::new();
        let mut final_results = Vec::new();
        for (index, (date, verdicts)) in entries.into_iter().enumerate() {
            let final_id = format!("final{}", index + 1);
            answers.push(Answer {
                value: date,
                next_question_id: final_id.clone(),
            });
            final_results.push(FinalResult {
                id: final_id,
                verdicts,
            });
        }

        trees.insert(
            condition,
            ConditionTree {
                questions: vec![Question {
                    id: "q1".to_string(),
                    text: TREATMENT_DATE_QUESTION.to_string(),
                    kind: QuestionKind::Date,
                    answers,
                }],
                final_results,
            },
        );
    }

    Ok(trees)
}
