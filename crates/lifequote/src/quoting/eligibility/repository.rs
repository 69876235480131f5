use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::rules::{ConditionTree, CoverageType, RuleSheet};
use super::sheet;

/// Read-only store of condition decision trees, split by coverage type.
///
/// Loading never blocks quoting: a sheet that cannot be read or parsed
/// leaves its coverage marked unavailable, and an unavailable coverage
/// behaves exactly like one with zero conditions.
#[derive(Debug, Default)]
pub struct RuleRepository {
    coverages: BTreeMap<CoverageType, CoverageRules>,
}

#[derive(Debug, Default)]
struct CoverageRules {
    conditions: BTreeMap<String, ConditionTree>,
    available: bool,
}

impl RuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a coverage-first JSON sheet and install its conditions.
    pub fn load_sheet<R: Read>(
        &mut self,
        coverage: CoverageType,
        reader: R,
    ) -> Result<usize, serde_json::Error> {
        let sheet: RuleSheet = serde_json::from_reader(reader)?;
        let block = sheet.get(coverage.sheet_label()).cloned().unwrap_or_else(|| {
            warn!(
                coverage = coverage.label(),
                "rule sheet has no block for this coverage"
            );
            Default::default()
        });

        let entry = self.coverages.entry(coverage).or_default();
        let count = block.conditions.len();
        entry.conditions.extend(block.conditions);
        entry.available = true;
        Ok(count)
    }

    /// Load a JSON sheet from disk, failing open: any error is logged and
    /// the coverage stays unavailable.
    pub fn load_sheet_path(&mut self, coverage: CoverageType, path: &Path) {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!(
                    coverage = coverage.label(),
                    path = %path.display(),
                    error = %err,
                    "rule sheet unreadable, coverage unavailable"
                );
                self.coverages.entry(coverage).or_default();
                return;
            }
        };

        match self.load_sheet(coverage, file) {
            Ok(count) => info!(
                coverage = coverage.label(),
                conditions = count,
                "rule sheet loaded"
            ),
            Err(err) => {
                warn!(
                    coverage = coverage.label(),
                    path = %path.display(),
                    error = %err,
                    "rule sheet malformed, coverage unavailable"
                );
                self.coverages.entry(coverage).or_default();
            }
        }
    }

    /// Import a CSV underwriting sheet. Conditions already loaded from JSON
    /// keep their trees; the CSV only fills gaps.
    pub fn load_csv_sheet<R: Read>(
        &mut self,
        coverage: CoverageType,
        reader: R,
    ) -> Result<usize, csv::Error> {
        let trees = sheet::parse_sheet(reader)?;
        let entry = self.coverages.entry(coverage).or_default();
        let mut added = 0usize;
        for (name, tree) in trees {
            if !entry.conditions.contains_key(&name) {
                entry.conditions.insert(name, tree);
                added += 1;
            }
        }
        entry.available = true;
        Ok(added)
    }

    /// Install a single tree; used by imports and tests.
    pub fn insert_tree(&mut self, coverage: CoverageType, name: impl Into<String>, tree: ConditionTree) {
        let entry = self.coverages.entry(coverage).or_default();
        entry.conditions.insert(name.into(), tree);
        entry.available = true;
    }

    pub fn is_available(&self, coverage: CoverageType) -> bool {
        self.coverages
            .get(&coverage)
            .map(|rules| rules.available)
            .unwrap_or(false)
    }

    pub fn tree(&self, coverage: CoverageType, name: &str) -> Option<&ConditionTree> {
        self.coverages
            .get(&coverage)?
            .conditions
            .get(name)
    }

    pub fn condition_names(&self, coverage: CoverageType) -> Vec<&str> {
        self.coverages
            .get(&coverage)
            .map(|rules| rules.conditions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Tiered incremental search: exact name match first, then names with a
    /// word starting with the query, then plain substring hits. Each name
    /// appears once, keeping listing order within its tier.
    pub fn search(&self, coverage: CoverageType, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut word_prefix = Vec::new();
        let mut substring = Vec::new();

        for name in self.condition_names(coverage) {
            let lower = name.to_lowercase();
            if lower == needle {
                exact.push(name.to_string());
            } else if lower
                .split_whitespace()
                .any(|word| word.starts_with(&needle))
            {
                word_prefix.push(name.to_string());
            } else if lower.contains(&needle) {
                substring.push(name.to_string());
            }
        }

        exact
            .into_iter()
            .chain(word_prefix)
            .chain(substring)
            .collect()
    }
}
