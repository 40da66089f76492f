mod config;
mod sample;

pub mod builder;
pub mod manual;

use log::{debug, info};
use regex::Regex;

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::sample::*;

/// Assigns a label to free-text entries, based on a set of keyword rules.
///
/// The text is lower-cased and each rule is tried in order: the first rule for which one
/// of the keywords appears as a whole word gives the label. When no rule matches, the
/// fallback label is used.
#[derive(Debug, Clone)]
pub struct Labeler {
    rules: LabelRules,
    // One compiled pattern per rule, in the same order.
    patterns: Vec<(String, Regex)>,
}

impl Labeler {
    pub fn new(rules: &LabelRules) -> Result<Labeler, LabelingErrors> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(rules.fallback.label.as_str());

        let mut patterns: Vec<(String, Regex)> = Vec::new();
        for rule in rules.rules.iter() {
            if !seen.insert(rule.label.as_str()) {
                return Err(LabelingErrors::DuplicateLabel(rule.label.clone()));
            }
            let re = keyword_pattern(rule)?;
            debug!("Labeler::new: label {:?} pattern {:?}", rule.label, re.as_str());
            patterns.push((rule.label.clone(), re));
        }
        Ok(Labeler {
            rules: rules.clone(),
            patterns,
        })
    }

    /// The label for a single piece of text.
    pub fn label(&self, text: &str) -> &str {
        let lower = text.to_lowercase();
        for (label, re) in self.patterns.iter() {
            if re.is_match(&lower) {
                return label.as_str();
            }
        }
        self.rules.fallback.label.as_str()
    }

    pub fn label_all(&self, entries: &[Entry]) -> Vec<LabeledEntry> {
        info!("label_all: labeling {:?} entries", entries.len());
        entries
            .iter()
            .map(|e| {
                let label = self.label(&e.text).to_string();
                debug!("label_all: {}: {:?} -> {}", e.id, e.text, label);
                LabeledEntry {
                    entry: e.clone(),
                    label,
                }
            })
            .collect()
    }

    pub fn rules(&self) -> &LabelRules {
        &self.rules
    }

    /// The colour associated with a label. Unknown labels are drawn in gray.
    pub fn color_of(&self, label: &str) -> &str {
        self.rules.color_of(label).unwrap_or("gray")
    }
}

fn keyword_pattern(rule: &LabelRule) -> Result<Regex, LabelingErrors> {
    let alternatives: Vec<String> = rule
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(&k))
        .collect();
    if alternatives.is_empty() {
        return Err(LabelingErrors::EmptyKeywords(rule.label.clone()));
    }
    let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern).map_err(|e| LabelingErrors::InvalidPattern {
        label: rule.label.clone(),
        message: e.to_string(),
    })
}

/// Counts how many times each label appears.
///
/// The result is ordered by decreasing count. Ties follow the order of the rules, and
/// the fallback label comes last.
pub fn count_labels(labeled: &[LabeledEntry], rules: &LabelRules) -> LabelCounts {
    let mut tally: HashMap<&str, u64> = HashMap::new();
    for le in labeled.iter() {
        *tally.entry(le.label.as_str()).or_insert(0) += 1;
    }

    let mut ordered: Vec<&str> = rules.labels();
    // Labels produced outside of these rules still get counted, after the known ones.
    let mut extra: Vec<&str> = tally
        .keys()
        .filter(|l| !ordered.contains(*l))
        .cloned()
        .collect();
    extra.sort();
    ordered.extend(extra);

    let mut counts: Vec<(String, u64)> = ordered
        .iter()
        .filter_map(|l| tally.get(l).map(|c| (l.to_string(), *c)))
        .collect();
    // The sort is stable: ties keep the rule order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    debug!("count_labels: {:?}", counts);
    LabelCounts { counts }
}

/// A one-sentence conclusion about the majority of the votes.
pub fn conclusion(counts: &LabelCounts, rules: &LabelRules) -> String {
    match counts.majority() {
        None => "No votes in the sample.".to_string(),
        Some(l) if rules.is_fallback(l) => {
            format!("The majority of the votes are null ({}).", l)
        }
        Some(l) => format!("The majority of the votes are for {}.", l),
    }
}

/// The statistics of a labeled sample.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SampleSummary {
    /// Number of rows in the full dataset.
    pub total_rows: usize,
    pub sample_size: usize,
    pub counts: LabelCounts,
    /// All the configured labels, fallback last.
    pub labels: Vec<String>,
    pub fallback: String,
    pub conclusion: String,
}

impl SampleSummary {
    pub fn new(total_rows: usize, labeled: &[LabeledEntry], rules: &LabelRules) -> SampleSummary {
        let counts = count_labels(labeled, rules);
        let conclusion = conclusion(&counts, rules);
        info!(
            "SampleSummary: {:?} rows sampled out of {:?}: {:?}",
            labeled.len(),
            total_rows,
            counts.counts
        );
        SampleSummary {
            total_rows,
            sample_size: labeled.len(),
            counts,
            labels: rules.labels().iter().map(|s| s.to_string()).collect(),
            fallback: rules.fallback.label.clone(),
            conclusion,
        }
    }

    pub fn majority(&self) -> Option<&str> {
        self.counts.majority()
    }

    /// The number of entries that did not match any rule.
    pub fn fallback_count(&self) -> u64 {
        self.counts.get(&self.fallback)
    }

    /// A short text describing the sample, small enough to be sent along with a question.
    ///
    /// Every configured label is listed in rule order, the fallback last.
    pub fn describe(&self) -> String {
        let mut res = format!(
            "In a sample of {} rows, the following was obtained:\n",
            self.sample_size
        );
        for l in self.labels.iter() {
            res.push_str(&format!("- {}: {}\n", l, self.counts.get(l)));
        }
        res.push_str(&format!("Initial conclusion: {}", self.conclusion));
        res
    }
}
