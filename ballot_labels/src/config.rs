// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One free-text entry of the ballot spreadsheet.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Entry {
    /// An identifier for the row, usually derived from the file name and the line number.
    pub id: String,
    pub text: String,
}

impl Entry {
    pub fn new(id: &str, text: &str) -> Entry {
        Entry {
            id: id.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabeledEntry {
    pub entry: Entry,
    pub label: String,
}

// ******** Output data structures *********

/// The frequency of each label in a sample.
///
/// Only the labels that were seen are present. They are sorted by decreasing
/// count, ties being broken by the order of the rules (the fallback label last).
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LabelCounts {
    pub counts: Vec<(String, u64)>,
}

impl LabelCounts {
    /// The count for a label, zero if this label was never seen.
    pub fn get(&self, label: &str) -> u64 {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }

    /// The most frequent label, if any.
    pub fn majority(&self) -> Option<&str> {
        self.counts.first().map(|(l, _)| l.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Errors that prevent the labeling from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum LabelingErrors {
    /// A rule was declared without any keyword.
    EmptyKeywords(String),
    /// The keywords of a rule could not be turned into a pattern.
    InvalidPattern { label: String, message: String },
    /// The same label is used by two rules, or by a rule and the fallback.
    DuplicateLabel(String),
    /// There is nothing to sample from.
    EmptyDataset,
    /// A sample must contain at least one entry.
    InvalidSampleSize,
}

impl Error for LabelingErrors {}

impl Display for LabelingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelingErrors::EmptyKeywords(label) => {
                write!(f, "the rule for label {:?} has no keyword", label)
            }
            LabelingErrors::InvalidPattern { label, message } => {
                write!(f, "invalid keywords for label {:?}: {}", label, message)
            }
            LabelingErrors::DuplicateLabel(label) => {
                write!(f, "label {:?} is declared more than once", label)
            }
            LabelingErrors::EmptyDataset => write!(f, "the dataset is empty"),
            LabelingErrors::InvalidSampleSize => write!(f, "the sample size must be positive"),
        }
    }
}

// ********* Configuration **********

pub const DEFAULT_SAMPLE_SIZE: usize = 5000;
pub const DEFAULT_SEED: u64 = 42;

/// A label that is assigned when one of the keywords appears as a whole word in the text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabelRule {
    pub label: String,
    pub keywords: Vec<String>,
    /// Name of the colour used when charting this label.
    pub color: String,
}

/// The label assigned when no rule matches.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FallbackLabel {
    pub label: String,
    pub color: String,
}

/// An ordered set of rules. The first rule that matches wins.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabelRules {
    pub rules: Vec<LabelRule>,
    pub fallback: FallbackLabel,
}

impl LabelRules {
    /// The rules for the 2025 Ecuador presidential runoff.
    ///
    /// A text naming both candidates is attributed to Luisa González.
    pub fn default_rules() -> LabelRules {
        LabelRules {
            rules: vec![
                LabelRule {
                    label: "Voto Luisa".to_string(),
                    keywords: vec!["luisa".to_string(), "gonzález".to_string()],
                    color: "red".to_string(),
                },
                LabelRule {
                    label: "Voto Noboa".to_string(),
                    keywords: vec!["noboa".to_string()],
                    color: "blue".to_string(),
                },
            ],
            fallback: FallbackLabel {
                label: "Voto Nulo".to_string(),
                color: "gray".to_string(),
            },
        }
    }

    /// All the labels, in rule order, followed by the fallback label.
    pub fn labels(&self) -> Vec<&str> {
        let mut res: Vec<&str> = self.rules.iter().map(|r| r.label.as_str()).collect();
        res.push(self.fallback.label.as_str());
        res
    }

    pub fn color_of(&self, label: &str) -> Option<&str> {
        if label == self.fallback.label {
            return Some(self.fallback.color.as_str());
        }
        self.rules
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.color.as_str())
    }

    pub fn is_fallback(&self, label: &str) -> bool {
        self.fallback.label == label
    }
}
