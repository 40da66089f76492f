pub use crate::config::*;
use crate::Labeler;

/// A builder for assembling a set of labeling rules.
///
/// The rules are tried in the order in which they are added.
///
/// ```
/// pub use ballot_labels::builder::Builder;
/// # use ballot_labels::LabelingErrors;
///
/// let labeler = Builder::new("Blank")
///     .rule("Yes", &["yes", "sí"], "green")
///     .rule("No", &["no"], "red")
///     .build()?;
///
/// assert_eq!(labeler.label("Yes, of course"), "Yes");
/// assert_eq!(labeler.label("NO"), "No");
/// assert_eq!(labeler.label("nope"), "Blank");
///
/// # Ok::<(), LabelingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: Vec<LabelRule>,
    pub(crate) _fallback: FallbackLabel,
}

impl Builder {
    /// Starts a new set of rules, with the label to use when no rule matches.
    pub fn new(fallback_label: &str) -> Builder {
        Builder {
            _rules: Vec::new(),
            _fallback: FallbackLabel {
                label: fallback_label.to_string(),
                color: "gray".to_string(),
            },
        }
    }

    pub fn rule(mut self, label: &str, keywords: &[&str], color: &str) -> Builder {
        self._rules.push(LabelRule {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            color: color.to_string(),
        });
        self
    }

    pub fn fallback_color(mut self, color: &str) -> Builder {
        self._fallback.color = color.to_string();
        self
    }

    pub fn rules(&self) -> LabelRules {
        LabelRules {
            rules: self._rules.clone(),
            fallback: self._fallback.clone(),
        }
    }

    pub fn build(&self) -> Result<Labeler, LabelingErrors> {
        Labeler::new(&self.rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_matches_default_rules() {
        let b = Builder::new("Voto Nulo")
            .rule("Voto Luisa", &["luisa", "gonzález"], "red")
            .rule("Voto Noboa", &["noboa"], "blue");
        assert_eq!(b.rules(), LabelRules::default_rules());
    }

    #[test]
    fn builder_fallback_color() {
        let labeler = Builder::new("None")
            .rule("A", &["a"], "blue")
            .fallback_color("black")
            .build()
            .unwrap();
        assert_eq!(labeler.color_of("None"), "black");
    }

    #[test]
    fn builder_without_keywords() {
        let res = Builder::new("None").rule("A", &[], "blue").build();
        assert_eq!(res.unwrap_err(), LabelingErrors::EmptyKeywords("A".to_string()));
    }
}
