//! Line-oriented post-pass over rendered C output.

use crate::options::PostprocessOptions;
use regex::Regex;

/// Pattern of the `stack_poke` preset.
pub const STACK_POKE_PATTERN: &str = r"^(\s*)env\.stack\.peek\((.*?)\) = (.*)$";
pub const STACK_POKE_REPLACEMENT: &str = "${1}env.stack.poke(${2}, ${3})";

/// Compiled post-pass: an optional start marker and ordered rewrites.
#[derive(Debug, Default)]
pub struct LineFilter {
    start_marker: Option<String>,
    rewrites: Vec<(Regex, String)>,
}

impl LineFilter {
    pub fn new(options: &PostprocessOptions) -> Result<Self, regex::Error> {
        let mut rewrites = Vec::new();
        if options.stack_poke {
            rewrites.push((
                Regex::new(STACK_POKE_PATTERN)?,
                STACK_POKE_REPLACEMENT.to_string(),
            ));
        }
        for rule in &options.rewrites {
            rewrites.push((Regex::new(&rule.pattern)?, rule.replacement.clone()));
        }
        Ok(Self {
            start_marker: options.start_marker.clone(),
            rewrites,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.start_marker.is_none() && self.rewrites.is_empty()
    }

    /// Apply to a list of lines. With a start marker, everything before the
    /// first line starting with it is dropped; if no line matches, nothing
    /// is dropped.
    pub fn apply(&self, lines: Vec<String>) -> Vec<String> {
        let start = self
            .start_marker
            .as_deref()
            .and_then(|marker| lines.iter().position(|l| l.starts_with(marker)))
            .unwrap_or(0);
        if start > 0 {
            tracing::debug!(dropped = start, "start marker");
        }
        lines
            .into_iter()
            .skip(start)
            .map(|line| self.rewrite(line))
            .collect()
    }

    fn rewrite(&self, mut line: String) -> String {
        for (pattern, replacement) in &self.rewrites {
            if pattern.is_match(&line) {
                line = pattern.replace_all(&line, replacement.as_str()).into_owned();
            }
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RewriteRule;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn stack_poke_preset() {
        let filter = LineFilter::new(&PostprocessOptions {
            stack_poke: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            filter.apply(lines("    env.stack.peek(0) = a + b\nx = env.stack.peek(1)")),
            vec!["    env.stack.poke(0, a + b)", "x = env.stack.peek(1)"]
        );
    }

    #[test]
    fn start_marker_drops_prelude() {
        let filter = LineFilter::new(&PostprocessOptions {
            start_marker: Some("def op_NOP(".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            filter.apply(lines("def helper():\n    pass\ndef op_NOP(env):\n    pass")),
            vec!["def op_NOP(env):", "    pass"]
        );
        assert_eq!(filter.apply(lines("x = 1")), vec!["x = 1"]);
    }

    #[test]
    fn custom_rewrites_run_in_order() {
        let filter = LineFilter::new(&PostprocessOptions {
            rewrites: vec![
                RewriteRule {
                    pattern: r"\bNULL\b".into(),
                    replacement: "None".into(),
                },
                RewriteRule {
                    pattern: r"== None".into(),
                    replacement: "is None".into(),
                },
            ],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.apply(lines("if p == NULL:")), vec!["if p is None:"]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let result = LineFilter::new(&PostprocessOptions {
            rewrites: vec![RewriteRule {
                pattern: "(".into(),
                replacement: String::new(),
            }],
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
