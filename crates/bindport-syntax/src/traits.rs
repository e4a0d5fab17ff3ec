//! Traits and error types for grammar translators.

use crate::options::Options;

/// Error that can occur when loading a JSON AST.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("invalid AST json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} node is missing `{field}`")]
    Missing { kind: String, field: &'static str },

    #[error("expected {expected}, got {got}")]
    UnexpectedNode { expected: String, got: String },
}

/// Fatal error raised by the C engine on a construct it cannot translate
/// faithfully. No output is produced for the pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("unsupported side effect in condition: {0}")]
    UnsupportedEffect(String),

    #[error("increment/decrement used as a value: {0}")]
    StepAsValue(String),

    #[error("`continue` would skip the loop step of a rewritten loop")]
    ContinueSkipsStep,

    #[error("`break` would skip a postfix effect of the loop test")]
    BreakSkipsEffect,

    #[error("conditional `break` inside switch case {0}")]
    ConditionalBreak(String),

    #[error("unreachable code after `break` in switch case {0}")]
    CodeAfterBreak(String),

    #[error("unsupported switch discriminant: {0}")]
    UnsupportedDiscriminant(String),

    #[error("unsupported switch body item: {0}")]
    UnsupportedSwitchItem(String),

    #[error("`default` must be the last label when it falls through")]
    DefaultNotLast,

    #[error("goto {0}")]
    Goto(String),

    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("unexpected {got} in {context}")]
    Unexpected { got: String, context: &'static str },
}

/// Error returned by a [`Translator`].
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("invalid rewrite pattern: {0}")]
    Filter(#[from] regex::Error),
}

/// Non-fatal record of something the TypeScript engine skipped or degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Node kind that triggered the diagnostic.
    pub kind: String,
    pub message: String,
}

/// Rendered host module plus any diagnostics collected on the way.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translates one JSON AST of a source grammar into a Python module.
pub trait Translator: Send + Sync {
    /// Grammar identifier (e.g., "c", "dts").
    fn grammar(&self) -> &'static str;

    /// Whether a JSON document looks like an AST of this grammar.
    fn accepts(&self, root: &serde_json::Value) -> bool;

    /// Load the AST and render it.
    fn translate(
        &self,
        root: &serde_json::Value,
        options: &Options,
    ) -> Result<Translation, TranslateError>;
}
