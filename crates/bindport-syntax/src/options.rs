//! Generator options.
//!
//! All structs deserialize with defaults so a partial config table works:
//!
//! ```toml
//! [c]
//! use_type_hints = true
//! header = ["from runtime import env"]
//!
//! [c.postprocess]
//! start_marker = "def op_NOP("
//! stack_poke = true
//!
//! [dts]
//! runtime_module = "mylib.bindgen"
//! ```

use serde::{Deserialize, Serialize};

/// Options for both engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub c: COptions,
    pub dts: DtsOptions,
}

/// C engine options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct COptions {
    /// Drop parentheses the host precedence makes redundant.
    pub reduce_parentheses: bool,
    /// Annotate parameters and return types.
    pub use_type_hints: bool,
    /// Keep uninitialized locals as `x = None` instead of dropping them.
    pub keep_empty_declarations: bool,
    /// Annotate declarations (`x: int = 0`).
    pub type_hint_declarations: bool,
    /// Render struct/union/typedef'd aggregates instead of suppressing them.
    pub emit_aggregates: bool,
    /// Emit `CALL('label')` for `goto label` instead of failing.
    pub goto_call: Option<String>,
    /// Raw lines placed at the top of the module.
    pub header: Vec<String>,
    pub postprocess: PostprocessOptions,
}

impl Default for COptions {
    fn default() -> Self {
        Self {
            reduce_parentheses: true,
            use_type_hints: false,
            keep_empty_declarations: false,
            type_hint_declarations: false,
            emit_aggregates: false,
            goto_call: None,
            header: Vec::new(),
            postprocess: PostprocessOptions::default(),
        }
    }
}

/// Textual post-pass over rendered C lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessOptions {
    /// Drop every line before the first one starting with this text.
    pub start_marker: Option<String>,
    /// Rewrite `env.stack.peek(n) = v` into `env.stack.poke(n, v)`.
    pub stack_poke: bool,
    pub rewrites: Vec<RewriteRule>,
}

/// Regex rewrite applied to each kept line (`$1`-style replacements).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    pub replacement: String,
}

/// TypeScript engine options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtsOptions {
    /// Module providing the `external` and `alias` decorators.
    pub runtime_module: String,
    /// Name prefix for synthesized anonymous types.
    pub synthesized_prefix: String,
    /// Raw lines placed at the top of the module.
    pub header: Vec<String>,
}

impl Default for DtsOptions {
    fn default() -> Self {
        Self {
            runtime_module: "bindport.runtime".into(),
            synthesized_prefix: "Type".into(),
            header: Vec::new(),
        }
    }
}
