//! Structural translation of foreign ASTs into Python binding stubs.
//!
//! `bindport-syntax` consumes ASTs produced by third-party front ends, as
//! JSON, and renders Python source:
//!
//! - **C** (pycparser `c_json` dumps): function bodies are translated
//!   statement by statement. Control flow Python lacks is canonicalized
//!   (`for` to `range`, `switch` to `match` or `if`/`elif`, `do`/`while`
//!   desugaring, `++`/`--` extraction) and constructs with no faithful
//!   mapping fail the pass with a [`GenerateError`].
//! - **TypeScript declarations** (compiler node dumps): classes, interfaces
//!   and functions become `@external` stub classes with re-cased names,
//!   accessor properties and overload dispatch. Unsupported nodes degrade
//!   to a [`Diagnostic`] instead of failing.
//!
//! # Architecture
//!
//! ```text
//! JSON AST ─> input::read_* ─> ast::{c,dts}::Node ─> output::* ─> emit::Document ─> text
//!                                                       │
//!                                      types / casing / context / postprocess
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bindport_syntax::{Options, translator_for_grammar};
//!
//! let root: serde_json::Value = serde_json::from_str(&dump)?;
//! let translator = translator_for_grammar("c").unwrap();
//! let translation = translator.translate(&root, &Options::default())?;
//! print!("{}", translation.text);
//! ```

pub mod ast;
pub mod casing;
pub mod context;
pub mod emit;
pub mod options;
pub mod postprocess;
pub mod registry;
pub mod traits;
pub mod types;

pub mod input;
pub mod output;

// Re-exports: Traits and errors
pub use traits::{Diagnostic, GenerateError, ReadError, TranslateError, Translation, Translator};

// Re-exports: Options
pub use options::{COptions, DtsOptions, Options, PostprocessOptions, RewriteRule};

// Re-exports: Registry
pub use registry::{detect_translator, register_translator, translator_for_grammar, translators};

// Re-exports: Built-in translators
#[cfg(feature = "c")]
pub use output::c::{CTranslator, generate_c};
#[cfg(feature = "dts")]
pub use output::dts::DtsTranslator;
