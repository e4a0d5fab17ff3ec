//! Configuration for the bindport CLI.
//!
//! Loads config from:
//! 1. `--config PATH`, when given
//! 2. `bindport.toml` in the working directory, if present
//!
//! and falls back to defaults otherwise.
//!
//! Example bindport.toml:
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
//! runtime_module = "workers.ffi"
//!
//! [log]
//! filter = "bindport_syntax=debug"
//! ```

use anyhow::Context;
use bindport_syntax::{COptions, DtsOptions, Options};
use serde::Deserialize;
use std::path::Path;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "bindport.toml";

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives. Takes precedence over `RUST_LOG` and `-v`.
    pub filter: Option<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BindportConfig {
    pub c: COptions,
    pub dts: DtsOptions,
    pub log: LogConfig,
}

impl BindportConfig {
    /// Load configuration from `explicit`, else from `CONFIG_FILE` in `dir`.
    ///
    /// A missing explicit file is an error; a missing implicit one is not.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Generator options for both engines.
    pub fn options(&self) -> Options {
        Options {
            c: self.c.clone(),
            dts: self.dts.clone(),
        }
    }
}
