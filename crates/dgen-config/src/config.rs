//! Generator configuration types (dgen.toml format).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Extra feature flags understood by the emitter.
pub const KNOWN_EXTRAS: &[&str] = &["attr-nogc"];

/// Root generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenConfig {
    /// What to read.
    #[serde(default)]
    pub input: InputOptions,

    /// What to write.
    #[serde(default)]
    pub output: OutputOptions,
}

/// Input-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputOptions {
    /// Input path roots. Declarations outside of them are ignored; an empty
    /// list accepts everything.
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Source language standard (e.g., "c99", "c++17").
    #[serde(default = "default_standard")]
    pub standard: String,
}

/// Output-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Generated module path.
    #[serde(default = "default_output")]
    pub path: PathBuf,

    /// Extra feature flags (e.g., "attr-nogc").
    #[serde(default)]
    pub extras: Vec<String>,

    /// Mangling scheme of the symbols pinned with `pragma(mangle)`.
    #[serde(default)]
    pub mangling: ManglingScheme,
}

/// Name-mangling scheme of the target ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManglingScheme {
    /// Itanium C++ ABI (Linux, macOS, MinGW)
    #[default]
    Itanium,
    /// Microsoft Visual C++ ABI
    Microsoft,
}

fn default_standard() -> String {
    "c++17".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("bindings.d")
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            standard: default_standard(),
        }
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            path: default_output(),
            extras: Vec::new(),
            mangling: ManglingScheme::default(),
        }
    }
}

impl InputOptions {
    /// Whether declarations get C++ linkage unless declared `extern "C"`.
    pub fn cpp_is_default(&self) -> bool {
        self.standard.contains("c++")
    }
}

impl OutputOptions {
    /// Whether emitted functions carry the `@nogc` attribute.
    pub fn nogc(&self) -> bool {
        self.has_extra("attr-nogc")
    }

    pub fn has_extra(&self, name: &str) -> bool {
        self.extras.iter().any(|e| e == name)
    }
}

impl GenConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GenConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot check.
    pub fn validate(&self) -> crate::Result<()> {
        if self.input.standard.trim().is_empty() {
            return Err(ConfigError::Validation(
                "input.standard must not be empty".to_string(),
            ));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.path must not be empty".to_string(),
            ));
        }
        for extra in &self.output.extras {
            if !KNOWN_EXTRAS.contains(&extra.as_str()) {
                warn!(extra = %extra, "ignoring unknown output extra");
            }
        }
        Ok(())
    }

    /// Add an input root.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input.paths.push(path.into());
        self
    }

    /// Set the source standard.
    pub fn with_standard(mut self, standard: &str) -> Self {
        self.input.standard = standard.to_string();
        self
    }

    /// Enable an extra feature flag.
    pub fn with_extra(mut self, extra: &str) -> Self {
        if !self.output.has_extra(extra) {
            self.output.extras.push(extra.to_string());
        }
        self
    }
}
