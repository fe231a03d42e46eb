//! Configuration module for the coaching engine.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `MC_` and use double underscores
//! to separate nested levels:
//! - `MC_GENERATOR__TIMEOUT_MS=3000` sets `generator.timeout_ms`
//! - `MC_POLICY__CONFIRMATION_POLICY=never` sets `policy.confirmation_policy`
//! - `MC_TEMPLATES__SEED=7` sets `templates.seed`

use crate::error::{CoachError, CoachResult};
use crate::guardrail::Taxonomy;
use crate::policy::PolicyConfig;
use crate::templates::TemplateConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = ".mathcoach";
const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Enable debug output
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Response policy switches
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Text generator limits
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Template bank overrides
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Additional recognizers
    #[serde(default)]
    pub guardrail: GuardrailConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Deadline for one generator or analyzer call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on reply length requested from the generator
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Model identifier passed through to the generator backend
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct GuardrailConfig {
    /// Extra patterns keyed by category name, e.g. `answer_seeking`
    #[serde(default)]
    pub extra_patterns: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_max_tokens() -> u32 {
    300
}
fn default_temperature() -> f32 {
    0.7
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            policy: PolicyConfig::default(),
            generator: GeneratorConfig::default(),
            templates: TemplateConfig::default(),
            guardrail: GuardrailConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            model: default_model(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl GuardrailConfig {
    /// Builtin taxonomy extended with the configured patterns
    pub fn taxonomy(&self) -> CoachResult<Taxonomy> {
        if self.extra_patterns.is_empty() {
            return Ok(Taxonomy::builtin());
        }
        Taxonomy::with_extra_patterns(&self.extra_patterns)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .mathcoach directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels
            .merge(Env::prefixed("MC_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the workspace settings file by looking for a .mathcoach directory
    /// from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Settings file in effect, if one exists
    pub fn config_path() -> Option<PathBuf> {
        Self::find_workspace_config().filter(|path| path.exists())
    }

    /// Reject settings that would only fail later, at classification time
    pub fn validate(&self) -> CoachResult<()> {
        if self.generator.timeout_ms == 0 {
            return Err(CoachError::ConfigError {
                reason: "generator.timeout_ms must be greater than zero".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(CoachError::ConfigError {
                reason: format!(
                    "generator.temperature must be between 0.0 and 2.0, got {}",
                    self.generator.temperature
                ),
            });
        }
        self.guardrail.taxonomy().map(|_| ())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    /// Same as [`Settings::init_config_file`], rooted at `root`
    pub fn init_config_file_in(
        root: &Path,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, SETTINGS_TEMPLATE)?;
        Ok(config_path)
    }
}

const SETTINGS_TEMPLATE: &str = r#"# mathcoach configuration file

# Version of the configuration schema
version = 1

# Enable debug output
debug = false

[policy]
# How "is 42 correct?" style messages are handled:
#   "with_shown_work" - bare guesses get a justification request, messages
#                       that show reasoning go to the coach (still leak-scanned)
#   "never"           - always ask for justification
confirmation_policy = "with_shown_work"

# Replies that hand over a formula:
#   "allow"   - deliver and record the detection
#   "replace" - suppress like an answer leak
formula_dump_action = "allow"

[generator]
# Deadline for one generator call, in milliseconds
timeout_ms = 10000
max_tokens = 300
temperature = 0.7
model = "gpt-4o-mini"

[templates]
# Pin template selection for reproducible audits
# seed = 42

# Replace the builtin sets. Empty lists keep the builtin phrasing.
# refusals = ["Let's work it out together."]
# persistence = []

# [templates.hints]
# tier1 = []
# tier2 = []
# tier3 = []

# [templates.phrases]
# answer_redirect = "Let's focus on the approach. What's the first thing you notice about this problem?"
# shown_work_redirect = "Nice steps. Put your result back into the problem: does it hold?"
# welcome = "Let's work on this together:\n\n**{problem}**\n\n{observation}What do we know so far?"

[guardrail.extra_patterns]
# Additional case-insensitive patterns per category
# answer_seeking = ["what number goes in the box"]
# answer_leak = ["the missing number is \\d+"]

[logging]
# error, warn, info, debug or trace
level = "warn"
"#;
