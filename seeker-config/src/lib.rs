//! Configuration for the `seeker` binary.
//!
//! Two layers live here:
//!
//! - [`RawInvocation`] / [`Invocation`]: the per-run process input (question,
//!   GPTScript workspace, browser override), validated before any work starts.
//! - [`SeekerConfigLoader`]: collaborator settings from an optional YAML/TOML
//!   file overlaid with `SEEKER__`-prefixed environment variables. String
//!   values may reference other variables as `${VAR}`; expansion is recursive
//!   up to a fixed depth.
use config::{Config, ConfigError, Environment, File};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub mod invocation;
pub mod settings;

pub use invocation::{Invocation, RawInvocation};
pub use settings::{
    BrowserSettings, LlmSettings, LoggingSettings, SearchSettings, SeekerSettings,
    WebDriverEndpoints,
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "SEEKER";
const DEFAULT_FILE_NAME: &str = "seeker.yaml";

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) if s.contains('$') => {
            let mut cur = std::mem::take(s);
            for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                let expanded = match shellexpand::env(&cur) {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => break,
                };
                if expanded == cur {
                    break;
                }
                cur = expanded;
            }
            *s = cur;
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Default settings location: `<config dir>/seeker/seeker.yaml`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("seeker").join(DEFAULT_FILE_NAME))
}

/// Builder hiding the `config` crate wiring (files + env overrides).
pub struct SeekerConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SeekerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SeekerConfigLoader {
    /// Start with no file sources; environment overrides are applied last
    /// by [`load`](Self::load) so they always win.
    ///
    /// ```
    /// use seeker_config::SeekerConfigLoader;
    ///
    /// let settings = SeekerConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(settings.search.max_pages, 5);
    /// assert!(settings.browser.headless);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is read only if present.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach [`default_settings_path`] as an optional source.
    pub fn with_default_location(self) -> Self {
        match default_settings_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use seeker_config::{LlmSettings, SeekerConfigLoader};
    ///
    /// let settings = SeekerConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: ollama
    ///   model: "llama3.2:3b"
    /// search:
    ///   max_pages: 2
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(settings.search.max_pages, 2);
    /// assert!(matches!(settings.llm, LlmSettings::Ollama { .. }));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    pub fn load(self) -> Result<SeekerSettings, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SeekerSettings =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        tracing::debug!(target: "config", search = ?typed.search, headless = typed.browser.headless, "settings loaded");
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("SEEKER_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${SEEKER_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_objects_and_arrays() {
        temp_env::with_vars(
            [("SEEKER_TEST_HOST", Some("gw.local")), ("SEEKER_TEST_PORT", Some("8080"))],
            || {
                let mut v = json!({
                    "llm": { "endpoint": "http://${SEEKER_TEST_HOST}:${SEEKER_TEST_PORT}/v1" },
                    "list": ["$SEEKER_TEST_HOST", 3, null]
                });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({
                        "llm": { "endpoint": "http://gw.local:8080/v1" },
                        "list": ["gw.local", 3, null]
                    })
                );
            },
        );
    }

    #[test]
    fn expansion_terminates_on_cycles() {
        temp_env::with_vars(
            [("SEEKER_TEST_A", Some("${SEEKER_TEST_B}")), ("SEEKER_TEST_B", Some("${SEEKER_TEST_A}"))],
            || {
                let mut v = json!("x=${SEEKER_TEST_A}-y");
                expand_env_in_value(&mut v);
                let s = v.as_str().unwrap();
                assert!(s.starts_with("x=") && s.ends_with("-y"));
                assert!(s.contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${SEEKER_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${SEEKER_TEST_DOES_NOT_EXIST}"));
    }
}
