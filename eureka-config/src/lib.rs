//! Loader for service configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every section has one, so no file is required)
//! 2. an optional or required YAML/TOML/JSON file
//! 3. inline YAML snippets (tests, CLI)
//! 4. `EUREKA__`-prefixed environment variables, `__` separating sections
//!    (`EUREKA__SEARCH__MODE=browser`)
//!
//! After merging, every string value goes through `${VAR}` / `${VAR:-default}`
//! expansion so secrets can stay in the environment.
use config::{Config, ConfigError, Environment, File, FileFormat};
use eureka_common::observability::LogFormat;
use eureka_common::AcquisitionMode;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Placeholder substituted with the percent-encoded query in `url_template`.
pub const QUERY_PLACEHOLDER: &str = "{query}";

// Lowest-precedence layer. Keeps the legacy `API_TOKEN` variable working.
const BUILTIN_DEFAULTS: &str = r#"
auth:
  api_token: "${API_TOKEN:-}"
"#;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EurekaConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub extract: ExtractConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".into(),
        }
    }
}

/// Shared-secret authorization. An empty token disables the check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub api_token: Option<String>,
}

impl AuthConfig {
    /// The configured token, if any. Blank values and placeholders that
    /// survived expansion count as unset.
    pub fn token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.contains("${"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub mode: AcquisitionMode,
    /// Landing page holding the search form; also the fallback base for links.
    pub base_url: String,
    /// Results page address; must contain [`QUERY_PLACEHOLDER`].
    pub url_template: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub timeout_secs: u64,
    pub retries: usize,
    /// Upper bound on concurrently open browser sessions.
    pub max_sessions: usize,
    pub input_selectors: Vec<String>,
    pub submit_selectors: Vec<String>,
    pub result_selectors: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: AcquisitionMode::Http,
            base_url: "https://eureka.mf.gov.pl/".into(),
            url_template: "https://eureka.mf.gov.pl/informacje/wyszukiwanie?q={query}".into(),
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            timeout_secs: 20,
            retries: 2,
            max_sessions: 2,
            input_selectors: vec![
                "input[type='search']".into(),
                "input[name='q']".into(),
                "input[name='phrase']".into(),
                "input[placeholder*='Szukaj']".into(),
                "form input[type='text']".into(),
            ],
            submit_selectors: vec![
                "button[type='submit']".into(),
                "input[type='submit']".into(),
                "form button".into(),
            ],
            result_selectors: vec![
                "a[href*='/informacje/podglad/']".into(),
                ".search-results a".into(),
                "ul li a".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub path_marker: String,
    pub keyword: String,
    /// Global ceiling on anchors scanned per page.
    pub max_anchors: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            path_marker: "/informacje/podglad/".into(),
            keyword: "interpretac".into(),
            max_anchors: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            dir: None,
            filter: "info".into(),
        }
    }
}

impl EurekaConfig {
    /// Reject combinations that would only fail later, at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.search.url_template.contains(QUERY_PLACEHOLDER) {
            return Err(ConfigError::Message(format!(
                "search.url_template must contain {QUERY_PLACEHOLDER}: {}",
                self.search.url_template
            )));
        }
        url::Url::parse(&self.search.base_url).map_err(|e| {
            ConfigError::Message(format!("search.base_url is not a valid URL: {e}"))
        })?;
        if self.search.max_sessions == 0 {
            return Err(ConfigError::Message(
                "search.max_sessions must be at least 1".into(),
            ));
        }
        if self.extract.max_anchors == 0 {
            return Err(ConfigError::Message(
                "extract.max_anchors must be at least 1".into(),
            ));
        }
        if self.extract.path_marker.trim().is_empty() && self.extract.keyword.trim().is_empty() {
            return Err(ConfigError::Message(
                "extract.path_marker and extract.keyword cannot both be empty".into(),
            ));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (defaults + files + env overrides).
pub struct EurekaConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for EurekaConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl EurekaConfigLoader {
    /// Start from built-in defaults.
    ///
    /// ```
    /// use eureka_config::EurekaConfigLoader;
    ///
    /// let config = EurekaConfigLoader::new().load().expect("defaults are valid");
    /// assert_eq!(config.extract.path_marker, "/informacje/podglad/");
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(File::from_str(BUILTIN_DEFAULTS, FileFormat::Yaml));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing, so deployments can rely
    /// purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use eureka_common::AcquisitionMode;
    /// use eureka_config::EurekaConfigLoader;
    ///
    /// let cfg = EurekaConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// search:
    ///   mode: browser
    ///   timeout_secs: 5
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.search.mode, AcquisitionMode::Browser);
    /// assert_eq!(cfg.search.timeout_secs, 5);
    /// assert_eq!(cfg.search.max_sessions, 2);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are layered last, `${VAR}` placeholders are
    /// expanded, and the result is validated.
    ///
    /// ```
    /// use eureka_config::EurekaConfigLoader;
    ///
    /// unsafe { std::env::set_var("EUREKA_DOC_TOKEN", "injected-from-env"); }
    ///
    /// let config = EurekaConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// auth:
    ///   api_token: "${EUREKA_DOC_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.auth.token(), Some("injected-from-env"));
    ///
    /// unsafe { std::env::remove_var("EUREKA_DOC_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<EurekaConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("EUREKA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: EurekaConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
