use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::{Cli, ReportFormat};

/// Where the Dash License Tool jar is published.
pub const DASH_LICENSES_URL: &str = "https://repo.eclipse.org/service/local/artifact/maven/redirect?r=dash-licenses&g=org.eclipse.dash&a=org.eclipse.dash.licenses&v=LATEST";

/// Root configuration structure, deserialized from `.license-gate/config.toml`.
///
/// Every section and field is optional; anything missing keeps its default.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub tool: ToolConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Lockfile handed to the scanner.
    pub lockfile: PathBuf,
    /// Summary report the scanner writes.
    pub summary: PathBuf,
    /// Baseline of accepted restricted dependencies.
    pub baseline: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            lockfile: PathBuf::from("yarn.lock"),
            summary: PathBuf::from("dependency-check-summary.txt"),
            baseline: PathBuf::from("dependency-check-baseline.json"),
        }
    }
}

/// How the scanner is located and invoked.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Local path of the scanner jar; downloaded from `url` when missing.
    pub path: PathBuf,
    pub url: String,
    /// Java launcher.
    pub java: String,
    /// Passed through as `-batch`.
    pub batch: u32,
    /// Passed through as `-timeout`, in seconds.
    pub timeout: u32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            path: PathBuf::from("download").join("dash-licenses.jar"),
            url: DASH_LICENSES_URL.to_string(),
            java: "java".to_string(),
            batch: 50,
            timeout: 240,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub backend: FetchBackend,
    /// HTTP client program used by the `curl` backend.
    pub curl: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            backend: FetchBackend::Curl,
            curl: "curl".to_string(),
        }
    }
}

/// Download strategy for the scanner artifact.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// Spawn an external HTTP client.
    #[default]
    Curl,
    /// Download in-process.
    Builtin,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-gate/config.toml`
/// 3. `~/.config/license-gate/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-gate").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("license-gate").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Color is off with `--no-color` or when `NO_COLOR` holds any non-empty value.
pub fn color_disabled(flag: bool, no_color_env: Option<&str>) -> bool {
    flag || no_color_env.is_some_and(|v| !v.is_empty())
}

/// Fully resolved run settings. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub lockfile: PathBuf,
    pub summary: PathBuf,
    pub baseline: PathBuf,
    pub tool_path: PathBuf,
    pub tool_url: String,
    pub java: String,
    pub batch: u32,
    pub timeout: u32,
    pub fetch_backend: FetchBackend,
    pub curl: String,
    pub skip_scan: bool,
    pub write_baseline: bool,
    pub report: ReportFormat,
    pub no_color: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl Settings {
    /// Merge the config file with CLI flags (flags win) and the `NO_COLOR` toggle.
    pub fn resolve(config: Config, cli: &Cli, no_color_env: Option<&str>) -> Self {
        Settings {
            lockfile: cli.lockfile.clone().unwrap_or(config.paths.lockfile),
            summary: cli.summary.clone().unwrap_or(config.paths.summary),
            baseline: cli.baseline.clone().unwrap_or(config.paths.baseline),
            tool_path: config.tool.path,
            tool_url: config.tool.url,
            java: config.tool.java,
            batch: config.tool.batch,
            timeout: config.tool.timeout,
            fetch_backend: config.fetch.backend,
            curl: config.fetch.curl,
            skip_scan: cli.skip_scan,
            write_baseline: cli.write_baseline,
            report: cli.report,
            no_color: color_disabled(cli.no_color, no_color_env),
            verbose: cli.verbose,
            quiet: cli.quiet,
        }
    }

    /// Backup location for the previous run's summary.
    pub fn summary_backup(&self) -> PathBuf {
        let mut name = self.summary.clone().into_os_string();
        name.push(".old");
        PathBuf::from(name)
    }
}
