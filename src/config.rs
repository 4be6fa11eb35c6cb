//! Configuration for proofa.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PROOFA_HOME, PROOFA_JUDGE,
//!    PROOFA_JUDGE_TIMEOUT_SECS, GEMINI_API_KEY)
//! 2. Config file (.proofa/config.yaml)
//! 3. Defaults (~/.proofa, heuristic judge, 60s deadline)
//!
//! Config file discovery:
//! - Searches current directory and parents for .proofa/config.yaml
//! - Paths in config file are relative to the .proofa/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::JudgeKind;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_LEGAL_FRAMEWORK: &str =
    "EU AI Act (Regulation 2024/1689), with US Copyright Office human authorship guidance";
pub const DEFAULT_JUDGE_INSTRUCTIONS: &str = "You are an impartial authorship judge. \
Assess whether creative text reflects substantial human creative control, citing concrete \
evidence such as specific intent, original constraints, and iterative refinement. \
Never reward length alone. Always answer with a single JSON object and nothing else.";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub judge: Option<JudgeConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to the .proofa/ directory)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JudgeConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub embedding_model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub legal_framework: Option<String>,
    pub instructions: Option<String>,
}

/// Resolved judge provider settings
#[derive(Debug, Clone)]
pub struct JudgeSettings {
    pub kind: JudgeKind,
    pub model: String,
    pub embedding_model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Hard deadline the orchestrator applies to every oracle call
    pub timeout: Duration,
    pub legal_framework: String,
    pub instructions: String,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            kind: JudgeKind::Heuristic,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS),
            legal_framework: DEFAULT_LEGAL_FRAMEWORK.to_string(),
            instructions: DEFAULT_JUDGE_INSTRUCTIONS.to_string(),
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to proofa home (engine state)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Judge provider settings
    pub judge: JudgeSettings,
}

impl ResolvedConfig {
    /// Directory holding the JSONL durable store
    pub fn store_dir(&self) -> PathBuf {
        self.home.join("store")
    }
}

/// Environment overrides, captured once so resolution stays a pure function
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub home: Option<String>,
    pub judge: Option<String>,
    pub timeout_seconds: Option<String>,
    pub api_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            home: std::env::var("PROOFA_HOME").ok(),
            judge: std::env::var("PROOFA_JUDGE").ok(),
            timeout_seconds: std::env::var("PROOFA_JUDGE_TIMEOUT_SECS").ok(),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".proofa").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge defaults, an optional config file and env overrides
fn resolve(
    default_home: PathBuf,
    file: Option<(&Path, &ConfigFile)>,
    env: &EnvOverrides,
) -> Result<ResolvedConfig> {
    let file_judge = file
        .and_then(|(_, config)| config.judge.clone())
        .unwrap_or_default();

    let home = if let Some(ref env_home) = env.home {
        PathBuf::from(env_home)
    } else if let Some((path, home_path)) =
        file.and_then(|(path, config)| config.paths.home.as_ref().map(|h| (path, h)))
    {
        let proofa_dir = path.parent().unwrap_or(Path::new("."));
        resolve_path(proofa_dir, home_path)
    } else {
        default_home
    };

    let defaults = JudgeSettings::default();

    let kind = match env.judge.as_deref().or(file_judge.provider.as_deref()) {
        Some(name) => name
            .parse::<JudgeKind>()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => defaults.kind,
    };

    let timeout_secs = match env.timeout_seconds.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid PROOFA_JUDGE_TIMEOUT_SECS: {}", raw))?,
        None => file_judge
            .timeout_seconds
            .unwrap_or(DEFAULT_JUDGE_TIMEOUT_SECS),
    };
    if timeout_secs == 0 {
        anyhow::bail!("Judge timeout must be at least one second");
    }

    let judge = JudgeSettings {
        kind,
        model: file_judge.model.unwrap_or(defaults.model),
        embedding_model: file_judge
            .embedding_model
            .unwrap_or(defaults.embedding_model),
        endpoint: file_judge.endpoint.unwrap_or(defaults.endpoint),
        api_key: env.api_key.clone().filter(|k| !k.trim().is_empty()),
        timeout: Duration::from_secs(timeout_secs),
        legal_framework: file_judge
            .legal_framework
            .unwrap_or(defaults.legal_framework),
        instructions: file_judge.instructions.unwrap_or(defaults.instructions),
    };

    Ok(ResolvedConfig {
        home,
        config_file: file.map(|(path, _)| path.to_path_buf()),
        judge,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".proofa");

    let env = EnvOverrides::from_env();

    match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            resolve(default_home, Some((&path, &file)), &env)
        }
        None => resolve(default_home, None, &env),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
