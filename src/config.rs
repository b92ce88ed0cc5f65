use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    bind_addr: Option<String>,
    upstream_url: Option<String>,
    frontend_dist: Option<String>,
    demo_fasta_path: Option<String>,
    upstream_timeout_seconds: Option<u64>,
    max_upload_mb: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RootConfig {
    #[serde(default, flatten)]
    top: FileConfig,
    covvar_web: Option<FileConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Base URL of the prediction backend that owns `/api/*`.
    pub upstream_url: String,
    pub frontend_dist: String,
    pub demo_fasta_path: String,
    pub upstream_timeout_seconds: u64,
    pub max_upload_mb: usize,
    pub config_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            upstream_url: "http://127.0.0.1:5000".to_string(),
            frontend_dist: "frontend/dist".to_string(),
            demo_fasta_path: "static/demo/demo.fasta".to_string(),
            upstream_timeout_seconds: 300,
            max_upload_mb: 50,
            config_path: PathBuf::from("covvar.toml"),
        }
    }
}

impl AppConfig {
    /// Defaults, then the first config file found, then `COVVAR_WEB_*`
    /// environment variables.
    pub fn load() -> Self {
        let mut cfg = Self::default();

        let config_path = find_config_file().unwrap_or_else(|| config_search_paths()[0].clone());
        cfg.config_path = config_path.clone();

        let root = load_root_config(&config_path).unwrap_or_else(|err| {
            warn!("ignoring config file {}: {err:#}", config_path.display());
            RootConfig::default()
        });
        cfg.apply_root(root);
        cfg.apply_env();
        cfg
    }

    fn apply_root(&mut self, root: RootConfig) {
        let RootConfig { top, covvar_web } = root;
        self.apply_file(top);
        if let Some(section) = covvar_web {
            self.apply_file(section);
        }
    }

    fn apply_file(&mut self, file_cfg: FileConfig) {
        set_opt(&mut self.bind_addr, file_cfg.bind_addr);
        set_opt(
            &mut self.upstream_url,
            file_cfg
                .upstream_url
                .map(|url| url.trim_end_matches('/').to_string()),
        );
        set_opt(&mut self.frontend_dist, file_cfg.frontend_dist);
        set_opt(&mut self.demo_fasta_path, file_cfg.demo_fasta_path);
        set_opt_u64_min(
            &mut self.upstream_timeout_seconds,
            file_cfg.upstream_timeout_seconds,
            5,
        );
        set_opt_usize_min(&mut self.max_upload_mb, file_cfg.max_upload_mb, 1);
    }

    fn apply_env(&mut self) {
        let env_cfg = FileConfig {
            bind_addr: env_string("COVVAR_WEB_BIND_ADDR"),
            upstream_url: env_string("COVVAR_WEB_UPSTREAM_URL"),
            frontend_dist: env_string("COVVAR_WEB_FRONTEND_DIST"),
            demo_fasta_path: env_string("COVVAR_WEB_DEMO_FASTA_PATH"),
            upstream_timeout_seconds: env_parse("COVVAR_WEB_UPSTREAM_TIMEOUT_SECONDS"),
            max_upload_mb: env_parse("COVVAR_WEB_MAX_UPLOAD_MB"),
        };
        self.apply_file(env_cfg);
    }

    pub fn frontend_dist(&self) -> PathBuf {
        PathBuf::from(&self.frontend_dist)
    }

    pub fn demo_fasta_path(&self) -> PathBuf {
        PathBuf::from(&self.demo_fasta_path)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("covvar.toml"), PathBuf::from("config.toml")];
    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("covvar-web").join("config.toml"));
    }
    paths
}

pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths().into_iter().find(|path| path.exists())
}

fn dirs_home() -> Option<PathBuf> {
    env::var("HOME").ok().map(PathBuf::from)
}

fn load_root_config(path: &Path) -> Result<RootConfig> {
    if !path.exists() {
        return Ok(RootConfig::default());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("failed reading {path:?}"))?;
    toml::from_str::<RootConfig>(&raw).context("failed parsing config as root structure")
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_parse<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn set_opt<T>(dst: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *dst = v;
    }
}

fn set_opt_usize_min(dst: &mut usize, value: Option<usize>, min: usize) {
    if let Some(v) = value {
        *dst = v.max(min);
    }
}

fn set_opt_u64_min(dst: &mut u64, value: Option<u64>, min: u64) {
    if let Some(v) = value {
        *dst = v.max(min);
    }
}
