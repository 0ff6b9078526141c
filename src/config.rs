use anyhow::{Context, Result};
use dotenv::dotenv;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Startup configuration, read once from `VOCALIS_*` environment variables
/// (after loading `.env` when present).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding raw downloads, separation folders and final artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,
    /// Interpreter used to run `-m spleeter`
    #[serde(default = "default_python_path")]
    pub python_path: PathBuf,
    /// Prefix of the `download_url` handed back by `/process`
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_separation_timeout_secs")]
    pub separation_timeout_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./outputs")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_python_path() -> PathBuf {
    PathBuf::from("python3")
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_retention_secs() -> u64 {
    86_400
}

fn default_sweep_interval_secs() -> u64 {
    3_600
}

// Spleeter's own `-d 3600` cap plus a minute for model loading.
fn default_separation_timeout_secs() -> u64 {
    3_660
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            ffmpeg_path: default_ffmpeg_path(),
            ytdlp_path: default_ytdlp_path(),
            python_path: default_python_path(),
            public_base_url: default_public_base_url(),
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            separation_timeout_secs: default_separation_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        envy::prefixed("VOCALIS_")
            .from_env::<AppConfig>()
            .context("failed to read VOCALIS_* configuration from the environment")
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn separation_timeout(&self) -> Duration {
        Duration::from_secs(self.separation_timeout_secs)
    }

    pub fn download_url(&self, filename: &str) -> String {
        format!(
            "{}/download/{}",
            self.public_base_url.trim_end_matches('/'),
            filename
        )
    }
}
