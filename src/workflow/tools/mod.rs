//! External tool adapters.
//!
//! Each pipeline stage talks to one opaque command-line tool through a small
//! trait, so the orchestrator only ever sees success or a `ToolError`.
//! The process-backed implementations share [`runner::run_tool`].

pub mod encoder;
pub mod fetcher;
pub mod runner;
pub mod separator;

use std::{io, path::Path, sync::Arc, time::Duration};
use thiserror::Error;

use crate::config::AppConfig;

pub use encoder::FfmpegEncoder;
pub use fetcher::YtDlpFetcher;
pub use separator::SpleeterSeparator;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to wait on `{program}`")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with status {code:?}: {stderr}")]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("`{program}` did not finish within {limit:?}")]
    TimedOut { program: String, limit: Duration },
}

/// Diagnostic output captured from a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Downloads the audio of `url` as a 2-channel 44.1 kHz wav at `out_path`.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, out_path: &Path) -> Result<ToolOutput, ToolError>;
}

/// Splits `input` into stems under `out_dir/<input file stem>/`.
pub trait Separator: Send + Sync {
    fn separate(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolError>;
}

/// Transcodes `input` into the final mp3 at `out_path`, overwriting it.
pub trait Encoder: Send + Sync {
    fn encode(&self, input: &Path, out_path: &Path) -> Result<ToolOutput, ToolError>;
}

/// The three adapters one pipeline run uses.
#[derive(Clone)]
pub struct Toolchain {
    pub fetcher: Arc<dyn Fetcher>,
    pub separator: Arc<dyn Separator>,
    pub encoder: Arc<dyn Encoder>,
}

impl Toolchain {
    pub fn new(
        fetcher: impl Fetcher + 'static,
        separator: impl Separator + 'static,
        encoder: impl Encoder + 'static,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            separator: Arc::new(separator),
            encoder: Arc::new(encoder),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            YtDlpFetcher::new(&config.ytdlp_path, &config.ffmpeg_path),
            SpleeterSeparator::new(&config.python_path, config.separation_timeout()),
            FfmpegEncoder::new(&config.ffmpeg_path),
        )
    }
}
