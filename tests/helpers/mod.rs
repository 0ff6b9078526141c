//! Shared fixtures: stub tool adapters and a client over a temporary output directory.

use std::fs;
use std::path::Path;

use rocket::local::asynchronous::Client;
use tempfile::TempDir;
use vocalis::build_rocket;
use vocalis::config::AppConfig;
use vocalis::workflow::store::FileStore;
use vocalis::workflow::tools::{Encoder, Fetcher, Separator, ToolError, ToolOutput, Toolchain};

fn exit_one(program: &str) -> ToolError {
    ToolError::Exit {
        program: program.to_string(),
        code: Some(1),
        stderr: "stub failure".to_string(),
    }
}

pub struct StubFetcher {
    pub succeed: bool,
}

impl Fetcher for StubFetcher {
    fn fetch(&self, _url: &str, out_path: &Path) -> Result<ToolOutput, ToolError> {
        if !self.succeed {
            return Err(exit_one("yt-dlp"));
        }
        fs::write(out_path, b"RIFF....WAVE").expect("write raw stub");
        Ok(ToolOutput::default())
    }
}

pub struct StubSeparator {
    pub succeed: bool,
    pub write_vocals: bool,
}

impl Separator for StubSeparator {
    fn separate(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolError> {
        if !self.succeed {
            return Err(exit_one("python3"));
        }
        let folder = out_dir.join(input.file_stem().expect("input has a stem"));
        fs::create_dir_all(&folder).expect("create separation folder");
        fs::write(folder.join("accompaniment.wav"), b"RIFF").expect("write accompaniment");
        if self.write_vocals {
            fs::write(folder.join("vocals.wav"), b"RIFF").expect("write vocals");
        }
        Ok(ToolOutput::default())
    }
}

pub struct StubEncoder {
    pub succeed: bool,
}

pub const FAKE_MP3: &[u8] = b"ID3\x04fake-mp3-payload";

impl Encoder for StubEncoder {
    fn encode(&self, _input: &Path, out_path: &Path) -> Result<ToolOutput, ToolError> {
        if !self.succeed {
            return Err(exit_one("ffmpeg"));
        }
        fs::write(out_path, FAKE_MP3).expect("write mp3 stub");
        Ok(ToolOutput::default())
    }
}

pub struct Scenario {
    pub fetch: bool,
    pub separate: bool,
    pub write_vocals: bool,
    pub encode: bool,
}

impl Scenario {
    pub fn happy() -> Self {
        Self {
            fetch: true,
            separate: true,
            write_vocals: true,
            encode: true,
        }
    }
}

pub const BASE_URL: &str = "http://127.0.0.1:8000";

/// Builds a tracked client whose output directory lives in the returned `TempDir`.
pub async fn client(scenario: Scenario) -> (Client, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = AppConfig {
        output_dir: dir.path().to_path_buf(),
        public_base_url: BASE_URL.to_string(),
        ..AppConfig::default()
    };
    let store = FileStore::new(&config.output_dir);
    let tools = Toolchain::new(
        StubFetcher {
            succeed: scenario.fetch,
        },
        StubSeparator {
            succeed: scenario.separate,
            write_vocals: scenario.write_vocals,
        },
        StubEncoder {
            succeed: scenario.encode,
        },
    );
    let client = Client::tracked(build_rocket(config, store, tools))
        .await
        .expect("valid rocket instance");
    (client, dir)
}
