use std::{
    path::{Path, PathBuf},
    process::Command,
};

use super::{Fetcher, ToolError, ToolOutput, runner::run_tool};
use crate::common::{RAW_AUDIO_CHANNELS, RAW_AUDIO_SAMPLE_RATE};

/// Fetches remote audio with `yt-dlp`, extracting it to wav through ffmpeg.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: PathBuf,
    ffmpeg_location: PathBuf,
}

impl YtDlpFetcher {
    pub fn new(program: impl Into<PathBuf>, ffmpeg_location: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ffmpeg_location: ffmpeg_location.into(),
        }
    }

    fn command(&self, url: &str, out_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--ffmpeg-location")
            .arg(&self.ffmpeg_location)
            .args([
                "--force-ipv4",
                "--no-playlist",
                "-f",
                "bestaudio",
                "--force-overwrites",
                "-x",
                "--audio-format",
                "wav",
                "--postprocessor-args",
                &format!("-ac {} -ar {}", RAW_AUDIO_CHANNELS, RAW_AUDIO_SAMPLE_RATE),
                "-o",
            ])
            .arg(out_path)
            .arg(url);
        cmd
    }
}

impl Fetcher for YtDlpFetcher {
    fn fetch(&self, url: &str, out_path: &Path) -> Result<ToolOutput, ToolError> {
        run_tool(self.command(url, out_path), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_requests_single_ipv4_wav_download() {
        let fetcher = YtDlpFetcher::new("yt-dlp", "/opt/ffmpeg/bin/ffmpeg");
        let cmd = fetcher.command("https://example.com/video", Path::new("/out/id_raw.wav"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(cmd.get_program(), "yt-dlp");
        assert_eq!(&args[..2], ["--ffmpeg-location", "/opt/ffmpeg/bin/ffmpeg"]);
        for flag in ["--force-ipv4", "--no-playlist", "--force-overwrites", "-x"] {
            assert!(args.iter().any(|a| a == flag), "missing {flag}");
        }
        let pp = args.iter().position(|a| a == "--postprocessor-args").unwrap();
        assert_eq!(args[pp + 1], "-ac 2 -ar 44100");
        assert_eq!(
            &args[args.len() - 3..],
            ["-o", "/out/id_raw.wav", "https://example.com/video"]
        );
    }
}
