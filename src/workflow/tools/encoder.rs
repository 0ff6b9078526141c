use std::{
    path::{Path, PathBuf},
    process::Command,
};

use super::{Encoder, ToolError, ToolOutput, runner::run_tool};
use crate::common::OUTPUT_BITRATE;

/// Re-encodes the separated stem to mp3 with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Base `ffmpeg` command with the flags that keep it quiet and non-interactive.
    /// These global options must come before the input/output options.
    fn create_silent_ffmpeg_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-v", "quiet", "-hide_banner", "-nostats", "-nostdin"]);
        cmd
    }

    fn command(&self, input: &Path, out_path: &Path) -> Command {
        let mut cmd = self.create_silent_ffmpeg_command();
        cmd.args(["-y", "-i"])
            .arg(input)
            .args(["-b:a", OUTPUT_BITRATE, "-map", "0:a"])
            .arg(out_path);
        cmd
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, input: &Path, out_path: &Path) -> Result<ToolOutput, ToolError> {
        run_tool(self.command(input, out_path), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_maps_audio_only_at_fixed_bitrate() {
        let encoder = FfmpegEncoder::new("ffmpeg");
        let cmd = encoder.command(
            Path::new("/out/id_raw/vocals.wav"),
            Path::new("/out/id_vocals.mp3"),
        );
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            [
                "-v",
                "quiet",
                "-hide_banner",
                "-nostats",
                "-nostdin",
                "-y",
                "-i",
                "/out/id_raw/vocals.wav",
                "-b:a",
                "320k",
                "-map",
                "0:a",
                "/out/id_vocals.mp3",
            ]
        );
    }
}
