use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use super::{Separator, ToolError, ToolOutput, runner::run_tool};
use crate::common::{SPLEETER_MAX_AUDIO_SECS, SPLEETER_MODEL};

/// Runs `python -m spleeter separate` as a long, non-interactive batch call.
#[derive(Debug, Clone)]
pub struct SpleeterSeparator {
    python: PathBuf,
    timeout: Duration,
}

impl SpleeterSeparator {
    pub fn new(python: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            timeout,
        }
    }

    fn command(&self, input: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-m", "spleeter", "separate", "-p", SPLEETER_MODEL, "-o"])
            .arg(out_dir)
            .args(["-d", &SPLEETER_MAX_AUDIO_SECS.to_string()])
            .arg(input);
        cmd
    }
}

impl Separator for SpleeterSeparator {
    fn separate(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolError> {
        run_tool(self.command(input, out_dir), Some(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_uses_two_stem_model() {
        let separator = SpleeterSeparator::new("python3", Duration::from_secs(10));
        let cmd = separator.command(Path::new("/out/id_raw.wav"), Path::new("/out"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(cmd.get_program(), "python3");
        assert_eq!(
            args,
            [
                "-m",
                "spleeter",
                "separate",
                "-p",
                "spleeter:2stems",
                "-o",
                "/out",
                "-d",
                "3600",
                "/out/id_raw.wav",
            ]
        );
    }
}
