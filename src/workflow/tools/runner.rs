use log::debug;
use std::{
    io::Read,
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use super::{ToolError, ToolOutput};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STDERR_TAIL_LINES: usize = 20;

/// Runs `command` to completion with stdout/stderr captured.
///
/// With a `limit`, the child is killed once it has run that long and
/// `ToolError::TimedOut` is returned.
pub fn run_tool(mut command: Command, limit: Option<Duration>) -> Result<ToolOutput, ToolError> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!("Running {:?}", command);

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout_rx = drain(child.stdout.take());
    let stderr_rx = drain(child.stderr.take());

    let status = match wait(&mut child, limit) {
        Ok(status) => status,
        Err(source) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::Wait { program, source });
        }
    };

    let Some(status) = status else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(ToolError::TimedOut {
            program,
            limit: limit.unwrap_or_default(),
        });
    };

    let stdout = collect(stdout_rx);
    let stderr = collect(stderr_rx);

    if status.success() {
        Ok(ToolOutput { stdout, stderr })
    } else {
        Err(ToolError::Exit {
            program,
            code: status.code(),
            stderr: tail(&stderr, STDERR_TAIL_LINES),
        })
    }
}

/// `Ok(None)` means the limit elapsed before the child exited.
fn wait(child: &mut Child, limit: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
    let Some(limit) = limit else {
        return child.wait().map(Some);
    };
    let started_at = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started_at.elapsed() >= limit {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// Pipes are read on their own threads so a chatty child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
    }
    rx
}

fn collect(rx: mpsc::Receiver<Vec<u8>>) -> String {
    rx.recv()
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn captures_output_on_success() {
        let output = run_tool(sh("echo out; echo err >&2"), None).unwrap();
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn non_zero_exit_is_an_error_with_stderr() {
        let err = run_tool(sh("echo boom >&2; exit 3"), None).unwrap_err();
        match err {
            ToolError::Exit { program, code, stderr } => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run_tool(Command::new("/nonexistent/vocalis-tool"), None).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[test]
    fn limit_kills_long_running_child() {
        let started = Instant::now();
        let err = run_tool(sh("sleep 5"), Some(Duration::from_millis(200))).unwrap_err();
        assert!(matches!(err, ToolError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn finishes_within_limit() {
        let output = run_tool(sh("echo quick"), Some(Duration::from_secs(10))).unwrap();
        assert_eq!(output.stdout.trim(), "quick");
    }

    #[test]
    fn wait_failure_is_reported_separately_from_spawn() {
        let err = ToolError::Wait {
            program: "python3".to_string(),
            source: std::io::Error::other("interrupted"),
        };
        assert_eq!(err.to_string(), "failed to wait on `python3`");
        assert!(!matches!(err, ToolError::Spawn { .. }));
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
        assert_eq!(tail("", 5), "");
    }
}
