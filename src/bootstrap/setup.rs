//! Setup/initialization module - handles application startup tasks
//!
//! Includes:
//! - External tool availability check (yt-dlp, ffmpeg, spleeter)
//! - Output folder initialization
//! - Logger initialization

use anyhow::Result;
use env_logger::fmt::style::{AnsiColor, Style};
use env_logger::{Builder, WriteStyle};
use log::kv::Key;
use log::{error, info};
use std::{io::Write, path::Path, process::Command};

use crate::config::AppConfig;
use crate::workflow::store::FileStore;

// ────────────────────────────────────────────────────────────────
// Tool Check
// ────────────────────────────────────────────────────────────────

/// Logs the version of every external tool the pipeline needs.
/// A missing tool is reported but does not stop startup.
pub fn check_tools(config: &AppConfig) {
    check_tool(&config.ytdlp_path, &["--version"], "yt-dlp");
    check_tool(&config.ffmpeg_path, &["-version"], "ffmpeg");
    check_tool(
        &config.python_path,
        &["-m", "spleeter", "--version"],
        "spleeter",
    );
}

fn check_tool(program: &Path, args: &[&str], name: &str) {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            let version_info = String::from_utf8_lossy(&output.stdout);
            let version = version_info
                .lines()
                .next()
                .unwrap_or("Unknown version")
                .trim();
            info!("{} version: {}", name, version);
        }
        Ok(_) => {
            error!(
                "`{}` was found at {:?}, but it returned an error. Please ensure it's correctly installed.",
                name, program
            );
        }
        Err(_) => {
            error!(
                "`{}` is not installed or not available at {:?}. Please install it before running the application.",
                name, program
            );
        }
    }
}

// ────────────────────────────────────────────────────────────────
// Folder Initialization
// ────────────────────────────────────────────────────────────────

pub fn initialize_folder(store: &FileStore) -> Result<()> {
    store.ensure_dir()?;
    info!("Output directory: {:?}", store.output_dir());
    Ok(())
}

// ────────────────────────────────────────────────────────────────
// Logger Initialization
// ────────────────────────────────────────────────────────────────

/// Initialize the logger. `RUST_LOG` overrides the default filters.
pub fn initialize_logger() {
    let dim = Style::new().fg_color(Some(AnsiColor::BrightBlack.into()));
    let cyan = Style::new().fg_color(Some(AnsiColor::Cyan.into()));

    let _ = Builder::new()
        .write_style(WriteStyle::Auto)
        .format(move |buf, record| {
            let ts = buf.timestamp();

            let level_style = buf.default_level_style(record.level());

            // Format an attached `duration` key to 2 decimal places
            let dur_raw = record
                .key_values()
                .get(Key::from("duration"))
                .map(|v| {
                    let s = format!("{}", v);
                    if let Some(idx) = s.find(|c: char| c.is_alphabetic()) {
                        let (num, unit) = (&s[..idx], &s[idx..]);
                        if let Ok(val) = num.parse::<f32>() {
                            return format!("{:.2} {}", val, unit);
                        }
                    }
                    s
                })
                .unwrap_or_default();

            writeln!(
                buf,
                "{dim}{ts}{dim:#} {level_style}{}{level_style:#} {dim}{}{dim:#}",
                record.level(),
                record.target(),
            )?;

            let dur = if dur_raw.is_empty() {
                " ".repeat(10)
            } else {
                format!("{cyan}{:>10}{cyan:#}", dur_raw)
            };

            let message = format!("{}", record.args());
            let subsequent_indent = " ".repeat(11);
            let mut lines = message.lines();
            if let Some(first_line) = lines.next() {
                writeln!(buf, "{} {}", dur, first_line)?;
            }
            for line in lines {
                writeln!(buf, "{}{}", subsequent_indent, line)?;
            }

            Ok(())
        })
        // INFO+ globally, WARN+ for Rocket
        .filter(None, log::LevelFilter::Info)
        .filter(Some("rocket"), log::LevelFilter::Warn)
        .parse_default_env()
        .try_init();
}
