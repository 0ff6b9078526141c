//! Output directory management.
//!
//! Every path a job touches is derived here from its id, so the pipeline,
//! the download handler and the sweeper agree on one layout:
//!
//! - `<id>_raw.wav`           raw download
//! - `<id>_raw/vocals.wav`    separation output (folder named after the input)
//! - `<id>_vocals.mp3`        final artifact

use anyhow::{Context, Result};
use log::{info, warn};
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
    time::{Duration, SystemTime},
};
use thiserror::Error;

use crate::common::{RAW_SUFFIX, STEM_NAME};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),
}

/// Paths owned by a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub id: String,
    pub raw_audio: PathBuf,
    pub separation_folder: PathBuf,
    pub component: PathBuf,
    pub artifact: PathBuf,
}

impl JobPaths {
    pub fn artifact_name(&self) -> String {
        artifact_name(&self.id)
    }
}

pub fn artifact_name(id: &str) -> String {
    format!("{}_{}.mp3", id, STEM_NAME)
}

#[derive(Debug, Clone)]
pub struct FileStore {
    output_dir: PathBuf,
}

impl FileStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "failed to create output directory {:?}",
            self.output_dir
        ))
    }

    pub fn job_paths(&self, id: &str) -> JobPaths {
        // spleeter writes into a folder named after the input file stem
        let raw_stem = format!("{}{}", id, RAW_SUFFIX);
        let separation_folder = self.output_dir.join(&raw_stem);
        JobPaths {
            id: id.to_string(),
            raw_audio: self.output_dir.join(format!("{}.wav", raw_stem)),
            component: separation_folder.join(format!("{}.wav", STEM_NAME)),
            separation_folder,
            artifact: self.output_dir.join(artifact_name(id)),
        }
    }

    /// Maps a download filename to a file directly inside the output directory.
    ///
    /// Anything other than a single plain file name (separators, `..`, absolute
    /// paths, symlinks escaping the directory) resolves to `NotFound`.
    pub fn resolve_artifact(&self, filename: &str) -> Result<PathBuf, StoreError> {
        let not_found = || StoreError::NotFound(filename.to_string());

        if filename.contains(['/', '\\']) {
            return Err(not_found());
        }
        let mut components = Path::new(filename).components();
        let name = match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name,
            _ => return Err(not_found()),
        };

        let path = self.output_dir.join(name);
        if !path.is_file() {
            return Err(not_found());
        }

        let root = fs::canonicalize(&self.output_dir).map_err(|_| not_found())?;
        match fs::canonicalize(&path) {
            Ok(abs_path) if abs_path.starts_with(&root) => Ok(path),
            _ => Err(not_found()),
        }
    }

    /// Deletes top-level files older than `max_age` and returns how many went.
    ///
    /// The first I/O error ends the pass; it is logged and never surfaced.
    pub fn sweep_stale(&self, max_age: Duration) -> usize {
        let mut removed = 0;
        let sweep = self.sweep_into(max_age, &mut removed, |p| fs::remove_file(p));
        if let Err(err) = sweep {
            warn!(
                "Sweep of {:?} stopped after {} deletions: {}",
                self.output_dir, removed, err
            );
        }
        if removed > 0 {
            info!("Swept {} stale file(s) from {:?}", removed, self.output_dir);
        }
        removed
    }

    fn sweep_into<F>(&self, max_age: Duration, removed: &mut usize, mut remove: F) -> io::Result<()>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let now = SystemTime::now();
        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let age = now
                .duration_since(metadata.modified()?)
                .unwrap_or_default();
            if age > max_age {
                remove(&entry.path())?;
                *removed += 1;
            }
        }
        Ok(())
    }

    /// Best-effort removal of the raw download and the separation folder.
    /// Each deletion is attempted on its own.
    pub fn remove_intermediates(&self, paths: &JobPaths) {
        remove_best_effort(&paths.raw_audio, |p| fs::remove_file(p));
        remove_best_effort(&paths.separation_folder, |p| fs::remove_dir_all(p));
    }
}

fn remove_best_effort<F>(path: &Path, remove: F)
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    match remove(path) {
        Ok(()) => info!("Deleted {:?}", path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("Failed deleting {:?}: {}", path, err),
    }
}
