//! Single-job pipeline: fetch → separate → encode.
//!
//! Each stage publishes its progress to [`JobState`] on entry. A failing
//! stage records a terminal `Error: ...` status and ends the run; nothing is
//! retried. Intermediates are removed only after a successful encode, so a
//! failed run leaves its files for inspection until the stale sweep.

use log::{debug, info, warn};
use std::{path::PathBuf, time::Instant};
use thiserror::Error;
use uuid::Uuid;

use crate::common::JOB_ID_LEN;
use crate::workflow::{
    state::{JobState, Stage},
    store::{FileStore, JobPaths},
    tools::{ToolError, ToolOutput, Toolchain},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Download failed")]
    DownloadFailed(#[source] ToolError),
    #[error("AI Processing Failed.")]
    SeparationFailed(#[source] ToolError),
    #[error("Vocals file missing.")]
    MissingComponent { expected: PathBuf },
    #[error("Encoding failed.")]
    EncodeFailed(#[source] ToolError),
}

const STATUS_DOWNLOAD_FAILED: &str = "Error: Download Failed";
const STATUS_SEPARATION_FAILED: &str = "Error: AI Failed";
const STATUS_COMPONENT_MISSING: &str = "Error: File Missing";
const STATUS_ENCODE_FAILED: &str = "Error: Encode Failed";

#[derive(Clone)]
pub struct Pipeline {
    store: FileStore,
    state: JobState,
    tools: Toolchain,
}

impl Pipeline {
    pub fn new(store: FileStore, state: JobState, tools: Toolchain) -> Self {
        Self {
            store,
            state,
            tools,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Runs one job to completion and returns the artifact's file name.
    ///
    /// Blocking: every stage waits on an external process.
    pub fn run(&self, source_url: &str) -> Result<String, PipelineError> {
        self.state.enter(Stage::Starting);
        let paths = self.store.job_paths(&generate_job_id());
        let start_time = Instant::now();
        info!("AI request for {} (job {})", source_url, paths.id);

        let result = self.execute(source_url, &paths);
        match &result {
            Ok(artifact) => {
                info!(duration = &*format!("{:?}", start_time.elapsed()); "Job {} produced {}", paths.id, artifact)
            }
            Err(err) => warn!(
                "Job {} failed: {}; intermediates kept at {:?} and {:?}",
                paths.id, err, paths.raw_audio, paths.separation_folder
            ),
        }
        result
    }

    fn execute(&self, source_url: &str, paths: &JobPaths) -> Result<String, PipelineError> {
        self.state.enter(Stage::Downloading);
        info!("[1/3] Downloading...");
        let fetched = self.tools.fetcher.fetch(source_url, &paths.raw_audio);
        self.check(fetched, STATUS_DOWNLOAD_FAILED, PipelineError::DownloadFailed)?;

        self.state.enter(Stage::Separating);
        info!("[2/3] Running AI separation...");
        let separated = self
            .tools
            .separator
            .separate(&paths.raw_audio, self.store.output_dir());
        self.check(
            separated,
            STATUS_SEPARATION_FAILED,
            PipelineError::SeparationFailed,
        )?;

        self.state.enter(Stage::Encoding);
        info!("[3/3] Optimizing...");
        if !paths.component.is_file() {
            // progress stays where the encoding stage put it
            self.state.set_status(STATUS_COMPONENT_MISSING);
            return Err(PipelineError::MissingComponent {
                expected: paths.component.clone(),
            });
        }
        let encoded = self.tools.encoder.encode(&paths.component, &paths.artifact);
        self.check(encoded, STATUS_ENCODE_FAILED, PipelineError::EncodeFailed)?;

        self.store.remove_intermediates(paths);

        self.state.enter(Stage::Done);
        Ok(paths.artifact_name())
    }

    /// Records a stage failure into the job state and classifies it.
    fn check<F>(
        &self,
        result: Result<ToolOutput, ToolError>,
        failed_status: &str,
        classify: F,
    ) -> Result<(), PipelineError>
    where
        F: FnOnce(ToolError) -> PipelineError,
    {
        match result {
            Ok(output) => {
                if !output.stderr.is_empty() {
                    debug!("{}", output.stderr.trim_end());
                }
                Ok(())
            }
            Err(err) => {
                self.state.set(0, failed_status);
                Err(classify(err))
            }
        }
    }
}

/// Short opaque token taken from a v4 UUID.
pub fn generate_job_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(JOB_ID_LEN);
    id
}
