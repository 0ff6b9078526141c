use anyhow::{Context, anyhow};
use log::warn;
use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post};
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;

use crate::api::{AppError, AppResult};
use crate::common::errors::handle_error;
use crate::config::AppConfig;
use crate::workflow::pipeline::Pipeline;
use crate::workflow::state::{JobState, JobStatus};

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub download_url: String,
}

#[get("/status")]
pub fn status(job_state: &State<JobState>) -> Json<JobStatus> {
    Json(job_state.snapshot())
}

/// Runs the whole pipeline for one URL; the caller waits for the result.
#[post("/process", data = "<json_data>")]
pub async fn process(
    pipeline: &State<Pipeline>,
    config: &State<AppConfig>,
    json_data: Json<ProcessRequest>,
) -> AppResult<Json<ProcessResponse>> {
    let url = json_data.into_inner().url;
    let Some(guard) = pipeline.state().try_begin() else {
        warn!("Rejected {}: another job is still running", url);
        return Err(AppError::new(
            Status::Conflict,
            anyhow!("A job is already running"),
        ));
    };

    let pipeline = pipeline.inner().clone();
    let artifact = spawn_blocking(move || {
        // slot stays claimed until the run itself is over
        let _guard = guard;
        pipeline.run(&url)
    })
    .await
    .context("pipeline worker panicked")?
    .map_err(|err| handle_error(anyhow::Error::new(err)))?;

    Ok(Json(ProcessResponse {
        status: "success",
        download_url: config.download_url(&artifact),
    }))
}
