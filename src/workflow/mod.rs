//! Workflow module - the single-job vocal extraction pipeline
//!
//! Structure:
//! - `state`: Shared progress/status record and the single job slot
//! - `store`: Output directory layout, artifact lookup, stale sweep
//! - `tools`: External tool adapters (yt-dlp, spleeter, ffmpeg)
//! - `pipeline`: Stage orchestration for one job

pub mod pipeline;
pub mod state;
pub mod store;
pub mod tools;
