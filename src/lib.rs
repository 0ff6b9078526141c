#[macro_use]
extern crate rocket;

pub mod api;
pub mod bootstrap;
pub mod common;
pub mod config;
pub mod workflow;

use rocket::{Build, Rocket};

use api::fairings::cors::cors_fairing;
use api::fairings::generate_fairing_routes;
use api::handlers::{generate_download_routes, generate_pipeline_routes};
use bootstrap::sweeper_fairing;
use config::AppConfig;
use workflow::pipeline::Pipeline;
use workflow::state::JobState;
use workflow::store::FileStore;
use workflow::tools::Toolchain;

/// Assembles the service around one shared job state.
pub fn build_rocket(config: AppConfig, store: FileStore, tools: Toolchain) -> Rocket<Build> {
    let job_state = JobState::new();
    let pipeline = Pipeline::new(store.clone(), job_state.clone(), tools);
    let sweeper = sweeper_fairing(store.clone(), config.retention(), config.sweep_interval());

    rocket::custom(rocket::Config::figment())
        .attach(cors_fairing())
        .attach(sweeper)
        .manage(config)
        .manage(store)
        .manage(job_state)
        .manage(pipeline)
        .mount("/", generate_pipeline_routes())
        .mount("/", generate_download_routes())
        .mount("/", generate_fairing_routes())
}
