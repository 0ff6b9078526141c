use anyhow::Result;

use vocalis::bootstrap::{initialize, setup::initialize_logger};
use vocalis::build_rocket;
use vocalis::common::errors::handle_error;
use vocalis::config::AppConfig;
use vocalis::workflow::tools::Toolchain;

#[rocket::main]
async fn main() -> Result<()> {
    initialize_logger();

    let config = AppConfig::from_env().map_err(handle_error)?;
    let store = initialize(&config).map_err(handle_error)?;
    let tools = Toolchain::from_config(&config);

    if let Err(e) = build_rocket(config, store, tools).launch().await {
        return Err(handle_error(anyhow::Error::from(e).context("Rocket server failed")));
    }
    Ok(())
}
