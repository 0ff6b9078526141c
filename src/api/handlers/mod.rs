use rocket::Route;

pub mod download;
pub mod pipeline;

pub fn generate_pipeline_routes() -> Vec<Route> {
    routes![pipeline::status, pipeline::process]
}

pub fn generate_download_routes() -> Vec<Route> {
    routes![download::download]
}
