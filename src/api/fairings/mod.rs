pub mod cors;

use rocket::Route;

pub fn generate_fairing_routes() -> Vec<Route> {
    routes![cors::preflight]
}
