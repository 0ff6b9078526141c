use anyhow::Context;
use rocket::State;
use rocket::fs::NamedFile;
use rocket::get;
use rocket::http::{ContentType, Status};

use crate::api::{AppError, AppResult};
use crate::workflow::store::FileStore;

#[get("/download/<filename>")]
pub async fn download(
    store: &State<FileStore>,
    filename: &str,
) -> AppResult<(ContentType, NamedFile)> {
    let path = store
        .resolve_artifact(filename)
        .map_err(|err| AppError::new(Status::NotFound, err))?;

    let file = NamedFile::open(&path)
        .await
        .context(format!("Failed to open artifact: {}", path.display()))?;

    Ok((ContentType::new("audio", "mpeg"), file))
}
