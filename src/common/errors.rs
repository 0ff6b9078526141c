use log::error;

/// Logs the full context chain of `error` and hands it back to the caller.
pub fn handle_error(error: anyhow::Error) -> anyhow::Error {
    error!("{:?}", error);
    error
}
