use thiserror::Error;

/// Failures surfaced by the client services. A search that completes with
/// zero matches is not an error; only transport and endpoint failures are.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),
}
