use thiserror::Error;

/// Errors returned by [`crate::RevalidateClient`].
#[derive(Debug, Error)]
pub enum RevalidateError {
    /// No shared secret is configured; the forwarder refuses to run.
    #[error("revalidation secret is not configured (set STOREFRONT_REVALIDATE_SECRET)")]
    MissingSecret,

    #[error("invalid revalidation base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook rejected the shared secret.
    #[error("revalidation webhook rejected the shared secret")]
    Unauthorized,

    #[error("unexpected HTTP status {status} from revalidation webhook: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("JSON deserialization error for revalidation receipt: {0}")]
    Deserialize(#[source] serde_json::Error),
}
