//! HTTP client for the inspection backend.
//!
//! One async method per endpoint; each request is sent at most once with no
//! retries and no caching. Failures are classified into [`ClientError`].

mod client;
mod endpoint;
mod error;

pub use client::BackendClient;
pub use client::DEFAULT_BASE_URL;
pub use client::Token;
pub use endpoint::Endpoint;
pub use error::ClientError;
pub use error::ClientResult;
