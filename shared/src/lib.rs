// shared/src/lib.rs

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The backing store could not be opened or reached. Fatal at startup.
    #[error("cache store unavailable: {0}")]
    StoreUnavailable(String),
    /// I/O fault on an individual store operation.
    #[error("storage fault: {0}")]
    Storage(String),
    #[error("upstream rate limited")]
    RateLimited,
    /// Credential invalid or expired. Never retried.
    #[error("upstream authentication failed: {0}")]
    AuthFailed(String),
    #[error("not found")]
    NotFound,
    /// Network-level or 5xx failure, safe to retry.
    #[error("transient upstream failure: {0}")]
    Transient(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TtlSeconds(pub u64);

impl TtlSeconds {
    pub fn as_secs(self) -> u64 {
        self.0
    }
}

pub mod config;
