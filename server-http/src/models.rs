use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Successful cache lookup. `stale` is set when the body is a degraded
/// fallback served past its TTL, so the browser client can show a banner
/// instead of treating it like fresh data.
#[derive(Debug, Serialize)]
pub struct CacheResponse {
    pub stale: bool,
    pub data: serde_json::Value,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

// Error envelope
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}
