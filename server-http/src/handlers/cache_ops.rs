use crate::error::ApiError;
use crate::models::{CacheResponse, DeleteResponse};
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use pulse::domain::ResourceDescriptor;
use shared::Error;
use std::collections::BTreeMap;
use tracing::info;

/// GET /api/cache/{*resource}
pub async fn get_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<CacheResponse>, ApiError> {
    validation::validate_resource_path(&resource)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    info!("GET: resource={}", resource);

    let descriptor = ResourceDescriptor::from_parts(resource, params);
    let result = state.service.fetch(&descriptor).await?;

    let data = serde_json::from_str(&result.body)
        .map_err(|e| Error::Internal(format!("cached body is not valid JSON: {}", e)))?;

    Ok(Json(CacheResponse {
        stale: result.is_stale(),
        data,
    }))
}

/// DELETE /api/cache/{*resource}
pub async fn invalidate_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<DeleteResponse>, ApiError> {
    validation::validate_resource_path(&resource)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    info!("DELETE: resource={}", resource);

    let descriptor = ResourceDescriptor::from_parts(resource, params);
    let deleted = state.service.invalidate(&descriptor).await?;

    Ok(Json(DeleteResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use pulse::persistence::SledStore;
    use pulse::ports::Upstream;
    use pulse::service::{CacheService, FetchPolicy};
    use shared::Result as ServiceResult;
    use std::sync::Arc;

    struct StaticUpstream {
        response: ServiceResult<String>,
    }

    #[async_trait]
    impl Upstream for StaticUpstream {
        async fn fetch(&self, _resource: &ResourceDescriptor) -> ServiceResult<String> {
            match &self.response {
                Ok(body) => Ok(body.clone()),
                Err(Error::NotFound) => Err(Error::NotFound),
                Err(Error::RateLimited) => Err(Error::RateLimited),
                Err(e) => Err(Error::Internal(e.to_string())),
            }
        }
    }

    fn state_with(dir: &tempfile::TempDir, response: ServiceResult<String>) -> AppState {
        let store = Arc::new(SledStore::open(dir.path().join("cache.sled")).unwrap());
        let upstream = Arc::new(StaticUpstream { response });
        AppState::new(CacheService::new(store, upstream, FetchPolicy::default()))
    }

    #[tokio::test]
    async fn get_returns_fresh_body() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&dir, Ok(r#"{"tasks":[]}"#.into()));

        let Json(response) = get_resource(
            State(state),
            Path("projects/123/tasks".into()),
            Query(BTreeMap::new()),
        )
        .await
        .unwrap();

        assert!(!response.stale);
        assert_eq!(response.data, serde_json::json!({"tasks": []}));
    }

    #[tokio::test]
    async fn missing_resource_maps_to_not_found_kind() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&dir, Err(Error::NotFound));

        let err = get_resource(
            State(state),
            Path("projects/404/tasks".into()),
            Query(BTreeMap::new()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_and_kind(), (StatusCode::NOT_FOUND, "not_found"));
    }

    #[tokio::test]
    async fn traversal_path_is_rejected_before_the_service() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&dir, Ok("{}".into()));

        let err = get_resource(
            State(state),
            Path("projects/../secrets".into()),
            Query(BTreeMap::new()),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.status_and_kind(),
            (StatusCode::BAD_REQUEST, "bad_request")
        );
    }

    #[tokio::test]
    async fn invalidate_reports_whether_an_entry_existed() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&dir, Ok("{}".into()));

        get_resource(
            State(state.clone()),
            Path("projects/1/tasks".into()),
            Query(BTreeMap::new()),
        )
        .await
        .unwrap();

        let Json(first) = invalidate_resource(
            State(state.clone()),
            Path("projects/1/tasks".into()),
            Query(BTreeMap::new()),
        )
        .await
        .unwrap();
        assert!(first.deleted);

        let Json(second) = invalidate_resource(
            State(state),
            Path("projects/1/tasks".into()),
            Query(BTreeMap::new()),
        )
        .await
        .unwrap();
        assert!(!second.deleted);
    }
}
