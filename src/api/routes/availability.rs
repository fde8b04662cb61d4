//! Availability Routes
//!
//! - GET /api/v1/availability - List entities
//! - POST /api/v1/availability - Create an entity
//! - GET /api/v1/availability/:id - Entity storage summary
//! - DELETE /api/v1/availability/:id - Remove an entity
//! - PUT /api/v1/availability/:id/range - Mark a range available or not
//! - GET /api/v1/availability/:id/range - Query a range at any resolution
//! - PUT /api/v1/availability/:id/at - Mark a single unit
//! - GET /api/v1/availability/:id/at - Read a single unit

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::api::dto::{
    AtQuery, AtResponse, AvailabilityInfo, AvailabilityListResponse, CreateAvailabilityRequest,
    DeleteResponse, RangeQuery, RangeResponse, SetAtRequest, SetRangeRequest, WriteResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::{ReducePolicy, Resolution};
use crate::store::SharedAvailability;

/// GET /api/v1/availability
pub async fn list_availabilities(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AvailabilityListResponse>> {
    let mut availabilities = Vec::new();
    for id in state.store.ids().await {
        // Entries removed concurrently are skipped
        if let Some(shared) = state.store.find(&id).await {
            availabilities.push(info(id, &shared).await);
        }
    }

    Ok(Json(AvailabilityListResponse {
        total: availabilities.len(),
        availabilities,
    }))
}

/// POST /api/v1/availability
///
/// Create an empty entity. Fails with 409 if the id is taken.
pub async fn create_availability(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAvailabilityRequest>,
) -> ApiResult<(StatusCode, Json<AvailabilityInfo>)> {
    if req.id.trim().is_empty() {
        return Err(ApiError::Validation("id cannot be empty".to_string()));
    }

    let resolution = match &req.resolution {
        Some(label) => parse_resolution(label)?,
        None => state.default_resolution(),
    };

    let shared = state.store.create(&req.id, resolution).await?;

    Ok((StatusCode::CREATED, Json(info(req.id, &shared).await)))
}

/// GET /api/v1/availability/:id
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<AvailabilityInfo>> {
    let shared = lookup(&state, &id).await?;
    Ok(Json(info(id, &shared).await))
}

/// DELETE /api/v1/availability/:id
pub async fn delete_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.store.remove(&id).await {
        return Err(not_found(&id));
    }

    Ok(Json(DeleteResponse {
        status: "deleted".to_string(),
        id,
    }))
}

/// PUT /api/v1/availability/:id/range
///
/// Writes are aligned to the storage unit grid: `[floor(from), floor(to))`.
/// Windows larger than `[api] max_units` are rejected before the write lock is taken.
pub async fn set_range(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetRangeRequest>,
) -> ApiResult<Json<WriteResponse>> {
    if req.to < req.from {
        return Err(ApiError::Validation(
            "'to' must not be before 'from'".to_string(),
        ));
    }

    let existing = state.store.find(&id).await;
    let storage = match &existing {
        Some(shared) => shared.read().await.resolution(),
        None => state.default_resolution(),
    };
    check_window(&state, req.from, req.to, storage, storage)?;

    let shared = writable(&state, &id).await?;
    let mut av = shared.write().await;
    av.set(req.from, req.to, req.available);

    tracing::debug!(
        id = %id,
        from = %req.from,
        to = %req.to,
        available = req.available,
        "Set availability range"
    );

    Ok(Json(WriteResponse {
        status: "ok".to_string(),
        resolution: av.resolution().label(),
        id,
    }))
}

/// GET /api/v1/availability/:id/range
///
/// Reports at the storage resolution unless `resolution` is given.
/// `policy` selects how coarser reports reduce storage units.
pub async fn get_range(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<RangeResponse>> {
    let policy = match &query.policy {
        Some(p) => p.parse::<ReducePolicy>().map_err(ApiError::Validation)?,
        None => ReducePolicy::default(),
    };

    let shared = lookup(&state, &id).await?;
    let storage = shared.read().await.resolution();

    let resolution = match &query.resolution {
        Some(label) => parse_resolution(label)?,
        None => storage,
    };
    check_window(&state, query.from, query.to, resolution, storage)?;

    let av = shared.read().await;
    let result = av.get_with_policy(query.from, query.to, resolution, policy)?;
    Ok(Json(RangeResponse::from(result)))
}

/// PUT /api/v1/availability/:id/at
pub async fn set_at(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetAtRequest>,
) -> ApiResult<Json<WriteResponse>> {
    let shared = writable(&state, &id).await?;
    let mut av = shared.write().await;
    av.set_at(req.at, req.available);

    Ok(Json(WriteResponse {
        status: "ok".to_string(),
        resolution: av.resolution().label(),
        id,
    }))
}

/// GET /api/v1/availability/:id/at
pub async fn get_at(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<AtQuery>,
) -> ApiResult<Json<AtResponse>> {
    let shared = lookup(&state, &id).await?;
    let av = shared.read().await;

    Ok(Json(AtResponse {
        available: av.get_at(query.at),
        resolution: av.resolution().label(),
        at: query.at,
        id,
    }))
}

// ============================================
// HELPERS
// ============================================

fn parse_resolution(label: &str) -> ApiResult<Resolution> {
    let resolution = Resolution::parse(label);
    if resolution.is_defined() {
        Ok(resolution)
    } else {
        Err(ApiError::Validation(format!(
            "Unknown resolution '{}'. Valid: sec, min, 5min, 15min, hour, day or <n>s",
            label
        )))
    }
}

/// Reject windows covering more than `max_units` units of the finer resolution.
/// Bounds are rounded outward to the coarser resolution, which is the most a
/// query can touch.
fn check_window(
    state: &AppState,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    requested: Resolution,
    storage: Resolution,
) -> ApiResult<()> {
    let (from, to) = (from.timestamp(), to.timestamp());
    let coarse = requested.secs().max(storage.secs());
    let fine = requested.secs().min(storage.secs());
    if to <= from || fine <= 0 {
        return Ok(());
    }

    let span = to.div_euclid(coarse) - from.div_euclid(coarse) + 1;
    let units = span.saturating_mul(coarse / fine).max(0) as u64;
    if units > state.config.max_units {
        return Err(ApiError::Validation(format!(
            "Window covers {} units, limit is {}",
            units, state.config.max_units
        )));
    }
    Ok(())
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Availability '{}' not found", id))
}

async fn lookup(state: &AppState, id: &str) -> ApiResult<SharedAvailability> {
    state.store.find(id).await.ok_or_else(|| not_found(id))
}

/// Existing entity, or a new one at the default resolution when auto-create is on
async fn writable(state: &AppState, id: &str) -> ApiResult<SharedAvailability> {
    if state.store_config.auto_create {
        Ok(state
            .store
            .find_or_create(id, state.default_resolution())
            .await?)
    } else {
        lookup(state, id).await
    }
}

async fn info(id: String, shared: &SharedAvailability) -> AvailabilityInfo {
    let av = shared.read().await;
    AvailabilityInfo {
        id,
        resolution: av.resolution().label(),
        segments: av.segment_count(),
        size_bytes: av.size_in_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, StoreConfig};
    use crate::store::MemoryCollection;
    use chrono::{Duration, TimeZone};

    fn state_with_limit(max_units: u64) -> AppState {
        let config = ApiConfig {
            max_units,
            ..ApiConfig::default()
        };
        AppState::new(
            Arc::new(MemoryCollection::new()),
            config,
            StoreConfig::default(),
        )
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("15m").unwrap(), Resolution::MINUTE_15);
        assert_eq!(parse_resolution("90s").unwrap(), Resolution::from_secs(90));
        assert!(matches!(
            parse_resolution("weekly"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_check_window() {
        let state = state_with_limit(288);
        let t = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        let day = t + Duration::days(1);
        let m5 = Resolution::MINUTE_5;

        // Bounds round outward, so a whole day covers 289 storage units
        assert!(check_window(&state, t, day - Duration::minutes(5), m5, m5).is_ok());
        assert!(matches!(
            check_window(&state, t, day, m5, m5),
            Err(ApiError::Validation(_))
        ));

        // Finer requests count units at the requested resolution
        assert!(check_window(&state, t, t + Duration::hours(1), Resolution::SECOND, m5).is_err());
        let last_second = day - Duration::seconds(1);
        assert!(check_window(&state, t, last_second, Resolution::DAY, m5).is_ok());
        assert!(check_window(&state, t, day, Resolution::DAY, m5).is_err());

        // Inverted windows and extreme bounds never overflow
        assert!(check_window(&state, day, t, m5, m5).is_ok());
        let sec = Resolution::SECOND;
        assert!(check_window(&state, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC, sec, sec).is_err());
    }
}
