use crate::calls;
use crate::db_types::{Call, NewCall};
use crate::error::AppError;
use crate::types::{AppState, CallStats};

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Query string shared by the list and stats routes.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i32,
}

pub async fn create_call(
    State(app_state): State<Arc<AppState>>,
    Json(new_call): Json<NewCall>,
) -> Result<Json<Call>, AppError> {
    debug!(user_id = new_call.user_id, "storing call record");
    let call = calls::create_call(&app_state.db_pool, new_call).await?;

    Ok(Json(call))
}

pub async fn get_calls(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Call>>, AppError> {
    let calls = calls::list_calls(&app_state.db_pool, query.user_id).await?;

    Ok(Json(calls))
}

pub async fn get_call_stats(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<CallStats>, AppError> {
    let stats = calls::call_stats(&app_state.db_pool, query.user_id).await?;

    Ok(Json(stats))
}
