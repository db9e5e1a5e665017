//! Admin handlers for monitoring and operations.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// Admin stats response.
#[derive(Serialize)]
pub struct AdminStatsResponse {
    pub video_count: u64,
    pub frame_count: u64,
    pub database: DatabaseStats,
}

/// Document store stats as reported by the server.
#[derive(Serialize)]
pub struct DatabaseStats {
    pub name: String,
    pub doc_count: u64,
    pub deleted_doc_count: u64,
}

/// Library-wide counts and document store info (admin only).
pub async fn admin_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<AdminStatsResponse>> {
    user.require_admin()?;

    let video_count = state.videos.count().await?;
    let frame_count = state.frames.count().await?;
    let info = state.docstore.database_info().await?;

    Ok(Json(AdminStatsResponse {
        video_count,
        frame_count,
        database: DatabaseStats {
            name: info.db_name,
            doc_count: info.doc_count,
            deleted_doc_count: info.doc_del_count,
        },
    }))
}
