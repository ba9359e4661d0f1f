//! Member API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::models::{MemberCreate, MemberUpdate};

use crate::api::convert::{MemberView, member_views};
use crate::auth::AdminSession;
use crate::core::ServerState;
use crate::directory::sort_for_display;
use crate::utils::{AppResult, blocking, ok};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DirectorySummary {
    pub parish_name: String,
    pub total_members: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: i64,
    /// Orphaned photo removed from the photo store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_photo: Option<String>,
}

/// GET /api/directory - 名录摘要
pub async fn summary(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<DirectorySummary>>> {
    let store = state.store.clone();
    let total_members = blocking(move || Ok(store.count()?)).await?;

    Ok(ok(DirectorySummary {
        parish_name: state.config.parish_name.clone(),
        total_members,
    }))
}

/// GET /api/members?q=xxx - 列出或搜索成员 (按姓名排序)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<MemberView>>>> {
    let q = query.q.unwrap_or_default();
    let minimum_length = state.config.search_min_length;
    let views = blocking(move || {
        let mut members = state.store.search(&q, minimum_length)?;
        sort_for_display(&mut members);
        Ok(member_views(members, state.photos.as_ref()))
    })
    .await?;

    Ok(ok(views))
}

/// GET /api/members/{id} - 获取单个成员
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let view = blocking(move || {
        let member = state.store.get(id)?;
        Ok(MemberView::resolve(member, state.photos.as_ref()))
    })
    .await?;

    Ok(ok(view))
}

/// POST /api/members - 创建成员
pub async fn create(
    State(state): State<ServerState>,
    Extension(session): Extension<AdminSession>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let view = blocking(move || {
        let member = state.store.add(payload)?;
        Ok(MemberView::resolve(member, state.photos.as_ref()))
    })
    .await?;

    tracing::info!(
        member_id = view.member.id,
        operator = %session.subject,
        "Member created via API"
    );
    Ok(ok(view))
}

/// PUT /api/members/{id} - 更新成员
pub async fn update(
    State(state): State<ServerState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let view = blocking(move || {
        let member = state.store.update(id, payload)?;
        Ok(MemberView::resolve(member, state.photos.as_ref()))
    })
    .await?;

    tracing::info!(member_id = id, operator = %session.subject, "Member updated via API");
    Ok(ok(view))
}

/// DELETE /api/members/{id} - 删除成员并回收孤立照片
pub async fn delete(
    State(state): State<ServerState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DeleteResponse>>> {
    let removed_photo = blocking(move || {
        let deleted = state.store.delete(id)?;
        let Some(reference) = deleted.orphaned_photo else {
            return Ok(None);
        };
        // The member is already gone; a leftover file is only wasted space
        match state.photos.delete(&reference) {
            Ok(()) => Ok(Some(reference)),
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Failed to reclaim photo");
                Ok(None)
            }
        }
    })
    .await?;

    tracing::info!(member_id = id, operator = %session.subject, "Member deleted via API");
    Ok(ok(DeleteResponse { id, removed_photo }))
}
