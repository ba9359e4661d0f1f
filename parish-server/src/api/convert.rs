//! 类型转换模块
//!
//! 将名录模型 (shared::models::Member) 转换为带照片状态的 API 响应模型

use serde::Serialize;
use shared::models::Member;

use crate::photos::PhotoStore;

/// Member as served over HTTP
///
/// A `photo` whose file is gone is reported as `photo_available: false`
/// and gets no URL.
#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    #[serde(flatten)]
    pub member: Member,
    pub photo_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl MemberView {
    pub fn resolve(member: Member, photos: &dyn PhotoStore) -> Self {
        let photo_url = member
            .photo
            .as_deref()
            .filter(|reference| photos.exists(reference))
            .map(photo_url);
        Self {
            photo_available: photo_url.is_some(),
            photo_url,
            member,
        }
    }
}

pub fn photo_url(reference: &str) -> String {
    format!("/api/photos/{}", reference)
}

pub fn member_views(members: Vec<Member>, photos: &dyn PhotoStore) -> Vec<MemberView> {
    members
        .into_iter()
        .map(|m| MemberView::resolve(m, photos))
        .collect()
}
