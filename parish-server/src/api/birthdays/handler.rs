use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::models::BIRTHDAY_ISO_FORMAT;

use crate::api::convert::MemberView;
use crate::birthdays;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, blocking, ok};

#[derive(Debug, Deserialize)]
pub struct BirthdayQuery {
    /// Overrides the configured horizon
    pub days: Option<u32>,
    /// `YYYY-MM-DD`, defaults to the server's local date
    pub today: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BirthdayEntry {
    pub days_until: i64,
    pub date: NaiveDate,
    pub turning: i32,
    pub member: MemberView,
}

#[derive(Debug, Serialize)]
pub struct BirthdaysResponse {
    pub today: NaiveDate,
    pub horizon_days: u32,
    pub entries: Vec<BirthdayEntry>,
}

/// GET /api/birthdays
pub async fn upcoming(
    State(state): State<ServerState>,
    Query(query): Query<BirthdayQuery>,
) -> AppResult<Json<ApiResponse<BirthdaysResponse>>> {
    let today = match query.today.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), BIRTHDAY_ISO_FORMAT)
            .map_err(|_| AppError::invalid(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))?,
        None => Local::now().date_naive(),
    };
    let horizon_days = query.days.unwrap_or(state.config.birthday_horizon_days);

    let entries = blocking(move || {
        let members = state.store.load()?;
        let entries: Vec<BirthdayEntry> = birthdays::upcoming(&members, today, horizon_days)
            .into_iter()
            .map(|b| BirthdayEntry {
                days_until: b.days_until,
                date: b.date,
                turning: b.turning,
                member: MemberView::resolve(b.member.clone(), state.photos.as_ref()),
            })
            .collect();
        Ok(entries)
    })
    .await?;

    Ok(ok(BirthdaysResponse {
        today,
        horizon_days,
        entries,
    }))
}
