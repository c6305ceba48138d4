//! Analytics API Handlers

use axum::{
    Extension,
    extract::{Path, Query, State},
};
use chrono::DateTime;
use shared::models::{
    CancellationFilter, CancellationLog, CancellationReport, DateRangeQuery, PeriodAnalytics,
    TodayAnalytics, WaitressPerformance,
};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::time::{resolve_range, today as business_today};
use crate::utils::{AppError, ok, ok_with_message};

/// GET /api/analytics/today
pub async fn today(State(state): State<ServerState>) -> ApiResult<TodayAnalytics> {
    let date = business_today(state.config.timezone);
    Ok(ok(state.reports.today(date)?))
}

/// GET /api/analytics/period?start_date=&end_date= (两者必填)
pub async fn period(
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<PeriodAnalytics> {
    let (Some(start), Some(end)) = (range.start_date.as_deref(), range.end_date.as_deref()) else {
        return Err(AppError::validation("start_date and end_date are required"));
    };
    let (start, end) = resolve_range(Some(start), Some(end), state.config.timezone)?;
    Ok(ok(state.reports.period(start, end)?))
}

/// GET /api/analytics/waitress/:id?start_date=&end_date=
///
/// 不带日期区间时统计全部历史。
pub async fn waitress(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<WaitressPerformance> {
    let tz = state.config.timezone;
    let (start, end) = match (range.start_date.as_deref(), range.end_date.as_deref()) {
        (Some(start), Some(end)) => resolve_range(Some(start), Some(end), tz)?,
        _ => (DateTime::UNIX_EPOCH.date_naive(), business_today(tz)),
    };
    Ok(ok(state.reports.waitress_performance(&id, start, end)?))
}

/// GET /api/analytics/cancellations?requires_review=&start_date=&end_date=
pub async fn cancellations(
    State(state): State<ServerState>,
    Query(filter): Query<CancellationFilter>,
) -> ApiResult<CancellationReport> {
    Ok(ok(state.reports.cancellations(&filter)?))
}

/// POST /api/analytics/cancellations/:id/review
pub async fn review_cancellation(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<CancellationLog> {
    let log = state.reports.review_cancellation(&id, &current_user.id)?;
    Ok(ok_with_message(log, "Cancellation marked as reviewed"))
}
