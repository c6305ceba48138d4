//! Payment API Handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{DailyPayments, PaymentReceipt, ProcessPaymentRequest};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::time::{parse_date, today};
use crate::utils::validation::validate;
use crate::utils::{ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

/// POST /api/payments
///
/// 已完成订单重复提交时返回原收款记录。
pub async fn process(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ProcessPaymentRequest>,
) -> ApiResult<PaymentReceipt> {
    validate(&payload)?;
    let receipt = state.orders.process_payment(&current_user, payload)?;
    Ok(ok_with_message(receipt, "Payment processed successfully"))
}

/// GET /api/payments/daily?date=
pub async fn daily(
    State(state): State<ServerState>,
    Query(query): Query<DailyQuery>,
) -> ApiResult<DailyPayments> {
    let date = match query.date.as_deref() {
        Some(date) => parse_date(date)?,
        None => today(state.config.timezone),
    };
    Ok(ok(state.reports.daily_payments(date)?))
}
