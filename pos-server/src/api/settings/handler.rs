//! Settings API Handlers

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use shared::message::{EventName, Notice};
use shared::models::{
    AppearanceUpdate, ClearDisplayRequest, MenuItem, OrderManagementUpdate, PinConfirmation,
    PrepStation, RESET_ANALYTICS_CONFIRMATION, ResetAnalyticsRequest, RestaurantSettings,
    TakeawayPricing, TakeawayPricingUpdate,
};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::message::emit;
use crate::security_log;
use crate::utils::validation::validate;
use crate::utils::{AppError, ErrorCode, ok, ok_with_message};

#[derive(Debug, Serialize)]
pub struct TakeawayPricingResult {
    pub settings: RestaurantSettings,
    /// Menu items repriced (only when `apply_to_existing`)
    pub updated_items: usize,
}

#[derive(Debug, Serialize)]
pub struct ResetAnalyticsResult {
    pub deleted_records: u64,
}

#[derive(Debug, Serialize)]
pub struct ClearDisplayResult {
    pub station: PrepStation,
    pub cleared_orders: usize,
}

/// 店主重新输入 PIN 确认破坏性操作
fn confirm_pin(state: &ServerState, user: &CurrentUser, pin: &str, action: &str) -> Result<(), AppError> {
    let record = state
        .staff
        .find_by_id(&user.id)?
        .ok_or_else(|| AppError::invalid_token("Account no longer exists"))?;
    if !record.verify_pin(pin) {
        security_log!(
            "WARN",
            "pin_confirmation_failed",
            user_id = user.id.clone(),
            action = action.to_string()
        );
        return Err(AppError::new(ErrorCode::PinMismatch));
    }
    Ok(())
}

fn settings_updated(state: &ServerState, settings: &RestaurantSettings) {
    emit::to_all(&state.bus, EventName::SettingsUpdated, settings);
}

/// GET /api/settings
pub async fn get(State(state): State<ServerState>) -> ApiResult<RestaurantSettings> {
    Ok(ok(state.settings.get_or_create()?))
}

/// PUT /api/settings/appearance
pub async fn update_appearance(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<AppearanceUpdate>,
) -> ApiResult<RestaurantSettings> {
    let settings = state.settings.update(&current_user.id, |s| {
        if let Some(language) = payload.language {
            s.language = language;
        }
        if let Some(theme) = payload.theme {
            s.theme = theme;
        }
    })?;

    tracing::info!(language = ?settings.language, theme = ?settings.theme, "Appearance settings updated");
    settings_updated(&state, &settings);
    Ok(ok_with_message(settings, "Appearance settings updated"))
}

/// PUT /api/settings/order-management - 宽限期 1..=5 分钟
pub async fn update_order_management(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<OrderManagementUpdate>,
) -> ApiResult<RestaurantSettings> {
    validate(&payload)?;
    let settings = state.settings.update(&current_user.id, |s| {
        s.grace_window_minutes = payload.grace_window_minutes;
    })?;

    tracing::info!(
        grace_window_minutes = settings.grace_window_minutes,
        "Order management settings updated"
    );
    settings_updated(&state, &settings);
    Ok(ok_with_message(settings, "Order management settings updated"))
}

/// PUT /api/settings/takeaway-pricing
pub async fn update_takeaway_pricing(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<TakeawayPricingUpdate>,
) -> ApiResult<TakeawayPricingResult> {
    validate(&payload)?;
    let settings = state.settings.update(&current_user.id, |s| {
        s.takeaway_pricing = TakeawayPricing {
            policy: payload.policy,
            discount_percentage: payload
                .discount_percentage
                .unwrap_or(s.takeaway_pricing.discount_percentage),
        };
    })?;

    let updated_items = if payload.apply_to_existing {
        let count = state
            .menu_items
            .apply_takeaway_pricing(&settings.takeaway_pricing)?;
        tracing::info!(count, policy = ?settings.takeaway_pricing.policy, "Takeaway prices applied to menu");
        emit::menu_updated::<MenuItem>(&state.bus, "bulk-price-update", None, None);
        count
    } else {
        0
    };

    settings_updated(&state, &settings);
    Ok(ok_with_message(
        TakeawayPricingResult {
            settings,
            updated_items,
        },
        "Takeaway pricing updated",
    ))
}

/// POST /api/settings/reset-analytics
///
/// 需要输入 "DELETE ALL DATA" 和店主 PIN，删除全部日统计记录。
pub async fn reset_analytics(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ResetAnalyticsRequest>,
) -> ApiResult<ResetAnalyticsResult> {
    if payload.confirmation != RESET_ANALYTICS_CONFIRMATION {
        return Err(AppError::with_message(
            ErrorCode::ConfirmationMismatch,
            format!("Type \"{}\" to confirm", RESET_ANALYTICS_CONFIRMATION),
        ));
    }
    confirm_pin(&state, &current_user, &payload.pin, "reset_analytics")?;

    let deleted_records = state.analytics.delete_all()?;
    tracing::warn!(deleted_records, reset_by = %current_user.id, "Analytics data reset");

    Ok(ok_with_message(
        ResetAnalyticsResult { deleted_records },
        "Analytics data has been reset",
    ))
}

/// POST /api/settings/start-new-day
pub async fn start_new_day(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PinConfirmation>,
) -> ApiResult<()> {
    confirm_pin(&state, &current_user, &payload.pin, "start_new_day")?;

    tracing::info!(started_by = %current_user.id, "New business day started");
    emit::to_all(
        &state.bus,
        EventName::NewDayStarted,
        &Notice {
            message: "A new business day has started".to_string(),
            from: Some(current_user.full_name.clone()),
        },
    );
    Ok(ok_with_message((), "New day started"))
}

/// POST /api/settings/clear-display
///
/// 作废指定出品站上所有未出品完成的订单并清屏。
pub async fn clear_display(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ClearDisplayRequest>,
) -> ApiResult<ClearDisplayResult> {
    if payload.station == PrepStation::None {
        return Err(AppError::validation("Station must be kitchen or juicebar"));
    }
    confirm_pin(&state, &current_user, &payload.pin, "clear_display")?;

    let cleared_orders = state.orders.clear_station(payload.station, &current_user)?;
    Ok(ok_with_message(
        ClearDisplayResult {
            station: payload.station,
            cleared_orders,
        },
        format!("Cleared {} orders from the {} display", cleared_orders, payload.station.as_str()),
    ))
}
