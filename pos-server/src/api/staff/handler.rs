//! Staff API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::message::{AccountNotice, EventName, Room, StaffCreatedNotice};
use shared::models::{
    PinReset, Role, StaffCreate, StaffFilter, StaffProfile, StaffUpdate, StaffWithPerformance,
};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::message::emit;
use crate::utils::validation::validate;
use crate::utils::{AppError, ErrorCode, ok, ok_with_message};

fn staff_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::StaffNotFound, format!("Staff {} not found", id))
}

/// GET /api/staff - 员工列表 (服务员附带业绩)
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<StaffFilter>,
) -> ApiResult<Vec<StaffWithPerformance>> {
    let staff = state.staff.find_all(&filter)?;
    let mut performance = state.reports.staff_performance()?;

    let list = staff
        .into_iter()
        .map(|profile| {
            let performance = (profile.role == Role::Waitress)
                .then(|| performance.remove(&profile.id).unwrap_or_default());
            StaffWithPerformance {
                staff: profile,
                performance,
            }
        })
        .collect();
    Ok(ok(list))
}

/// GET /api/staff/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<StaffWithPerformance> {
    let record = state
        .staff
        .find_by_id(&id)?
        .ok_or_else(|| staff_not_found(&id))?;

    let performance = if record.profile.role == Role::Waitress {
        Some(
            state
                .reports
                .staff_performance()?
                .remove(&id)
                .unwrap_or_default(),
        )
    } else {
        None
    };

    Ok(ok(StaffWithPerformance {
        staff: record.profile,
        performance,
    }))
}

/// POST /api/staff
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<StaffCreate>,
) -> ApiResult<StaffProfile> {
    validate(&payload)?;
    let staff = state.staff.create(payload)?;

    tracing::info!(
        staff_id = %staff.id,
        username = %staff.username,
        role = %staff.role,
        created_by = %current_user.id,
        "Staff account created"
    );

    emit::to_room(
        &state.bus,
        &Room::owner(),
        EventName::StaffCreated,
        &StaffCreatedNotice {
            staff_id: staff.id.clone(),
            full_name: staff.full_name.clone(),
            role: staff.role,
        },
    );

    Ok(ok_with_message(staff, "Staff member created successfully"))
}

/// PUT /api/staff/:id
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<StaffUpdate>,
) -> ApiResult<StaffProfile> {
    validate(&payload)?;
    if id == current_user.id && payload.active == Some(false) {
        return Err(AppError::new(ErrorCode::StaffCannotDeactivateSelf));
    }

    let staff = state.staff.update(&id, payload)?;
    tracing::info!(staff_id = %staff.id, updated_by = %current_user.id, "Staff account updated");

    let (name, message) = if staff.active {
        (EventName::AccountUpdated, "Your account has been updated")
    } else {
        (EventName::AccountDeactivated, "Your account has been deactivated")
    };
    emit::to_room(
        &state.bus,
        &Room::user(&staff.id),
        name,
        &AccountNotice {
            message: message.to_string(),
            active: staff.active,
        },
    );

    Ok(ok_with_message(staff, "Staff member updated successfully"))
}

/// POST /api/staff/:id/reset-pin
pub async fn reset_pin(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<PinReset>,
) -> ApiResult<StaffProfile> {
    validate(&payload)?;
    let staff = state.staff.reset_pin(&id, &payload.new_pin)?;
    tracing::info!(staff_id = %staff.id, reset_by = %current_user.id, "Staff PIN reset");
    Ok(ok_with_message(staff, "PIN reset successfully"))
}

/// POST /api/staff/:id/deactivate
pub async fn deactivate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StaffProfile> {
    if id == current_user.id {
        return Err(AppError::new(ErrorCode::StaffCannotDeactivateSelf));
    }

    let staff = state.staff.deactivate(&id)?;
    tracing::warn!(staff_id = %staff.id, username = %staff.username, deactivated_by = %current_user.id, "Staff account deactivated");

    emit::to_room(
        &state.bus,
        &Room::user(&staff.id),
        EventName::AccountDeactivated,
        &AccountNotice {
            message: "Your account has been deactivated".to_string(),
            active: false,
        },
    );

    Ok(ok_with_message(staff, "Staff member deactivated successfully"))
}
