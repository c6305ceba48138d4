use super::*;
use crate::orders::storage::OrderStorage;

fn logs(storage: &OrderStorage) -> Vec<CancellationLog> {
    storage.cancellation_logs(|_| true).unwrap()
}

#[test]
fn test_cancel_inside_grace_window_is_free() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);

    let result = fx
        .manager
        .cancel_order(&order.id, &waitress(), cancel_request("customer left"))
        .unwrap();

    assert_eq!(result.order.status, OrderStatus::Cancelled);
    assert_eq!(result.waste_cost, 0.0);
    assert!(!result.requires_review);

    let info = result.order.cancellation.unwrap();
    assert_eq!(info.phase, CancellationPhase::GraceWindow);
    assert_eq!(info.reason, "customer left");
    assert_eq!(info.wasted_items.len(), 2);

    let logs = logs(fx.manager.storage());
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].requires_review);
    assert!(fx.bus.events_for(&Room::owner()).iter().all(|e| e.event != EventName::CancellationRequiresReview));
}

#[test]
fn test_cancel_confirmed_twenty_dollar_order() {
    let fx = create_fixture();
    let order = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.platter, 1)]))
        .unwrap()
        .order;
    let confirmed = confirm_order(&fx, &order.id);
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    fx.bus.take();

    let result = fx
        .manager
        .cancel_order(&order.id, &waitress(), cancel_request("wrong order"))
        .unwrap();

    assert_eq!(result.waste_cost, 10.0);
    assert!(result.requires_review);

    let logs = logs(fx.manager.storage());
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.phase, CancellationPhase::Confirmed);
    assert_eq!(log.waste_cost, 10.0);
    assert_eq!(log.order_number, order.order_number);
    assert_eq!(log.cancelled_by, "waitress-1");
    assert_eq!(log.items_lost.len(), 1);
    assert_eq!(log.items_lost[0].cost, 20.0);

    let owner_events = fx.bus.events_for(&Room::owner());
    assert_eq!(event_names(&owner_events), vec![EventName::CancellationRequiresReview]);
    let alert: CancellationReviewAlert = owner_events[0].parse_data().unwrap();
    assert_eq!(alert.waste_cost, 10.0);

    for room in [Room::kitchen(), Room::juicebar()] {
        assert_eq!(event_names(&fx.bus.events_for(&room)), vec![EventName::OrderCancelled]);
    }
}

#[test]
fn test_cancel_stale_pending_order_rejected() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    expire_grace_window(&fx, &order.id);
    fx.bus.take();

    let err = fx
        .manager
        .cancel_order(&order.id, &waitress(), cancel_request("forgotten"))
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidCancellationState(OrderStatus::Pending)));

    let unchanged = fx.manager.get_order(&order.id, &waitress()).unwrap();
    assert_eq!(unchanged.status, OrderStatus::Pending);
    assert!(logs(fx.manager.storage()).is_empty());
    assert!(fx.bus.take().is_empty());
}

#[test]
fn test_waste_by_phase() {
    let fx = create_fixture();

    let cooking = create_eleven_dollar_order(&fx);
    expire_grace_window(&fx, &cooking.id);
    fx.manager
        .update_status(&cooking.id, &kitchen(), bulk_status(ItemStatus::InProgress))
        .unwrap();
    let result = fx
        .manager
        .cancel_order(&cooking.id, &waitress(), cancel_request("too slow"))
        .unwrap();
    assert_eq!(result.order.cancellation.unwrap().phase, CancellationPhase::InProgress);
    assert_eq!(result.waste_cost, 8.8);

    let ready = create_eleven_dollar_order(&fx);
    make_ready(&fx, &ready.id);
    expire_grace_window(&fx, &ready.id);
    let result = fx
        .manager
        .cancel_order(&ready.id, &waitress(), cancel_request("never picked up"))
        .unwrap();
    assert_eq!(result.order.cancellation.unwrap().phase, CancellationPhase::Ready);
    assert_eq!(result.waste_cost, 11.0);
}

#[test]
fn test_cancel_terminal_order_rejected() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    fx.manager
        .cancel_order(&order.id, &waitress(), cancel_request("first"))
        .unwrap();

    let err = fx
        .manager
        .cancel_order(&order.id, &waitress(), cancel_request("second"))
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderTerminal(OrderStatus::Cancelled)));
    assert_eq!(logs(fx.manager.storage()).len(), 1);
}

#[test]
fn test_cancel_requires_owner_and_reason() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);

    let err = fx
        .manager
        .cancel_order(&order.id, &other_waitress(), cancel_request("mine now"))
        .unwrap_err();
    assert!(matches!(err, ManagerError::NotOwner));

    let err = fx
        .manager
        .cancel_order(&order.id, &waitress(), cancel_request("   "))
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));

    let still_open = fx.manager.get_order(&order.id, &waitress()).unwrap();
    assert_eq!(still_open.status, OrderStatus::Pending);
}

#[test]
fn test_clear_station_cancels_unready_orders() {
    let fx = create_fixture();
    let pending = create_eleven_dollar_order(&fx);
    let ready = create_eleven_dollar_order(&fx);
    make_ready(&fx, &ready.id);
    let juicebar_only = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.platter, 1)]))
        .unwrap()
        .order;
    fx.bus.take();

    let cleared = fx.manager.clear_station(PrepStation::Kitchen, &owner()).unwrap();
    assert_eq!(cleared, 1);

    let pending = fx.manager.get_order(&pending.id, &owner()).unwrap();
    assert_eq!(pending.status, OrderStatus::Cancelled);
    let info = pending.cancellation.unwrap();
    assert_eq!(info.reason, DISPLAY_CLEARED_REASON);
    assert_eq!(info.cancelled_by, "owner-1");

    assert_eq!(fx.manager.get_order(&ready.id, &owner()).unwrap().status, OrderStatus::Ready);
    assert_eq!(
        fx.manager.get_order(&juicebar_only.id, &owner()).unwrap().status,
        OrderStatus::Pending
    );

    let kitchen_events = event_names(&fx.bus.events_for(&Room::kitchen()));
    assert_eq!(kitchen_events.last(), Some(&EventName::ClearDisplay));
}

#[test]
fn test_review_cancellation_once() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    confirm_order(&fx, &order.id);
    fx.manager
        .cancel_order(&order.id, &waitress(), cancel_request("changed mind"))
        .unwrap();

    let log_id = logs(fx.manager.storage())[0].id.clone();
    let reviewed = fx.manager.storage().review_cancellation(&log_id, "owner-1").unwrap();
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("owner-1"));
    assert!(!reviewed.requires_review);

    let err = fx.manager.storage().review_cancellation(&log_id, "owner-1").unwrap_err();
    assert!(matches!(err, ManagerError::AlreadyReviewed(_)));
}

#[test]
fn test_create_and_cancel_leave_daily_analytics_untouched() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    fx.manager
        .cancel_order(&order.id, &waitress(), cancel_request("customer left"))
        .unwrap();

    let analytics = AnalyticsRepository::new(fx.db.clone());
    assert!(analytics.range("0000-01-01", "9999-12-31").unwrap().is_empty());

    // 只有支付写入当天快照
    let paid = create_eleven_dollar_order(&fx);
    make_ready(&fx, &paid.id);
    fx.manager.process_payment(&waitress(), cash(&paid.id, 11.0)).unwrap();
    let records = analytics.range("0000-01-01", "9999-12-31").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].completed_orders, 1);
    assert_eq!(records[0].total_orders, 0);
    assert_eq!(records[0].cancelled_orders, 0);
}
