use super::*;
use shared::models::ChangeDenomination;

#[test]
fn test_cash_payment_with_change() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);

    let receipt = fx.manager.process_payment(&waitress(), cash(&order.id, 15.0)).unwrap();

    assert_eq!(receipt.order.status, OrderStatus::Completed);
    assert_eq!(receipt.order.payment_status, PaymentStatus::Paid);
    assert!(receipt.order.completed_at.is_some());
    assert_eq!(receipt.payment.total_amount, 11.0);
    assert_eq!(receipt.payment.amount_received, 15.0);
    assert_eq!(receipt.payment.change_due, 4.0);

    let change = receipt.change.unwrap();
    assert_eq!(change.amount, 4.0);
    assert_eq!(
        change.breakdown,
        vec![ChangeDenomination {
            denomination: 1.0,
            count: 4
        }]
    );

    let owner_events = fx.bus.events_for(&Room::owner());
    assert_eq!(owner_events.last().map(|e| e.event), Some(EventName::OrderCompleted));
}

#[test]
fn test_exact_cash_has_no_change() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);
    let receipt = fx.manager.process_payment(&waitress(), cash(&order.id, 11.0)).unwrap();
    assert_eq!(receipt.payment.change_due, 0.0);
    assert!(receipt.change.is_none());
}

#[test]
fn test_insufficient_cash_rejected() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);
    let err = fx
        .manager
        .process_payment(&waitress(), cash(&order.id, 10.0))
        .unwrap_err();
    assert!(matches!(err, ManagerError::InsufficientPayment { .. }));
}

#[test]
fn test_cash_one_cent_short_rejected() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);
    let err = fx
        .manager
        .process_payment(&waitress(), cash(&order.id, 10.99))
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::InsufficientPayment { required, received } if required == 11.0 && received == 10.99
    ));

    let unchanged = fx.manager.get_order(&order.id, &waitress()).unwrap();
    assert_eq!(unchanged.status, OrderStatus::Ready);
    assert_eq!(unchanged.payment_status, PaymentStatus::Unpaid);
}

#[test]
fn test_split_mismatch_rejected() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);

    let err = fx
        .manager
        .process_payment(
            &waitress(),
            split(&order.id, &[(TenderMethod::Cash, 5.0), (TenderMethod::Card, 5.99)]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::SplitMismatch { expected, actual } if expected == 11.0 && actual == 10.99
    ));

    let unchanged = fx.manager.get_order(&order.id, &waitress()).unwrap();
    assert_eq!(unchanged.status, OrderStatus::Ready);
    assert!(fx.manager.storage().payment_for_order(&order.id).unwrap().is_none());
}

#[test]
fn test_split_payment_accepted() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);

    let receipt = fx
        .manager
        .process_payment(
            &waitress(),
            split(&order.id, &[(TenderMethod::Cash, 6.0), (TenderMethod::MobileMoney, 5.0)]),
        )
        .unwrap();
    assert_eq!(receipt.payment.split_payments.len(), 2);
    assert_eq!(receipt.payment.change_due, 0.0);
    assert!(receipt.change.is_none());
}

#[test]
fn test_payment_requires_ready_order() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    let err = fx
        .manager
        .process_payment(&waitress(), cash(&order.id, 11.0))
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidStatusForPayment(OrderStatus::Pending)));
}

#[test]
fn test_payment_by_other_waitress_rejected() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);
    let err = fx
        .manager
        .process_payment(&other_waitress(), cash(&order.id, 11.0))
        .unwrap_err();
    assert!(matches!(err, ManagerError::NotOwner));
}

#[test]
fn test_repeat_payment_returns_stored_receipt() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);

    let first = fx.manager.process_payment(&waitress(), cash(&order.id, 15.0)).unwrap();
    let second = fx.manager.process_payment(&waitress(), cash(&order.id, 20.0)).unwrap();

    assert_eq!(first.payment.id, second.payment.id);
    assert_eq!(second.payment.amount_received, 15.0);
    assert_eq!(second.order.version, first.order.version);
}

#[test]
fn test_card_payment_records_transaction_id() {
    let fx = create_fixture();
    let order = create_eleven_dollar_order(&fx);
    make_ready(&fx, &order.id);

    let receipt = fx
        .manager
        .process_payment(
            &waitress(),
            ProcessPaymentRequest {
                order_id: order.id.clone(),
                payment_method: PaymentMethod::Card,
                amount_received: None,
                split_payments: vec![],
                transaction_id: Some(" TX-99 ".to_string()),
            },
        )
        .unwrap();
    assert_eq!(receipt.payment.amount_received, 11.0);
    assert_eq!(receipt.payment.transaction_id.as_deref(), Some("TX-99"));
}
