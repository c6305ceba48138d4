use super::*;

#[test]
fn test_create_order_prices_lines_and_numbers_order() {
    let fx = create_fixture();
    let created = fx
        .manager
        .create_order(
            &waitress(),
            dine_in(vec![line(&fx.injera, 3), line(&fx.tibs, 1)]),
        )
        .unwrap();
    let order = created.order;

    assert_eq!(order.subtotal, 11.0);
    assert_eq!(order.grand_total, 11.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert!(order.items.iter().all(|i| i.status == ItemStatus::Pending));
    assert_eq!(order.items[0].subtotal, 6.0);
    assert_eq!(order.waitress_id, "waitress-1");
    assert!(order.order_number.starts_with("ORD-"));
    assert!(order.order_number.ends_with("-0001"));
    assert!(order.is_within_grace_window(now_millis()));

    let second = create_eleven_dollar_order(&fx);
    assert!(second.order_number.ends_with("-0002"));
}

#[test]
fn test_takeaway_price_and_add_ons() {
    let fx = create_fixture();
    let mut input = line(&fx.injera, 2);
    input.add_ons = vec![fx.extra_sauce.clone()];

    let order = fx
        .manager
        .create_order(
            &waitress(),
            CreateOrderRequest {
                order_type: OrderType::Takeaway,
                customer_name: "  Abebe ".to_string(),
                customer_phone: String::new(),
                items: vec![input],
            },
        )
        .unwrap()
        .order;

    // (2.50 + 1.00) × 2
    assert_eq!(order.items[0].price_per_unit, 2.5);
    assert_eq!(order.items[0].add_ons.len(), 1);
    assert_eq!(order.grand_total, 7.0);
    assert_eq!(order.customer_name, "Abebe");
}

#[test]
fn test_auto_complete_lines_start_ready() {
    let fx = create_fixture();
    let order = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.soda, 1), line(&fx.tibs, 1)]))
        .unwrap()
        .order;

    let soda = order.items.iter().find(|i| i.item_id == fx.soda.id).unwrap();
    assert!(soda.auto_complete);
    assert!(soda.skip_kitchen);
    assert_eq!(soda.status, ItemStatus::Ready);
    assert_eq!(order.status, OrderStatus::Pending);

    let drinks_only = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.soda, 1)]))
        .unwrap()
        .order;
    // 行已出餐，订单本身仍从 pending 开始
    assert!(drinks_only.items.iter().all(|i| i.status == ItemStatus::Ready));
    assert_eq!(drinks_only.status, OrderStatus::Pending);
}

#[test]
fn test_unknown_item_is_rejected_without_side_effects() {
    let fx = create_fixture();
    let mut ghost = line(&fx.tibs, 1);
    ghost.item_id = "ghost".to_string();

    let err = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.soda, 2), ghost]))
        .unwrap_err();
    assert!(matches!(err, ManagerError::ItemsNotFound(ref ids) if ids == &vec!["ghost".to_string()]));

    // 库存未扣减，没有订单，没有推送
    let soda = fx.menu.find_by_id(&fx.soda.id).unwrap().unwrap();
    assert_eq!(soda.stock_tracking.current_stock, 5);
    assert!(fx.manager.all_orders(&OrderQuery::default()).unwrap().is_empty());
    assert!(fx.bus.take().is_empty());
}

#[test]
fn test_empty_and_zero_quantity_rejected() {
    let fx = create_fixture();
    let err = fx.manager.create_order(&waitress(), dine_in(vec![])).unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));

    let err = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.tibs, 0)]))
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
}

#[test]
fn test_unknown_add_on_rejected() {
    let fx = create_fixture();
    let mut input = line(&fx.tibs, 1);
    input.add_ons = vec!["no-such-add-on".to_string()];
    let err = fx.manager.create_order(&waitress(), dine_in(vec![input])).unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
}

#[test]
fn test_stock_deduction_and_low_stock_alert() {
    let fx = create_fixture();
    let created = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.soda, 2)]))
        .unwrap();

    assert_eq!(created.stock_deductions.len(), 1);
    assert_eq!(created.stock_deductions[0].new_stock, 3);
    assert_eq!(created.low_stock_alerts.len(), 1);
    assert_eq!(created.low_stock_alerts[0].current_stock, 3);

    let alerts = fx
        .bus
        .events_for(&Room::owner())
        .into_iter()
        .filter(|e| e.event == EventName::LowStockAlert)
        .count();
    assert_eq!(alerts, 1);
}

#[test]
fn test_sold_out_item_becomes_unavailable() {
    let fx = create_fixture();
    fx.manager
        .create_order(&waitress(), dine_in(vec![line(&fx.soda, 5)]))
        .unwrap();

    let soda = fx.menu.find_by_id(&fx.soda.id).unwrap().unwrap();
    assert_eq!(soda.stock_tracking.current_stock, 0);
    assert!(!soda.available);

    let err = fx
        .manager
        .create_order(&waitress(), dine_in(vec![line(&fx.soda, 1)]))
        .unwrap_err();
    assert!(matches!(err, ManagerError::ItemsUnavailable(ref names) if names == &vec!["Soda".to_string()]));
}

#[test]
fn test_create_broadcasts_station_views() {
    let fx = create_fixture();
    let order = fx
        .manager
        .create_order(
            &waitress(),
            dine_in(vec![line(&fx.tibs, 1), line(&fx.platter, 1)]),
        )
        .unwrap()
        .order;

    let kitchen_events = fx.bus.events_for(&Room::kitchen());
    assert_eq!(event_names(&kitchen_events), vec![EventName::NewOrder]);
    let payload: OrderPayload = kitchen_events[0].parse_data().unwrap();
    assert_eq!(payload.order.items.len(), 1);
    assert_eq!(payload.order.items[0].item_id, fx.tibs.id);

    let juicebar_events = fx.bus.events_for(&Room::juicebar());
    let payload: OrderPayload = juicebar_events[0].parse_data().unwrap();
    assert_eq!(payload.order.items[0].item_id, fx.platter.id);

    assert_eq!(
        event_names(&fx.bus.events_for(&Room::owner())),
        vec![EventName::NewOrderAlert]
    );
    let acks = fx.bus.events_for(&Room::user("waitress-1"));
    assert_eq!(event_names(&acks), vec![EventName::OrderCreatedSuccess]);
    let ack: OrderCreatedAck = acks[0].parse_data().unwrap();
    assert_eq!(ack.order_number, order.order_number);
}

#[test]
fn test_kitchen_only_order_skips_juicebar() {
    let fx = create_fixture();
    create_eleven_dollar_order(&fx);
    assert!(fx.bus.events_for(&Room::juicebar()).is_empty());
    assert_eq!(fx.bus.events_for(&Room::kitchen()).len(), 1);
}
