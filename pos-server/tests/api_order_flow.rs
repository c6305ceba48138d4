//! 端到端订单流程：建菜单 -> 下单 -> 出品 -> 收款 -> 报表

mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::{Value, json};

struct Menu {
    bread: String,
    tibs: String,
}

async fn seed_menu(app: &TestApp, owner: &str) -> Menu {
    let category = app.category(owner, "Mains", "kitchen").await;
    let bread = app
        .menu_item(owner, &category, "Bread", 2.0, "kitchen", None)
        .await;
    let tibs = app
        .menu_item(owner, &category, "Tibs", 5.0, "kitchen", Some(10))
        .await;
    Menu { bread, tibs }
}

async fn place_order(app: &TestApp, waitress: &str, menu: &Menu) -> Value {
    let (status, body) = app
        .post(
            "/api/orders",
            waitress,
            json!({
                "order_type": "dine-in",
                "items": [
                    { "item_id": menu.bread, "quantity": 3 },
                    { "item_id": menu.tibs, "quantity": 1 },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create order failed: {}", body);
    body["data"]["order"].clone()
}

#[tokio::test]
async fn test_order_to_payment_flow() {
    let app = TestApp::new();
    let owner = app.owner_token().await;
    let menu = seed_menu(&app, &owner).await;
    let (waitress_id, waitress) = app.staff(&owner, "hanna", "waitress").await;
    let (_, kitchen) = app.staff(&owner, "chef", "kitchen").await;

    // 下单
    let order = place_order(&app, &waitress, &menu).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["grand_total"], 11.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "unpaid");
    assert_eq!(order["waitress_id"], waitress_id);
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));

    // 库存已扣减
    let (_, item) = app.get(&format!("/api/menu-items/{}", menu.tibs), &owner).await;
    assert_eq!(item["data"]["stock_tracking"]["current_stock"], 9);

    let (status, mine) = app.get("/api/orders/my-active", &waitress).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);

    // 出品站看到订单
    let (status, station) = app.get("/api/orders/station", &kitchen).await;
    assert_eq!(status, StatusCode::OK);
    let station_orders = station["data"].as_array().unwrap();
    assert_eq!(station_orders.len(), 1);
    assert_eq!(station_orders[0]["items"].as_array().unwrap().len(), 2);

    // 未出品不能收款
    let (status, _) = app
        .post(
            "/api/payments",
            &waitress,
            json!({ "order_id": order_id, "payment_method": "cash", "amount_received": 15.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 服务员不能改出品状态
    let (status, _) = app
        .patch(
            &format!("/api/orders/{}/status", order_id),
            &waitress,
            json!({ "status": "ready" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, ready) = app
        .patch(
            &format!("/api/orders/{}/status", order_id),
            &kitchen,
            json!({ "status": "ready" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "status update failed: {}", ready);
    assert_eq!(ready["data"]["status"], "ready");

    // 现金不足
    let (status, _) = app
        .post(
            "/api/payments",
            &waitress,
            json!({ "order_id": order_id, "payment_method": "cash", "amount_received": 10.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

    let (status, receipt) = app
        .post(
            "/api/payments",
            &waitress,
            json!({ "order_id": order_id, "payment_method": "cash", "amount_received": 15.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "payment failed: {}", receipt);
    assert_eq!(receipt["data"]["change"]["amount"], 4.0);
    assert_eq!(receipt["data"]["order"]["status"], "completed");
    assert_eq!(receipt["data"]["order"]["payment_status"], "paid");
    assert_eq!(receipt["data"]["payment"]["total_amount"], 11.0);

    // 已完成订单离开活动列表和出品站
    let (_, mine) = app.get("/api/orders/my-active", &waitress).await;
    assert!(mine["data"].as_array().unwrap().is_empty());
    let (_, station) = app.get("/api/orders/station", &kitchen).await;
    assert!(station["data"].as_array().unwrap().is_empty());

    // 店主报表
    let (status, daily) = app.get("/api/payments/daily", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(daily["data"]["summary"]["count"], 1);
    assert_eq!(daily["data"]["summary"]["cash"], 11.0);

    let (status, today) = app.get("/api/analytics/today", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today["data"]["summary"]["completed_orders"], 1);
    assert_eq!(today["data"]["summary"]["total_revenue"], 11.0);

    let (status, _) = app.get("/api/analytics/today", &waitress).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_inside_grace_window() {
    let app = TestApp::new();
    let owner = app.owner_token().await;
    let menu = seed_menu(&app, &owner).await;
    let (_, waitress) = app.staff(&owner, "hanna", "waitress").await;
    let (_, other) = app.staff(&owner, "liya", "waitress").await;

    let order = place_order(&app, &waitress, &menu).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // 只能作废自己的订单
    let (status, _) = app
        .post(
            &format!("/api/orders/{}/cancel", order_id),
            &other,
            json!({ "reason": "wrong table" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            &format!("/api/orders/{}/cancel", order_id),
            &waitress,
            json!({ "reason": "customer left" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "cancel failed: {}", body);
    assert_eq!(body["data"]["requires_review"], false);
    assert_eq!(body["data"]["waste_cost"], 0.0);
    assert_eq!(body["data"]["order"]["status"], "cancelled");

    // 重复作废被拒绝
    let (status, _) = app
        .post(
            &format!("/api/orders/{}/cancel", order_id),
            &waitress,
            json!({ "reason": "again" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, report) = app.get("/api/analytics/cancellations", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["logs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_edit_order_inside_grace_window() {
    let app = TestApp::new();
    let owner = app.owner_token().await;
    let menu = seed_menu(&app, &owner).await;
    let (_, waitress) = app.staff(&owner, "hanna", "waitress").await;

    let order = place_order(&app, &waitress, &menu).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            &format!("/api/orders/{}", order_id),
            &waitress,
            json!({
                "items": [{ "item_id": menu.tibs, "quantity": 2 }],
                "customer_name": "Abel",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "edit failed: {}", body);
    assert_eq!(body["data"]["grand_total"], 10.0);
    assert_eq!(body["data"]["customer_name"], "Abel");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (status, fetched) = app.get(&format!("/api/orders/{}", order_id), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["grand_total"], 10.0);
}

#[tokio::test]
async fn test_lookup_by_order_number() {
    let app = TestApp::new();
    let owner = app.owner_token().await;
    let menu = seed_menu(&app, &owner).await;
    let (_, waitress) = app.staff(&owner, "hanna", "waitress").await;
    let (_, other) = app.staff(&owner, "liya", "waitress").await;

    let order = place_order(&app, &waitress, &menu).await;
    let number = order["order_number"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/api/orders/number/{}", number), &owner).await;
    assert_eq!(status, StatusCode::OK, "lookup failed: {}", body);
    assert_eq!(body["data"]["id"], order["id"]);

    let (status, _) = app.get(&format!("/api/orders/number/{}", number), &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/orders/number/ORD-19990101-0001", &owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unavailable_item_cannot_be_ordered() {
    let app = TestApp::new();
    let owner = app.owner_token().await;
    let menu = seed_menu(&app, &owner).await;
    let (_, waitress) = app.staff(&owner, "hanna", "waitress").await;
    let (_, kitchen) = app.staff(&owner, "chef", "kitchen").await;

    let (status, body) = app
        .patch(
            &format!("/api/menu-items/{}/availability", menu.bread),
            &kitchen,
            json!({ "available": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "toggle failed: {}", body);

    let (status, _) = app
        .post(
            "/api/orders",
            &waitress,
            json!({
                "order_type": "takeaway",
                "items": [{ "item_id": menu.bread, "quantity": 1 }],
            }),
        )
        .await;
    assert!(status.is_client_error());

    // 失败的下单不扣库存
    let (_, item) = app.get(&format!("/api/menu-items/{}", menu.tibs), &owner).await;
    assert_eq!(item["data"]["stock_tracking"]["current_stock"], 10);
}
