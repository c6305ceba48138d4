//! 并发下单：订单号唯一，库存不为负

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::TestApp;
use http::StatusCode;
use serde_json::json;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_orders_unique_numbers_and_stock_floor() {
    let app = Arc::new(TestApp::new());
    let owner = app.owner_token().await;
    let category = app.category(&owner, "Drinks", "juicebar").await;
    let juice = app
        .menu_item(&owner, &category, "Mango juice", 3.0, "juicebar", Some(5))
        .await;
    let (_, waitress) = app.staff(&owner, "hanna", "waitress").await;

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let app = Arc::clone(&app);
            let waitress = waitress.clone();
            let juice = juice.clone();
            tokio::spawn(async move {
                app.post(
                    "/api/orders",
                    &waitress,
                    json!({
                        "order_type": "takeaway",
                        "items": [{ "item_id": juice, "quantity": 1 }],
                    }),
                )
                .await
            })
        })
        .collect();

    let mut numbers = HashSet::new();
    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        if status == StatusCode::OK {
            created += 1;
            let number = body["data"]["order"]["order_number"].as_str().unwrap().to_string();
            assert!(numbers.insert(number), "duplicate order number");
        } else {
            assert!(status.is_client_error(), "unexpected status {}", status);
        }
    }

    assert!(created >= 5, "only {} orders created", created);
    assert_eq!(numbers.len(), created);

    let (_, item) = app.get(&format!("/api/menu-items/{}", juice), &owner).await;
    assert_eq!(item["data"]["stock_tracking"]["current_stock"], 0);
    assert_eq!(item["data"]["available"], false);
}
