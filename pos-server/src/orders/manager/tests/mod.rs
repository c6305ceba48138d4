use super::*;
use crate::db::repository::{AnalyticsRepository, CategoryRepository};
use crate::message::bus::RecordingBus;
use shared::models::{
    AddOnCreate, CancellationPhase, CategoryCreate, LocalizedText, MenuItemCreate, MenuPricing, SplitPayment,
    StockTracking, TenderMethod,
};

mod test_cancel;
mod test_create;
mod test_payment;

// ========================================================================
// Fixture
// ========================================================================

/// Manager over an in-memory database with a seeded menu
struct Fixture {
    db: DbService,
    manager: OrdersManager,
    bus: Arc<RecordingBus>,
    menu: MenuItemRepository,
    /// 厨房菜品 $2.00 (外卖 $2.50)
    injera: MenuItem,
    /// 厨房菜品 $5.00
    tibs: MenuItem,
    /// 果汁吧 $20.00
    platter: MenuItem,
    /// 免制作饮料 $1.50，库存 5，最低 3
    soda: MenuItem,
    /// 加料 $1.00
    extra_sauce: String,
}

fn create_fixture() -> Fixture {
    let db = DbService::open_in_memory().unwrap();
    let bus = Arc::new(RecordingBus::default());
    let manager = OrdersManager::new(db.clone(), bus.clone(), chrono_tz::UTC);

    let categories = CategoryRepository::new(db.clone());
    let food = categories
        .create(
            CategoryCreate {
                name: LocalizedText::new("Food", "ምግብ"),
                prep_station: Some(PrepStation::Kitchen),
                requires_preparation: Some(true),
                auto_deduct_stock: None,
            },
            None,
        )
        .unwrap();

    let menu = MenuItemRepository::new(db.clone());
    let add_item = |name: &str, dine_in: f64, takeaway: f64, station: PrepStation, prep: bool, stock: Option<StockTracking>| {
        menu.create(
            MenuItemCreate {
                name: LocalizedText::new(name, name),
                description: None,
                category_id: food.id.clone(),
                pricing: MenuPricing { dine_in, takeaway },
                prep_station: station,
                prep_time: None,
                requires_preparation: Some(prep),
                stock_tracking: stock,
                add_ons: vec![],
                image_url: None,
                image_public_id: None,
            },
            None,
        )
        .unwrap()
    };

    let injera = add_item("Injera", 2.0, 2.5, PrepStation::Kitchen, true, None);
    let tibs = add_item("Tibs", 5.0, 5.0, PrepStation::Kitchen, true, None);
    let platter = add_item("Fruit Platter", 20.0, 20.0, PrepStation::Juicebar, true, None);
    let soda = add_item(
        "Soda",
        1.5,
        1.5,
        PrepStation::None,
        false,
        Some(StockTracking {
            enabled: true,
            current_stock: 5,
            min_stock: 3,
            ..Default::default()
        }),
    );

    let extra_sauce = AddOnRepository::new(db.clone())
        .create(AddOnCreate {
            name: LocalizedText::new("Extra sauce", "ተጨማሪ ሶስ"),
            price: 1.0,
            stations: vec![PrepStation::Kitchen],
            is_optional: None,
        })
        .unwrap()
        .id;

    Fixture {
        db,
        manager,
        bus,
        menu,
        injera,
        tibs,
        platter,
        soda,
        extra_sauce,
    }
}

// ========================================================================
// Actors
// ========================================================================

fn user(id: &str, role: Role) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        username: id.to_string(),
        full_name: format!("{} name", id),
        role,
    }
}

fn waitress() -> CurrentUser {
    user("waitress-1", Role::Waitress)
}

fn other_waitress() -> CurrentUser {
    user("waitress-2", Role::Waitress)
}

fn kitchen() -> CurrentUser {
    user("kitchen-1", Role::Kitchen)
}

fn owner() -> CurrentUser {
    user("owner-1", Role::Owner)
}

// ========================================================================
// Requests
// ========================================================================

fn line(item: &MenuItem, quantity: u32) -> OrderLineInput {
    OrderLineInput {
        item_id: item.id.clone(),
        quantity,
        variant: String::new(),
        add_ons: vec![],
        special_notes: String::new(),
    }
}

fn dine_in(items: Vec<OrderLineInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type: OrderType::DineIn,
        customer_name: String::new(),
        customer_phone: String::new(),
        items,
    }
}

fn cash(order_id: &str, amount: f64) -> ProcessPaymentRequest {
    ProcessPaymentRequest {
        order_id: order_id.to_string(),
        payment_method: PaymentMethod::Cash,
        amount_received: Some(amount),
        split_payments: vec![],
        transaction_id: None,
    }
}

fn split(order_id: &str, parts: &[(TenderMethod, f64)]) -> ProcessPaymentRequest {
    ProcessPaymentRequest {
        order_id: order_id.to_string(),
        payment_method: PaymentMethod::Split,
        amount_received: None,
        split_payments: parts
            .iter()
            .map(|(method, amount)| SplitPayment {
                method: *method,
                amount: *amount,
            })
            .collect(),
        transaction_id: None,
    }
}

fn cancel_request(reason: &str) -> CancelOrderRequest {
    CancelOrderRequest {
        reason: reason.to_string(),
        details: None,
        expected_version: None,
    }
}

fn bulk_status(status: ItemStatus) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status,
        line_id: None,
        expected_version: None,
    }
}

// ========================================================================
// Helpers
// ========================================================================

/// $11.00 order: 3 × injera @ $2 + 1 × tibs @ $5
fn create_eleven_dollar_order(fx: &Fixture) -> Order {
    fx.manager
        .create_order(
            &waitress(),
            dine_in(vec![line(&fx.injera, 3), line(&fx.tibs, 1)]),
        )
        .unwrap()
        .order
}

/// Move the grace window into the past
fn expire_grace_window(fx: &Fixture, order_id: &str) -> Order {
    fx.manager
        .storage()
        .mutate(order_id, None, |_, order| {
            order.grace_window_ends_at = now_millis() - 1;
            Ok(())
        })
        .unwrap()
        .0
}

/// Expire the grace window, then let a station line update store `confirmed`
fn confirm_order(fx: &Fixture, order_id: &str) -> Order {
    let order = expire_grace_window(fx, order_id);
    fx.manager
        .update_status(
            order_id,
            &kitchen(),
            UpdateOrderStatusRequest {
                status: ItemStatus::Pending,
                line_id: Some(order.items[0].line_id.clone()),
                expected_version: None,
            },
        )
        .unwrap()
}

/// Mark every line ready from the kitchen
fn make_ready(fx: &Fixture, order_id: &str) -> Order {
    fx.manager
        .update_status(order_id, &kitchen(), bulk_status(ItemStatus::Ready))
        .unwrap()
}

fn event_names(events: &[shared::RealtimeEvent]) -> Vec<EventName> {
    events.iter().map(|e| e.event).collect()
}
