//! Daily Analytics Model

use super::common::LocalizedText;
use super::payment::PaymentMethodTotals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitressSales {
    pub waitress_id: String,
    pub waitress_name: String,
    pub orders: u64,
    pub revenue: f64,
    pub cancellations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySales {
    /// 0-23, business timezone
    pub hour: u32,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSales {
    pub item_id: String,
    pub item_name: LocalizedText,
    pub quantity_sold: u64,
    pub revenue: f64,
}

/// One rollup per business day (unique on `date`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAnalytics {
    /// YYYY-MM-DD
    pub date: String,
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub total_revenue: f64,
    pub total_waste_cost: f64,
    pub sales_by_waitress: Vec<WaitressSales>,
    pub sales_by_hour: Vec<HourlySales>,
    pub payment_methods: PaymentMethodTotals,
    pub top_items: Vec<ItemSales>,
    pub updated_at: i64,
}

impl DailyAnalytics {
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            total_orders: 0,
            completed_orders: 0,
            cancelled_orders: 0,
            total_revenue: 0.0,
            total_waste_cost: 0.0,
            sales_by_waitress: Vec::new(),
            sales_by_hour: Vec::new(),
            payment_methods: PaymentMethodTotals::default(),
            top_items: Vec::new(),
            updated_at: 0,
        }
    }
}

// ========== Reports ==========

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub active_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayAnalytics {
    pub date: String,
    pub summary: TodaySummary,
    pub analytics: DailyAnalytics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub total_waste_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancellationTotals {
    pub count: u64,
    pub total_waste_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodAnalytics {
    pub start_date: String,
    pub end_date: String,
    pub summary: PeriodSummary,
    pub payment_methods: PaymentMethodTotals,
    pub sales_by_waitress: Vec<WaitressSales>,
    pub top_items: Vec<ItemSales>,
    pub cancellations: CancellationTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySales {
    pub date: String,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitressSummary {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    /// Percent of orders that were cancelled
    pub cancellation_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitressPerformance {
    pub waitress_id: String,
    pub summary: WaitressSummary,
    pub orders_by_day: Vec<DaySales>,
}
