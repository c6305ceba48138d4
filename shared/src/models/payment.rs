//! Payment Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileMoney,
    Split,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::MobileMoney => "mobile-money",
            Self::Split => "split",
        }
    }
}

/// Method usable inside a split payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TenderMethod {
    Cash,
    Card,
    MobileMoney,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SplitPayment {
    pub method: TenderMethod,
    #[validate(range(min = 0.0, message = "Split amount cannot be negative"))]
    pub amount: f64,
}

/// Payment record (immutable once created)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub order_number: String,
    pub payment_method: PaymentMethod,
    pub total_amount: f64,
    pub amount_received: f64,
    pub change_due: f64,
    #[serde(default)]
    pub split_payments: Vec<SplitPayment>,
    pub waitress_id: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessPaymentRequest {
    #[validate(length(min = 1, message = "Order ID is required"))]
    pub order_id: String,
    pub payment_method: PaymentMethod,
    #[validate(range(min = 0.0, message = "Amount received cannot be negative"))]
    pub amount_received: Option<f64>,
    #[serde(default)]
    #[validate(nested)]
    pub split_payments: Vec<SplitPayment>,
    #[validate(length(max = 100, message = "Transaction ID is too long"))]
    pub transaction_id: Option<String>,
}

/// One denomination in a change breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeDenomination {
    pub denomination: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub amount: f64,
    pub breakdown: Vec<ChangeDenomination>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub order: super::order::Order,
    /// Present only for cash overpayment
    pub change: Option<ChangeInfo>,
}

/// Totals per tender method
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodTotals {
    pub cash: f64,
    pub card: f64,
    pub mobile_money: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyPaymentSummary {
    pub total: f64,
    pub count: u64,
    pub cash: f64,
    pub card: f64,
    pub mobile_money: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPayments {
    /// YYYY-MM-DD
    pub date: String,
    pub payments: Vec<Payment>,
    pub summary: DailyPaymentSummary,
}
