//! Sales analytics
//!
//! - [`SalesAccumulator`] - 支付完成时增量更新当天的 `DailyAnalytics`
//! - [`ReportService`] - today / period / waitress / payments / cancellations 报表

pub mod accumulator;
pub mod reports;

pub use accumulator::SalesAccumulator;
pub use reports::ReportService;
