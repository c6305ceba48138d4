//! 时间工具函数 - 业务时区转换
//!
//! 订单号日期、分析日、小时分桶都按业务时区计算，
//! 存储层只接收 `i64` Unix millis。

use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;

use super::{AppError, AppResult, ErrorCode};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Unix millis → 业务时区日期
pub fn business_date(millis: i64, tz: Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .date_naive()
}

/// Unix millis → 业务时区小时 (0-23)
pub fn business_hour(millis: i64, tz: Tz) -> u32 {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .hour()
}

/// 当前业务日
pub fn today(tz: Tz) -> NaiveDate {
    business_date(shared::util::now_millis(), tz)
}

/// `YYYY-MM-DD` (analytics key)
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYYMMDD` (order number)
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// 解析可选日期区间，缺省为今天；`start > end` 返回 InvalidDateRange
pub fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    tz: Tz,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let today = today(tz);
    let start = start.map(parse_date).transpose()?.unwrap_or(today);
    let end = end.map(parse_date).transpose()?.unwrap_or(today);
    if start > end {
        return Err(AppError::with_message(
            ErrorCode::InvalidDateRange,
            format!("Start date {} is after end date {}", start, end),
        ));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_date_crosses_midnight() {
        // 2025-01-06 22:30 UTC = 2025-01-07 01:30 in Addis Ababa (UTC+3)
        let millis = 1_736_202_600_000;
        let tz: Tz = "Africa/Addis_Ababa".parse().unwrap();
        assert_eq!(
            business_date(millis, tz),
            NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
        );
        assert_eq!(business_hour(millis, tz), 1);
        assert_eq!(business_date(millis, chrono_tz::UTC).to_string(), "2025-01-06");
    }

    #[test]
    fn test_day_bounds() {
        let tz = chrono_tz::UTC;
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(day_end_millis(date, tz) - day_start_millis(date, tz), 86_400_000);
    }

    #[test]
    fn test_resolve_range() {
        let tz = chrono_tz::UTC;
        let (s, e) = resolve_range(Some("2025-01-01"), Some("2025-01-31"), tz).unwrap();
        assert_eq!(compact_date(s), "20250101");
        assert_eq!(date_key(e), "2025-01-31");

        let err = resolve_range(Some("2025-02-01"), Some("2025-01-31"), tz).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDateRange);
        assert!(resolve_range(Some("31/01/2025"), None, tz).is_err());
    }
}
