use crate::domain::model::QueryWindow;
use chrono::{DateTime, Days, FixedOffset, NaiveDateTime, NaiveTime, Offset, TimeDelta, Utc};

/// 慢日誌按北京時間（UTC+8）統計
pub const REPORT_UTC_OFFSET_SECONDS: i32 = 8 * 3600;

pub fn report_timezone() -> FixedOffset {
    FixedOffset::east_opt(REPORT_UTC_OFFSET_SECONDS).unwrap_or(Utc.fix())
}

fn at_offset(local: NaiveDateTime, tz: FixedOffset) -> DateTime<FixedOffset> {
    let utc = local - TimeDelta::seconds(i64::from(tz.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, tz)
}

impl QueryWindow {
    /// 以 `now` 所在日為基準，往回 `look_back_days` 天（至少 1 天），到昨天結束。
    pub fn trailing_days(now: DateTime<Utc>, look_back_days: u32) -> Self {
        let tz = report_timezone();
        let today = now.with_timezone(&tz).date_naive();
        let days = u64::from(look_back_days.max(1));

        let start_day = today - Days::new(days);
        let start = at_offset(start_day.and_time(NaiveTime::MIN), tz);
        // 今天零點前一秒，即昨天 23:59:59
        let end = at_offset(today.and_time(NaiveTime::MIN), tz) - TimeDelta::seconds(1);

        Self { start, end }
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// RDS OpenAPI 要求的 UTC 分鐘精度格式
    pub fn start_utc_minutes(&self) -> String {
        self.start.with_timezone(&Utc).format("%Y-%m-%dT%H:%MZ").to_string()
    }

    pub fn end_utc_minutes(&self) -> String {
        self.end.with_timezone(&Utc).format("%Y-%m-%dT%H:%MZ").to_string()
    }

    /// 評論中顯示的日期範圍，例如 `2026-10-12至2026-10-18`
    pub fn date_range_label(&self) -> String {
        format!(
            "{}至{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}
