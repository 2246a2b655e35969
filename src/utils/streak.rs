// src/utils/streak.rs

use chrono::NaiveDate;

/// Login streak after a login on `today`.
///
/// Same day keeps the streak, the next day extends it, any gap restarts at 1.
pub fn next_streak(current: i64, last_login: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match last_login {
        Some(last) if last == today => current.max(1),
        Some(last) if last.succ_opt() == Some(today) => current + 1,
        _ => 1,
    }
}
