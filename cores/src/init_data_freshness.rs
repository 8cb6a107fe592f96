
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_MAX_AGE_SECS: i64 = 24 * 60 * 60;

// `auth_date` in the future counts as fresh, clock skew between client and server is tolerated.
pub fn is_fresh(auth_date: Option<i64>, max_age_secs: i64, now: i64) -> bool {
    let Some(auth_date) = auth_date else {
        return false;
    };
    now.saturating_sub(auth_date) <= max_age_secs
}

pub fn staleness_warning(auth_date: Option<i64>, max_age_secs: i64) -> String {
    match auth_date {
        Some(_) => format!("auth_date is older than {} seconds", max_age_secs),
        None => "auth_date is missing".to_string(),
    }
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
