//! Cache key layout and time-to-live policy
//!
//! Every report has its own key family so it can be invalidated with one
//! glob pattern. Absent filters are written as `all`.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;

use core_kernel::{ClientId, ZoneId};

/// Key of the portfolio-wide statistics
pub const GLOBAL_STATS: &str = "global:stats";

/// Pattern cleared when the caller does not pass one
pub const DEFAULT_CLEAR_PATTERN: &str = "metricas:*";

/// Default time to live for short-lived reports, in seconds
pub const DEFAULT_TTL_SECS: u64 = 300;

const ALL: &str = "all";

fn or_all<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| ALL.to_string(), |v| v.to_string())
}

/// `metricas:{start}:{end}:{zone|all}`
pub fn payment_behavior(start: NaiveDate, end: NaiveDate, zone: Option<ZoneId>) -> String {
    format!("metricas:{start}:{end}:{}", or_all(zone.map(|z| z.value())))
}

/// `user:{id}:history:complete`
pub fn client_history(client_id: ClientId) -> String {
    format!("user:{}:history:complete", client_id.value())
}

/// `annual:{year}:{zone|all}`
pub fn annual(year: i32, zone: Option<ZoneId>) -> String {
    format!("annual:{year}:{}", or_all(zone.map(|z| z.value())))
}

/// `top:{start}:{end}:{limit}:{order}`
pub fn top_clients(start: NaiveDate, end: NaiveDate, limit: usize, order: impl fmt::Display) -> String {
    format!("top:{start}:{end}:{limit}:{order}")
}

/// `ranking:{page}:{per_page}:{order}:{search|all}:{risk|all}`
///
/// The search term is lowercased so differently cased searches share an entry.
pub fn ranking(
    page: u32,
    per_page: u32,
    order: impl fmt::Display,
    search: Option<&str>,
    risk_level: Option<impl fmt::Display>,
) -> String {
    let search = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    format!(
        "ranking:{page}:{per_page}:{order}:{}:{}",
        or_all(search),
        or_all(risk_level)
    )
}

/// Time to live per report family, derived from one base duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    base: Duration,
}

impl CachePolicy {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn payment_behavior(&self) -> Duration {
        self.base
    }

    pub fn top_clients(&self) -> Duration {
        self.base
    }

    pub fn ranking(&self) -> Duration {
        self.base
    }

    /// Histories change slowly
    pub fn client_history(&self) -> Duration {
        self.base * 2
    }

    pub fn global_stats(&self) -> Duration {
        self.base * 2
    }

    /// Past months are settled, so the year view lives longest
    pub fn annual(&self) -> Duration {
        self.base * 6
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_secs(DEFAULT_TTL_SECS)
    }
}
