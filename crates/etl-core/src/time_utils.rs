use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured timezone name into a [`Tz`].
///
/// `"auto"` means the system timezone. Unrecognised names fall back to UTC
/// and log a warning.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    let name = if tz_name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        tz_name.to_string()
    };

    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("unrecognised timezone \"{}\", falling back to UTC", name);
        Tz::UTC
    })
}

/// Format a UTC instant the way fetch timestamps are stored:
/// naive ISO-8601 with microseconds, e.g. `"2024-01-15T08:00:00.000000"`.
pub fn format_fetch_timestamp(dt: &DateTime<Utc>) -> String {
    dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Source of "today" and "now" for date-stamped artifacts.
pub trait Clock {
    /// Current calendar date in the clock's local timezone.
    fn today(&self) -> NaiveDate;

    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall-clock time, with "today" evaluated in a configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Clock for a configured timezone name (`"auto"` or an IANA name).
    pub fn from_name(tz_name: &str) -> Self {
        Self::new(resolve_timezone(tz_name))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::from_name("auto")
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(date: NaiveDate, instant: DateTime<Utc>) -> Self {
        Self { date, instant }
    }

    /// Frozen at midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        let instant = date.and_time(chrono::NaiveTime::default()).and_utc();
        Self { date, instant }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
