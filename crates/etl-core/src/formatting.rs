use chrono::NaiveDate;

/// Tag prefixed to every progress line printed by the pipeline.
pub const PROGRESS_TAG: &str = "[data-automation-service]";

/// Render `date` as the compact `YYYYMMDD` stamp used in artifact names.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use etl_core::formatting::date_stamp;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(date_stamp(date), "20240105");
/// ```
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Build the artifact file name `{prefix}_{YYYYMMDD}.json`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use etl_core::formatting::artifact_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
/// assert_eq!(artifact_file_name("raw", date), "raw_20241130.json");
/// ```
pub fn artifact_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.json", prefix, date_stamp(date))
}

/// Prefix `message` with [`PROGRESS_TAG`].
///
/// # Examples
///
/// ```
/// use etl_core::formatting::progress_line;
///
/// assert_eq!(
///     progress_line("Loaded 3 transactions"),
///     "[data-automation-service] Loaded 3 transactions"
/// );
/// ```
pub fn progress_line(message: &str) -> String {
    format!("{} {}", PROGRESS_TAG, message)
}

/// Drop a leading `http://` or `https://` from `url`.
///
/// Used to label the source of a fetch summary.
pub fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

/// Format an optional statistic for a progress line: two decimals or `"n/a"`.
pub fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_stamp_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 3).unwrap();
        assert_eq!(date_stamp(date), "20230203");
    }

    #[test]
    fn test_artifact_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 14).unwrap();
        assert_eq!(
            artifact_file_name("real_estate_summary", date),
            "real_estate_summary_20240714.json"
        );
    }

    #[test]
    fn test_progress_line_prefix() {
        let line = progress_line("Running pipeline for 2024-01-01");
        assert!(line.starts_with(PROGRESS_TAG));
        assert!(line.ends_with("Running pipeline for 2024-01-01"));
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(
            strip_scheme("https://jsonplaceholder.typicode.com/posts"),
            "jsonplaceholder.typicode.com/posts"
        );
        assert_eq!(strip_scheme("http://localhost:8080/a"), "localhost:8080/a");
        assert_eq!(strip_scheme("example.org/data"), "example.org/data");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(3.0)), "3.00");
        assert_eq!(format_optional(Some(66.666)), "66.67");
        assert_eq!(format_optional(None), "n/a");
    }
}
