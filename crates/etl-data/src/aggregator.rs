//! Summary statistics over loaded transactions.
//!
//! Whole-dataset averages plus a per-district rollup, grouped in the order
//! districts are first seen.

use std::collections::HashMap;

use etl_core::formatting::strip_scheme;
use etl_core::models::{
    FetchSummary, GroupStats, RawPayload, SubcategoryStats, SummaryReport, Transaction,
};

// ── GroupAccumulator ──────────────────────────────────────────────────────────

/// Running sums for one subcategory.
#[derive(Debug, Clone, Default)]
struct GroupAccumulator {
    record_count: u64,
    total_value: f64,
    total_area: f64,
}

impl GroupAccumulator {
    fn add(&mut self, txn: &Transaction) {
        self.record_count += 1;
        self.total_value += txn.price;
        self.total_area += txn.area;
    }

    fn finish(self) -> GroupStats {
        let avg_value = if self.record_count > 0 {
            Some(self.total_value / self.record_count as f64)
        } else {
            None
        };

        GroupStats {
            record_count: self.record_count,
            total_value: self.total_value,
            total_area: self.total_area,
            avg_value,
            avg_value_per_area: ratio(self.total_value, self.total_area),
        }
    }
}

/// `numerator / denominator`, or `None` unless the denominator is positive.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Summarize `transactions` into a [`SummaryReport`].
///
/// An empty slice yields [`SummaryReport::empty`].
pub fn summarize(transactions: &[Transaction]) -> SummaryReport {
    let Some(first) = transactions.first() else {
        return SummaryReport::empty();
    };

    let record_count = transactions.len() as u64;
    let mut total_value = 0.0;
    let mut total_area = 0.0;

    // `order` keeps groups in first-seen order; `slots` maps a key to its index.
    let mut order: Vec<(String, GroupAccumulator)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for txn in transactions {
        total_value += txn.price;
        total_area += txn.area;

        let slot = *slots.entry(txn.subcategory.as_str()).or_insert_with(|| {
            order.push((txn.subcategory.clone(), GroupAccumulator::default()));
            order.len() - 1
        });
        order[slot].1.add(txn);
    }

    let by_subcategory: SubcategoryStats = order
        .into_iter()
        .map(|(key, acc)| (key, acc.finish()))
        .collect();

    SummaryReport {
        record_count,
        avg_value: Some(total_value / record_count as f64),
        avg_value_per_area: ratio(total_value, total_area),
        avg_area: Some(total_area / record_count as f64),
        sample_category: Some(first.location_category.clone()),
        by_subcategory,
    }
}

/// Count the records of a fetched payload; no per-field aggregation.
///
/// `source_url` is recorded without its scheme.
pub fn summarize_payload(payload: &RawPayload, source_url: &str) -> FetchSummary {
    FetchSummary {
        fetched_at: payload.fetched_at.clone(),
        record_count: payload.record_count(),
        source: strip_scheme(source_url).to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn txn(id: i64, price: f64, area: f64, district: &str) -> Transaction {
        Transaction {
            id,
            date: "2024-01-15".to_string(),
            price,
            location_category: "Warsaw".to_string(),
            subcategory: district.to_string(),
            area,
            room_count: 2,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summarize_empty() {
        let report = summarize(&[]);
        assert_eq!(report.record_count, 0);
        assert!(report.avg_value.is_none());
        assert!(report.avg_value_per_area.is_none());
        assert!(report.avg_area.is_none());
        assert!(report.sample_category.is_none());
        assert!(report.by_subcategory.is_empty());
    }

    #[test]
    fn test_summarize_reference_scenario() {
        let txns = vec![
            txn(1, 100.0, 50.0, "A"),
            txn(2, 300.0, 50.0, "A"),
            txn(3, 200.0, 100.0, "B"),
        ];
        let report = summarize(&txns);

        assert_eq!(report.record_count, 3);
        assert_eq!(report.avg_value, Some(200.0));
        assert!(approx(report.avg_area.unwrap(), 200.0 / 3.0));
        assert_eq!(report.avg_value_per_area, Some(3.0));
        assert_eq!(report.sample_category.as_deref(), Some("Warsaw"));

        let a = report.by_subcategory.get("A").unwrap();
        assert_eq!(a.record_count, 2);
        assert_eq!(a.total_value, 400.0);
        assert_eq!(a.total_area, 100.0);
        assert_eq!(a.avg_value, Some(200.0));
        assert_eq!(a.avg_value_per_area, Some(4.0));

        let b = report.by_subcategory.get("B").unwrap();
        assert_eq!(b.record_count, 1);
        assert_eq!(b.avg_value, Some(200.0));
        assert_eq!(b.avg_value_per_area, Some(2.0));
    }

    #[test]
    fn test_summarize_group_counts_sum_to_total() {
        let txns = vec![
            txn(1, 10.0, 1.0, "Wola"),
            txn(2, 20.0, 2.0, "Ochota"),
            txn(3, 30.0, 3.0, "Wola"),
            txn(4, 40.0, 4.0, "Bemowo"),
            txn(5, 50.0, 5.0, "Ochota"),
        ];
        let report = summarize(&txns);

        let group_total: u64 = report.by_subcategory.iter().map(|(_, g)| g.record_count).sum();
        assert_eq!(group_total, report.record_count);

        let value_total: f64 = report.by_subcategory.iter().map(|(_, g)| g.total_value).sum();
        assert!(approx(value_total, 150.0));

        for (_, group) in report.by_subcategory.iter() {
            assert_eq!(
                group.avg_value,
                Some(group.total_value / group.record_count as f64)
            );
        }
    }

    #[test]
    fn test_summarize_groups_in_first_seen_order() {
        let txns = vec![
            txn(1, 1.0, 1.0, "Zoliborz"),
            txn(2, 1.0, 1.0, "Bielany"),
            txn(3, 1.0, 1.0, "Zoliborz"),
            txn(4, 1.0, 1.0, "Mokotów"),
        ];
        let report = summarize(&txns);
        let keys: Vec<&str> = report.by_subcategory.keys().collect();
        assert_eq!(keys, vec!["Zoliborz", "Bielany", "Mokotów"]);
    }

    #[test]
    fn test_summarize_zero_area_group_has_no_ratio() {
        let txns = vec![txn(1, 100.0, 0.0, "Empty"), txn(2, 200.0, 50.0, "Full")];
        let report = summarize(&txns);

        let empty = report.by_subcategory.get("Empty").unwrap();
        assert_eq!(empty.avg_value, Some(100.0));
        assert!(empty.avg_value_per_area.is_none());
        assert_eq!(report.avg_value_per_area, Some(6.0));
    }

    #[test]
    fn test_summarize_zero_total_area() {
        let txns = vec![txn(1, 100.0, 0.0, "A"), txn(2, 300.0, 0.0, "A")];
        let report = summarize(&txns);

        assert_eq!(report.avg_value, Some(200.0));
        assert_eq!(report.avg_area, Some(0.0));
        assert!(report.avg_value_per_area.is_none());
    }

    #[test]
    fn test_summarize_sample_category_is_first_seen() {
        let mut first = txn(1, 1.0, 1.0, "A");
        first.location_category = "Kraków".to_string();
        let txns = vec![first, txn(2, 1.0, 1.0, "A"), txn(3, 1.0, 1.0, "B")];

        let report = summarize(&txns);
        assert_eq!(report.sample_category.as_deref(), Some("Kraków"));
    }

    // ── summarize_payload ─────────────────────────────────────────────────────

    #[test]
    fn test_summarize_payload() {
        let payload = RawPayload {
            fetched_at: "2024-01-15T08:00:00.000000".to_string(),
            data: json!([{"id": 1}, {"id": 2}]),
        };
        let summary = summarize_payload(&payload, "https://jsonplaceholder.typicode.com/posts");

        assert_eq!(summary.fetched_at, "2024-01-15T08:00:00.000000");
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.source, "jsonplaceholder.typicode.com/posts");
    }
}
