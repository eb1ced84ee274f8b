use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// One priced property transaction read from the input CSV.
///
/// Field names follow the domain; the serde renames match the CSV header
/// `transaction_id,date,price,city,district,area_m2,rooms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "transaction_id")]
    pub id: i64,
    /// ISO-8601 calendar date, kept as written in the source.
    pub date: String,
    pub price: f64,
    #[serde(rename = "city")]
    pub location_category: String,
    #[serde(rename = "district")]
    pub subcategory: String,
    #[serde(rename = "area_m2")]
    pub area: f64,
    #[serde(rename = "rooms")]
    pub room_count: i64,
}

/// Rollup statistics for one subcategory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub record_count: u64,
    #[serde(rename = "total_price")]
    pub total_value: f64,
    #[serde(rename = "total_area_m2")]
    pub total_area: f64,
    #[serde(rename = "avg_price")]
    pub avg_value: Option<f64>,
    #[serde(rename = "avg_price_per_m2")]
    pub avg_value_per_area: Option<f64>,
}

// ── SubcategoryStats ──────────────────────────────────────────────────────────

/// Per-subcategory stats keyed by name, iterated in insertion order.
///
/// Serializes as a JSON object whose keys keep the order in which each
/// subcategory was first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubcategoryStats {
    entries: Vec<(String, GroupStats)>,
    index: HashMap<String, usize>,
}

impl SubcategoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the stats for `key`. A replaced key keeps its
    /// original position.
    pub fn insert(&mut self, key: impl Into<String>, stats: GroupStats) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = stats,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, stats));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&GroupStats> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subcategory names in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupStats)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, GroupStats)> for SubcategoryStats {
    fn from_iter<I: IntoIterator<Item = (String, GroupStats)>>(iter: I) -> Self {
        let mut stats = Self::new();
        for (key, value) in iter {
            stats.insert(key, value);
        }
        stats
    }
}

impl Serialize for SubcategoryStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SubcategoryStats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatsVisitor;

        impl<'de> Visitor<'de> for StatsVisitor {
            type Value = SubcategoryStats;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of subcategory name to group stats")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut stats = SubcategoryStats::new();
                while let Some((key, value)) = access.next_entry::<String, GroupStats>()? {
                    stats.insert(key, value);
                }
                Ok(stats)
            }
        }

        deserializer.deserialize_map(StatsVisitor)
    }
}

// ── SummaryReport ─────────────────────────────────────────────────────────────

/// Whole-dataset summary written once per CSV pipeline run.
///
/// `record_count == 0` exactly when every average is `None` and
/// `by_subcategory` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub record_count: u64,
    #[serde(rename = "avg_price")]
    pub avg_value: Option<f64>,
    #[serde(rename = "avg_price_per_m2")]
    pub avg_value_per_area: Option<f64>,
    #[serde(rename = "avg_area_m2")]
    pub avg_area: Option<f64>,
    /// Location category of the first transaction seen.
    #[serde(rename = "city")]
    pub sample_category: Option<String>,
    #[serde(rename = "by_district")]
    pub by_subcategory: SubcategoryStats,
}

impl SummaryReport {
    /// The report produced for a dataset with no valid transactions.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

// ── HTTP variant ──────────────────────────────────────────────────────────────

/// A fetched payload as persisted to the raw snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    /// ISO-8601 UTC timestamp of the fetch.
    pub fetched_at: String,
    /// Response body, unmodified.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawPayload {
    /// Number of records carried by `data`.
    ///
    /// Arrays count their elements and objects their keys; `null` is empty
    /// and any other scalar counts as a single record.
    pub fn record_count(&self) -> usize {
        match &self.data {
            serde_json::Value::Array(items) => items.len(),
            serde_json::Value::Object(map) => map.len(),
            serde_json::Value::Null => 0,
            _ => 1,
        }
    }
}

/// Report written by the HTTP variant: a record count, no per-field stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchSummary {
    pub fetched_at: String,
    pub record_count: usize,
    pub source: String,
}
