//! Reshapes the flat metric keyspace into per-city groups.

use crate::{
    classifier::{
        self,
        Severity,
    },
    key::MetricKey,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Full point-in-time mapping of metric keys to their raw values.
///
/// Keeps the order the backend sent the keys in, which is the order of metrics inside a city group.
pub type RawSnapshot = IndexMap<String, String>;

/// City name to its group, ordered by city name.
pub type CityGroups = BTreeMap<String, CityGroup>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedMetric {
    pub metric_name: String,
    pub display_name: String,
    pub raw_value: String,
    pub unit: &'static str,
    pub icon: &'static str,
    pub severity: Severity,
}

impl ClassifiedMetric {
    pub fn new(metric_name: &str, raw_value: &str) -> Self {
        let descriptor = classifier::describe(metric_name);
        Self {
            metric_name: metric_name.to_string(),
            display_name: classifier::display_name(metric_name),
            raw_value: raw_value.to_string(),
            unit: descriptor.unit,
            icon: descriptor.icon,
            severity: classifier::severity(metric_name, raw_value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityGroup {
    pub city_name: String,
    /// In order of first appearance while scanning the snapshot.
    pub metrics: Vec<ClassifiedMetric>,
}

/// Groups every parseable key by city and classifies its value. Keys that are not
/// `<namespace>:<metric>:<city>` are skipped.
///
/// Group membership never depends on the iteration order of `snapshot`; the order of metrics within
/// a group is the order in which they were traversed.
pub fn aggregate<'a, I>(snapshot: I) -> CityGroups
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut cities = CityGroups::new();
    let mut skipped = 0usize;

    for (key, value) in snapshot {
        let Some(parsed) = MetricKey::parse(key) else {
            trace!(key, "Skipping unparseable metric key");
            skipped += 1;
            continue;
        };
        if !classifier::is_known(parsed.metric_name) {
            trace!(key, "Unknown metric, classifying generically");
        }

        cities
            .entry(parsed.city_name.to_string())
            .or_insert_with(|| CityGroup {
                city_name: parsed.city_name.to_string(),
                metrics: Vec::new(),
            })
            .metrics
            .push(ClassifiedMetric::new(parsed.metric_name, value));
    }

    if skipped > 0 {
        debug!(skipped, cities = cities.len(), "Aggregated snapshot with unparseable keys");
    }

    cities
}
