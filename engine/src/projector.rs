//! Render-ready summary of a [`DashboardState`].

use crate::{
    classifier::Severity,
    state::{
        DashboardState,
        DataOrigin,
        SyncStatus,
    },
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub loading: bool,
    pub city_count: usize,
    pub metric_count: usize,
    /// No city groups after aggregation. A loaded-but-empty snapshot is displayable, this is not a
    /// loading indicator.
    pub is_empty: bool,
    pub status: SyncStatus,
    pub origin: DataOrigin,
    pub severity_counts: BTreeMap<Severity, usize>,
}

pub fn project(state: &DashboardState) -> ViewModel {
    let mut severity_counts = BTreeMap::new();
    for metric in state.cities.values().flat_map(|group| group.metrics.iter()) {
        *severity_counts.entry(metric.severity).or_insert(0) += 1;
    }

    ViewModel {
        loading: state.loading,
        city_count: state.cities.len(),
        metric_count: state.cities.values().map(|group| group.metrics.len()).sum(),
        is_empty: state.cities.is_empty(),
        status: state.status,
        origin: state.origin,
        severity_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{
        aggregate,
        RawSnapshot,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_cities_and_metrics() {
        let raw: RawSnapshot = [
            ("smartcity:temperature:NewYork", "22.5"),
            ("smartcity:humidity:NewYork", "65"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let state = DashboardState {
            loading: false,
            cities: aggregate(&raw),
            ..Default::default()
        };

        let view = project(&state);
        assert_eq!(view.city_count, 1);
        assert_eq!(view.metric_count, 2);
        assert!(!view.is_empty);
        assert!(!view.loading);
        assert_eq!(
            view.severity_counts,
            BTreeMap::from([(Severity::Nominal, 1), (Severity::Warning, 1)])
        );
    }

    #[test]
    fn loaded_empty_is_not_loading() {
        let state = DashboardState {
            loading: false,
            ..Default::default()
        };
        let view = project(&state);
        assert!(view.is_empty);
        assert!(!view.loading);
        assert_eq!(view.metric_count, 0);
    }

    #[test]
    fn initial_state_is_loading_and_empty() {
        let view = project(&DashboardState::default());
        assert!(view.loading);
        assert!(view.is_empty);
        assert_eq!(view.status, SyncStatus::Idle);
        assert_eq!(view.origin, DataOrigin::None);
    }
}
