//! Metric registry and the severity policy used for status coloring.
//!
//! Both are closed tables: supporting another metric means adding a row, the lookup functions stay
//! untouched. Names missing from a table get the generic descriptor and the default rule.

use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
};

/// Severity band of a metric value, which the presentation layer maps to a color.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Nominal,
    Info,
    Caution,
    Warning,
    Critical,
    /// The value is not numeric.
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub unit: &'static str,
    pub icon: &'static str,
}

const GENERIC: MetricDescriptor = MetricDescriptor { unit: "", icon: "generic" };

const REGISTRY: &[(&str, MetricDescriptor)] = &[
    ("temperature", MetricDescriptor { unit: "°C", icon: "thermometer" }),
    ("humidity", MetricDescriptor { unit: "%", icon: "droplet" }),
    ("air_quality", MetricDescriptor { unit: "AQI", icon: "wind" }),
    ("energy_consumption", MetricDescriptor { unit: "kWh", icon: "zap" }),
    ("traffic_density", MetricDescriptor { unit: "%", icon: "car" }),
    ("waste_level", MetricDescriptor { unit: "%", icon: "trash" }),
    ("water_quality", MetricDescriptor { unit: "pH", icon: "waves" }),
    ("noise_level", MetricDescriptor { unit: "dB", icon: "volume" }),
];

/// Bands are checked in order with a strict greater-than; the first match wins and a value that
/// matches none of them gets `otherwise`.
struct SeverityRule {
    bands: &'static [(f64, Severity)],
    otherwise: Severity,
}

const DEFAULT_RULE: SeverityRule = SeverityRule {
    bands: &[(50.0, Severity::Critical), (30.0, Severity::Warning)],
    otherwise: Severity::Nominal,
};

const RULES: &[(&str, SeverityRule)] = &[
    (
        "temperature",
        SeverityRule {
            bands: &[(30.0, Severity::Critical), (20.0, Severity::Warning)],
            otherwise: Severity::Nominal,
        },
    ),
    (
        "humidity",
        SeverityRule {
            bands: &[(80.0, Severity::Info), (50.0, Severity::Nominal)],
            otherwise: Severity::Caution,
        },
    ),
    (
        "air_quality",
        SeverityRule {
            bands: &[(150.0, Severity::Critical), (100.0, Severity::Warning)],
            otherwise: Severity::Nominal,
        },
    ),
];

impl SeverityRule {
    fn apply(&self, value: f64) -> Severity {
        self.bands
            .iter()
            .find(|(threshold, _)| value > *threshold)
            .map(|(_, severity)| *severity)
            .unwrap_or(self.otherwise)
    }
}

/// Unit and icon for a metric name.
pub fn describe(metric_name: &str) -> MetricDescriptor {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == metric_name)
        .map(|(_, descriptor)| *descriptor)
        .unwrap_or(GENERIC)
}

/// Whether the metric name is part of the registry.
pub fn is_known(metric_name: &str) -> bool {
    REGISTRY.iter().any(|(name, _)| *name == metric_name)
}

pub fn severity(metric_name: &str, raw_value: &str) -> Severity {
    let Ok(value) = raw_value.trim().parse::<f64>() else {
        return Severity::Neutral;
    };
    RULES
        .iter()
        .find(|(name, _)| *name == metric_name)
        .map(|(_, rule)| rule)
        .unwrap_or(&DEFAULT_RULE)
        .apply(value)
}

/// `air_quality` -> `Air Quality`
pub fn display_name(metric_name: &str) -> String {
    metric_name
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_bands() {
        assert_eq!(severity("temperature", "31"), Severity::Critical);
        assert_eq!(severity("temperature", "25"), Severity::Warning);
        assert_eq!(severity("temperature", "10"), Severity::Nominal);
        assert_eq!(severity("temperature", "abc"), Severity::Neutral);
    }

    #[test]
    fn boundaries_fall_to_the_next_band() {
        assert_eq!(severity("temperature", "30"), Severity::Warning);
        assert_eq!(severity("temperature", "20"), Severity::Nominal);
        assert_eq!(severity("humidity", "80"), Severity::Nominal);
        assert_eq!(severity("humidity", "50"), Severity::Caution);
        assert_eq!(severity("air_quality", "150"), Severity::Warning);
        assert_eq!(severity("air_quality", "100"), Severity::Nominal);
        assert_eq!(severity("noise_level", "50"), Severity::Warning);
        assert_eq!(severity("noise_level", "30"), Severity::Nominal);
    }

    #[test]
    fn humidity_bands() {
        assert_eq!(severity("humidity", "85"), Severity::Info);
        assert_eq!(severity("humidity", "65"), Severity::Nominal);
        assert_eq!(severity("humidity", "20"), Severity::Caution);
    }

    #[test]
    fn air_quality_bands() {
        assert_eq!(severity("air_quality", "151"), Severity::Critical);
        assert_eq!(severity("air_quality", "101"), Severity::Warning);
        assert_eq!(severity("air_quality", "45"), Severity::Nominal);
    }

    #[test]
    fn default_rule_applies_to_unknown_and_other_known_metrics() {
        assert_eq!(severity("unknown_metric", "60"), Severity::Critical);
        assert_eq!(severity("unknown_metric", "40"), Severity::Warning);
        assert_eq!(severity("unknown_metric", "10"), Severity::Nominal);
        assert_eq!(severity("waste_level", "72"), Severity::Critical);
        assert_eq!(severity("energy_consumption", "-5"), Severity::Nominal);
    }

    #[test]
    fn numeric_parsing_is_lenient_about_whitespace_only() {
        assert_eq!(severity("temperature", " 31.5 "), Severity::Critical);
        assert_eq!(severity("temperature", "31°C"), Severity::Neutral);
        assert_eq!(severity("temperature", ""), Severity::Neutral);
        assert_eq!(severity("temperature", "NaN"), Severity::Nominal);
    }

    #[test]
    fn registry_lookup() {
        assert_eq!(describe("temperature"), MetricDescriptor { unit: "°C", icon: "thermometer" });
        assert_eq!(describe("noise_level").unit, "dB");
        assert_eq!(describe("solar_output"), GENERIC);
        assert!(is_known("water_quality"));
        assert!(!is_known("solar_output"));
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("air_quality"), "Air Quality");
        assert_eq!(display_name("temperature"), "Temperature");
        assert_eq!(display_name("energy_consumption"), "Energy Consumption");
        assert_eq!(display_name("ünits_ok"), "Ünits Ok");
        assert_eq!(display_name(""), "");
    }
}
