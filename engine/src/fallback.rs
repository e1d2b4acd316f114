//! Sample dataset shown when the initial snapshot fetch fails, so the dashboard never starts
//! blank. The state carries [`DataOrigin::Fallback`](crate::DataOrigin::Fallback) while it is on
//! display.

use crate::aggregator::RawSnapshot;
use eyre::{
    Context as _,
    Result,
};
use std::path::Path;

const BUILTIN: &[(&str, &str)] = &[
    ("smartcity:temperature:NewYork", "22.5"),
    ("smartcity:humidity:NewYork", "65"),
    ("smartcity:air_quality:NewYork", "45"),
    ("smartcity:temperature:London", "15.2"),
    ("smartcity:humidity:London", "78"),
    ("smartcity:air_quality:London", "32"),
    ("smartcity:temperature:Tokyo", "28.1"),
    ("smartcity:humidity:Tokyo", "70"),
    ("smartcity:air_quality:Tokyo", "55"),
];

pub fn builtin() -> RawSnapshot {
    BUILTIN
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Reads a replacement dataset: a JSON object of metric keys to string values.
pub fn load(path: impl AsRef<Path>) -> Result<RawSnapshot> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read fallback dataset {path:?}"))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Failed to parse fallback dataset {path:?}"))
}
