//! Composite metric keys of the form `<namespace>:<metric>:<city>`.

const SEPARATOR: char = ':';

/// The parts of a metric key the dashboard cares about. The namespace is only checked for
/// presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricKey<'a> {
    pub metric_name: &'a str,
    pub city_name: &'a str,
}

impl<'a> MetricKey<'a> {
    /// Returns `None` for anything that is not exactly three non-empty segments.
    pub fn parse(key: &'a str) -> Option<Self> {
        let mut segments = key.split(SEPARATOR);
        let namespace = segments.next()?;
        let metric_name = segments.next()?;
        let city_name = segments.next()?;
        if segments.next().is_some() {
            return None;
        }
        if namespace.is_empty() || metric_name.is_empty() || city_name.is_empty() {
            return None;
        }
        Some(Self { metric_name, city_name })
    }
}
