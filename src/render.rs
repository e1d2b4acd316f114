//! Console presentation of the dashboard state.

use city_pulse_config::ViewMode;
use city_pulse_engine::{
    project,
    ClassifiedMetric,
    DashboardState,
    Severity,
    SyncStatus,
    ViewModel,
};
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};

pub fn render(state: &DashboardState) -> String {
    let view = project(state);
    let mut output = summary(state, &view);
    output.push('\n');

    if view.loading && view.is_empty {
        output.push_str("Loading metrics...\n");
        return output;
    }
    if view.is_empty {
        output.push_str("No metrics available. Type `r` to retry.\n");
        return output;
    }

    let table = match state.view_mode {
        ViewMode::Grid => grid(state),
        ViewMode::List => list(state),
    };
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

fn summary(state: &DashboardState, view: &ViewModel) -> String {
    let mut lines = Vec::new();
    if state.is_demo() {
        lines.push("DEMO DATA: the metrics backend is unreachable, showing built-in sample values".to_string());
    }

    let updated = state
        .last_updated
        .map(|at| at.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    lines.push(format!(
        "City Pulse | {} | {} cities | {} metrics | updated {updated}",
        status_label(view.status),
        view.city_count,
        view.metric_count,
    ));

    if !view.severity_counts.is_empty() {
        lines.push(
            view.severity_counts
                .iter()
                .map(|(severity, count)| format!("{severity}: {count}"))
                .collect::<Vec<_>>()
                .join("  "),
        );
    }
    lines.join("\n")
}

fn status_label(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Idle => "starting",
        SyncStatus::Loading => "loading",
        SyncStatus::Live => "live",
        SyncStatus::Degraded => "polling",
    }
}

/// One column per city card.
fn grid(state: &DashboardState) -> Table {
    let mut table = new_table();
    table.set_header(
        state
            .cities
            .keys()
            .map(|city| Cell::new(city).add_attribute(Attribute::Bold).fg(Color::Cyan)),
    );

    let rows = state
        .cities
        .values()
        .map(|group| group.metrics.len())
        .max()
        .unwrap_or_default();
    for row in 0..rows {
        table.add_row(state.cities.values().map(|group| match group.metrics.get(row) {
            Some(metric) => Cell::new(format!(
                "{} {}: {}",
                icon_glyph(metric.icon),
                metric.display_name,
                value_with_unit(metric)
            ))
            .fg(severity_color(metric.severity)),
            None => Cell::new(""),
        }));
    }
    table
}

/// One row per metric.
fn list(state: &DashboardState) -> Table {
    let mut table = new_table();
    table.set_header(
        ["City", "Metric", "Value", "Status"]
            .into_iter()
            .map(|title| Cell::new(title).add_attribute(Attribute::Bold)),
    );

    for group in state.cities.values() {
        for metric in &group.metrics {
            table.add_row(vec![
                Cell::new(&group.city_name),
                Cell::new(format!("{} {}", icon_glyph(metric.icon), metric.display_name)),
                Cell::new(value_with_unit(metric)),
                Cell::new(metric.severity).fg(severity_color(metric.severity)),
            ]);
        }
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn value_with_unit(metric: &ClassifiedMetric) -> String {
    if metric.unit.is_empty() {
        metric.raw_value.clone()
    } else {
        format!("{} {}", metric.raw_value, metric.unit)
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Nominal => Color::Green,
        Severity::Info => Color::Blue,
        Severity::Caution => Color::DarkYellow,
        Severity::Warning => Color::Yellow,
        Severity::Critical => Color::Red,
        Severity::Neutral => Color::Grey,
    }
}

fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "thermometer" => "🌡",
        "droplet" => "💧",
        "wind" => "🌬",
        "zap" => "⚡",
        "car" => "🚗",
        "trash" => "🗑",
        "waves" => "🌊",
        "volume" => "🔊",
        _ => "•",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_pulse_engine::{
        aggregate,
        fallback,
        DataOrigin,
    };

    fn loaded(view_mode: ViewMode, origin: DataOrigin) -> DashboardState {
        DashboardState {
            loading: false,
            cities: aggregate(&fallback::builtin()),
            view_mode,
            status: SyncStatus::Degraded,
            origin,
            last_updated: None,
        }
    }

    #[test]
    fn loading_state_shows_placeholder() {
        let output = render(&DashboardState::default());
        assert!(output.contains("Loading metrics"));
    }

    #[test]
    fn loaded_empty_state_offers_retry() {
        let state = DashboardState {
            loading: false,
            ..Default::default()
        };
        let output = render(&state);
        assert!(output.contains("No metrics available"));
        assert!(!output.contains("Loading"));
    }

    #[test]
    fn fallback_data_is_marked_as_demo() {
        let output = render(&loaded(ViewMode::Grid, DataOrigin::Fallback));
        assert!(output.starts_with("DEMO DATA"));
        assert!(output.contains("3 cities | 9 metrics"));

        let output = render(&loaded(ViewMode::Grid, DataOrigin::Backend));
        assert!(!output.contains("DEMO DATA"));
    }

    #[test]
    fn list_view_has_a_row_per_metric() {
        let output = render(&loaded(ViewMode::List, DataOrigin::Backend));
        assert!(output.contains("City"));
        assert_eq!(output.matches("Tokyo").count(), 3);
        assert!(output.contains("22.5 °C"));
        assert!(output.contains("Air Quality"));
    }

    #[test]
    fn grid_view_has_a_column_per_city() {
        let output = render(&loaded(ViewMode::Grid, DataOrigin::Backend));
        assert_eq!(output.matches("Tokyo").count(), 1);
        assert!(output.contains("Humidity: 78 %"));
    }
}
