use city_pulse_config::ViewMode;
use strum::Display;

/// A line typed into the dashboard's stdin.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Input {
    Retry,
    ViewMode(ViewMode),
    ToggleViewMode,
    Redraw,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "commands: [r]etry  [g]rid  [l]ist  [t]oggle view  [h]elp  [q]uit";

impl Input {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let input = match line.trim().to_ascii_lowercase().as_str() {
            "" => Self::Redraw,
            "r" | "retry" => Self::Retry,
            "g" | "grid" => Self::ViewMode(ViewMode::Grid),
            "l" | "list" => Self::ViewMode(ViewMode::List),
            "t" | "toggle" => Self::ToggleViewMode,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return None,
        };
        Some(input)
    }
}
