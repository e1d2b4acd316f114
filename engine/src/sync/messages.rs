use city_pulse_config::ViewMode;
use derive_more::Display;

/// Requests from the presentation layer to the sync task.
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
pub enum SyncCommand {
    /// Re-enter the loading path regardless of the current state.
    Retry,
    #[display("SetViewMode({_0})")]
    SetViewMode(ViewMode),
    ToggleViewMode,
}
