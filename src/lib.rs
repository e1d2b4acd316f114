#[macro_use]
extern crate tracing;

mod app;
mod errors;
mod input;
mod logging;
pub mod render;

pub use app::App;
pub use errors::init_errors;
pub use logging::init_logging;
