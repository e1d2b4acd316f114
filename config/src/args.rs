use crate::ViewMode;
use clap::Parser;
use std::path::PathBuf;

/// Live city metrics dashboard
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Base URL of the metrics backend, overrides the stored configuration.
    #[clap(long, value_name = "URL", env = "CITY_PULSE_BASE_URL")]
    pub base_url: Option<String>,

    /// Quiet period after the last push notification before a refresh is fetched.
    #[clap(long, value_name = "MILLISECONDS")]
    pub debounce_ms: Option<u64>,

    /// Interval between snapshot fetches once the push channel failed.
    #[clap(long, value_name = "MILLISECONDS")]
    pub poll_interval_ms: Option<u64>,

    /// Timeout for a single snapshot request.
    #[clap(long, value_name = "MILLISECONDS")]
    pub request_timeout_ms: Option<u64>,

    /// Initial layout of the dashboard.
    #[clap(long, value_name = "MODE")]
    pub view_mode: Option<ViewMode>,

    /// JSON file with a flat key/value snapshot that replaces the built-in fallback dataset.
    #[clap(long, value_name = "FILE")]
    pub fallback_file: Option<PathBuf>,

    /// Persist the given overrides to the config file.
    #[clap(long, action)]
    pub save: bool,

    /// Enables debug logging.
    #[clap(long, action)]
    pub debug: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(base_url) = &self.base_url {
                cache.insert("base_url".to_string(), base_url.clone().into());
            }
            if let Some(value) = self.debounce_ms {
                cache.insert("debounce_ms".to_string(), value.into());
            }
            if let Some(value) = self.poll_interval_ms {
                cache.insert("poll_interval_ms".to_string(), value.into());
            }
            if let Some(value) = self.request_timeout_ms {
                cache.insert("request_timeout_ms".to_string(), value.into());
            }
            if let Some(view_mode) = self.view_mode {
                cache.insert("view_mode".to_string(), view_mode.to_string().into());
            }
            if let Some(path) = &self.fallback_file {
                cache.insert("fallback_file".to_string(), path.display().to_string().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "{}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        clap::crate_version!()
    )
}
