#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod view_mode;

use app_config::AppConfig;
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::Args;
use color_eyre::Result;
use eyre::{
    bail,
    Context as _,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};
pub use view_mode::{
    ViewMode,
    ViewModeIter,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub app_config: AppConfig,
    pub base_url: url::Url,
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_file: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");
const CONFIG_FILE_NAME: &str = "config.yaml";

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        cache.insert("base_url".to_string(), self.base_url.to_string().into());
        cache.insert("debounce_ms".to_string(), self.debounce_ms.into());
        cache.insert("poll_interval_ms".to_string(), self.poll_interval_ms.into());
        cache.insert("request_timeout_ms".to_string(), self.request_timeout_ms.into());
        cache.insert("view_mode".to_string(), self.view_mode.to_string().into());
        if let Some(path) = &self.fallback_file {
            cache.insert("fallback_file".to_string(), path.display().to_string().into());
        }
        Ok(cache)
    }
}

impl Config {
    /// Layers the built-in defaults, `config.yaml` from the config directory and the command line
    /// arguments, in that order of precedence.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::with_config_dir(args, get_config_dir())
    }

    pub fn with_config_dir(args: Args, config_dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let config_dir = config_dir.as_ref();
        let data_dir = get_data_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        builder = builder.add_source(Config::default());

        let config_files = [(CONFIG_FILE_NAME, config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        if !matches!(self.base_url.scheme(), "http" | "https") {
            bail!("base_url must be an http(s) URL, got {}", self.base_url);
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    pub fn save(&self) -> Result<()> {
        let path = self.config_dir().join(CONFIG_FILE_NAME);
        let content = self.to_yaml_diff()?;
        std::fs::create_dir_all(self.config_dir()).context("Failed to create config directory")?;
        std::fs::write(&path, content).wrap_err_with(|| format!("Failed to write config to {:?}", path))?;
        info!(?path, "Saved configuration");
        Ok(())
    }

    /// Only the settings that differ from the defaults end up in the config file.
    fn to_yaml_diff(&self) -> Result<String> {
        let serde_yml::Value::Mapping(mut current) =
            serde_yml::to_value(self).context("Failed to serialize config")?
        else {
            bail!("Config did not serialize to a mapping");
        };
        let serde_yml::Value::Mapping(default) =
            serde_yml::to_value(Self::default()).context("Failed to serialize default config")?
        else {
            bail!("Default config did not serialize to a mapping");
        };

        current.retain(|key, value| default.get(key) != Some(&*value));
        serde_yml::to_string(&current).context("Failed to serialize config")
    }
}
