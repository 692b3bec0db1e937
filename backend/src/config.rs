//! Application configuration.
//!
//! Settings come from an optional `dienynas.toml` and are then overridden
//! by environment variables. Every field has a default, so an empty file
//! (or none at all) is a working configuration.

use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{CivilZone, DEFAULT_TIMEZONE};
use crate::services::{DisciplineTable, LessonInfoService, WindowPolicy};
use crate::sources::timetable::{DEFAULT_TIMETABLE_NUMBER, DEFAULT_TIMETABLE_URL};
use crate::sources::{
    FileLessonSource, FileTimetableFetcher, HttpTimetableFetcher, LessonSource, TimetableEndpoint,
    TimetableFetcher, TimetableProvider, UnconfiguredLessonSource,
};
use crate::store::{CacheFactory, CacheSettings, CacheType};

/// Configuration file name searched for in standard locations.
pub const CONFIG_FILE_NAME: &str = "dienynas.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("No dienynas.toml found in standard locations")]
    NotFound,

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub timetable: TimetableSettings,
    #[serde(default)]
    pub cache: CacheFileSettings,
    #[serde(default)]
    pub lessons: LessonSettings,
    /// Extra or replacement diary → timetable discipline names.
    #[serde(default)]
    pub disciplines: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Class short name used when a request does not name one.
    #[serde(default = "default_class_id")]
    pub class_id: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_window_back_days")]
    pub window_back_days: i64,
    #[serde(default = "default_window_ahead_days")]
    pub window_ahead_days: i64,
    #[serde(default = "default_fetch_deadline_secs")]
    pub fetch_deadline_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSettings {
    #[serde(default = "default_timetable_url")]
    pub url: String,
    #[serde(default = "default_timetable_number")]
    pub timetable_number: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Read the document from this file instead of downloading it.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFileSettings {
    #[serde(rename = "type", default = "default_cache_type")]
    pub cache_type: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Entry lifetime; 0 keeps entries forever.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSettings {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

fn default_class_id() -> String {
    "5d".to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_window_back_days() -> i64 {
    30
}

fn default_window_ahead_days() -> i64 {
    7
}

fn default_fetch_deadline_secs() -> u64 {
    60
}

fn default_timetable_url() -> String {
    DEFAULT_TIMETABLE_URL.to_string()
}

fn default_timetable_number() -> String {
    DEFAULT_TIMETABLE_NUMBER.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_cache_type() -> String {
    CacheType::Memory.as_str().to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            class_id: default_class_id(),
            timezone: default_timezone(),
            window_back_days: default_window_back_days(),
            window_ahead_days: default_window_ahead_days(),
            fetch_deadline_secs: default_fetch_deadline_secs(),
        }
    }
}

impl Default for TimetableSettings {
    fn default() -> Self {
        Self {
            url: default_timetable_url(),
            timetable_number: default_timetable_number(),
            request_timeout_secs: default_request_timeout_secs(),
            file: None,
        }
    }
}

impl Default for CacheFileSettings {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            dir: None,
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `dienynas.toml` from the first standard location that has one.
    ///
    /// Searches the current directory, `backend/`, then the parent directory.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            Path::new("backend").join(CONFIG_FILE_NAME),
            Path::new("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                tracing::info!(path = %path.display(), "loading configuration file");
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// File from `DIENYNAS_CONFIG` or a standard location (defaults when
    /// there is none), with environment overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("DIENYNAS_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => match Self::from_default_location() {
                Ok(config) => config,
                Err(ConfigError::NotFound) => Self::default(),
                Err(e) => return Err(e),
            },
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override settings from `HOST`, `PORT`, `CLASS_ID`, `TIMEZONE`,
    /// `CACHE_TYPE`, `CACHE_DIR`, `CACHE_TTL_SECS`, `TIMETABLE_URL`,
    /// `TIMETABLE_FILE` and `LESSONS_FILE`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(host) = env_value("HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_value("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", format!("not a port number: {port}")))?;
        }
        if let Some(class_id) = env_value("CLASS_ID") {
            self.schedule.class_id = class_id;
        }
        if let Some(timezone) = env_value("TIMEZONE") {
            self.schedule.timezone = timezone;
        }
        if let Some(cache_type) = env_value("CACHE_TYPE") {
            self.cache.cache_type = cache_type;
        }
        if let Some(dir) = env_value("CACHE_DIR") {
            self.cache.dir = Some(PathBuf::from(dir));
        }
        if let Some(ttl) = env_value("CACHE_TTL_SECS") {
            self.cache.ttl_secs = ttl.parse().map_err(|_| {
                ConfigError::invalid("CACHE_TTL_SECS", format!("not a number of seconds: {ttl}"))
            })?;
        }
        if let Some(url) = env_value("TIMETABLE_URL") {
            self.timetable.url = url;
        }
        if let Some(file) = env_value("TIMETABLE_FILE") {
            self.timetable.file = Some(PathBuf::from(file));
        }
        if let Some(file) = env_value("LESSONS_FILE") {
            self.lessons.file = Some(PathBuf::from(file));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::invalid("server.host", format!("{e}")))
    }

    pub fn zone(&self) -> Result<CivilZone, ConfigError> {
        CivilZone::parse(&self.schedule.timezone)
            .map_err(|e| ConfigError::invalid("schedule.timezone", e.to_string()))
    }

    pub fn window_policy(&self) -> Result<WindowPolicy, ConfigError> {
        if self.schedule.window_back_days <= 0 || self.schedule.window_ahead_days < 0 {
            return Err(ConfigError::invalid(
                "schedule.window_back_days",
                "window must span at least one day and end at or after now",
            ));
        }
        Ok(WindowPolicy {
            back: chrono::Duration::days(self.schedule.window_back_days),
            ahead: chrono::Duration::days(self.schedule.window_ahead_days),
        })
    }

    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_secs(self.schedule.fetch_deadline_secs)
    }

    pub fn cache_settings(&self) -> Result<CacheSettings, ConfigError> {
        let cache_type: CacheType = self
            .cache
            .cache_type
            .parse()
            .map_err(|e: String| ConfigError::invalid("cache.type", e))?;
        Ok(CacheSettings {
            cache_type,
            dir: self.cache.dir.clone(),
            ttl: (self.cache.ttl_secs > 0).then(|| Duration::from_secs(self.cache.ttl_secs)),
        })
    }

    pub fn endpoint(&self) -> TimetableEndpoint {
        TimetableEndpoint {
            url: self.timetable.url.clone(),
            timetable_number: self.timetable.timetable_number.clone(),
            timeout: Duration::from_secs(self.timetable.request_timeout_secs),
        }
    }

    /// Default discipline table with the configured entries applied on top.
    pub fn discipline_table(&self) -> DisciplineTable {
        DisciplineTable::default().with_overrides(
            self.disciplines
                .iter()
                .map(|(from, to)| (from.as_str(), to.as_str())),
        )
    }

    /// Wire up the lesson-info pipeline described by this configuration.
    pub fn build_service(&self) -> Result<LessonInfoService, ConfigError> {
        let cache = CacheFactory::create(&self.cache_settings()?)
            .map_err(|e| ConfigError::invalid("cache", e.to_string()))?;

        let fetcher: Arc<dyn TimetableFetcher> = match &self.timetable.file {
            Some(path) => Arc::new(FileTimetableFetcher::new(path)),
            None => Arc::new(
                HttpTimetableFetcher::new(self.endpoint())
                    .map_err(|e| ConfigError::invalid("timetable", e.to_string()))?,
            ),
        };
        tracing::info!(source = %fetcher.describe(), "timetable source configured");

        let lessons: Arc<dyn LessonSource> = match &self.lessons.file {
            Some(path) => Arc::new(FileLessonSource::new(path)),
            None => {
                tracing::warn!("no lesson source configured; /v1/lesson-info will be unavailable");
                Arc::new(UnconfiguredLessonSource)
            }
        };

        let provider = Arc::new(TimetableProvider::new(fetcher, cache));
        Ok(LessonInfoService::new(provider, lessons)
            .with_disciplines(self.discipline_table())
            .with_zone(self.zone()?)
            .with_window(self.window_policy()?)
            .with_fetch_deadline(self.fetch_deadline()))
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.schedule.class_id, "5d");
        assert_eq!(config.schedule.timezone, "Europe/Vilnius");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.ttl_secs, 3600);
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let config: AppConfig = toml::from_str(include_str!("../dienynas.example.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[schedule]
class_id = "6a"
window_back_days = 14
window_ahead_days = 3

[cache]
type = "file"
dir = "/var/cache/dienynas"
ttl_secs = 0

[disciplines]
"Fiz." = "Fizika"
"Tikyba" = "Tikyba"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
        assert_eq!(config.schedule.class_id, "6a");

        let window = config.window_policy().unwrap();
        assert_eq!(window.back, chrono::Duration::days(14));
        assert_eq!(window.ahead, chrono::Duration::days(3));

        let cache = config.cache_settings().unwrap();
        assert_eq!(cache.cache_type, CacheType::File);
        assert_eq!(cache.ttl, None);
        assert_eq!(cache.dir, Some(PathBuf::from("/var/cache/dienynas")));

        let table = config.discipline_table();
        assert_eq!(table.canonical("Fiz."), "Fizika");
        assert_eq!(table.canonical("Tikyba"), "Tikyba");
        assert_eq!(table.canonical("Lietuvių k."), "Lietuvių kalba ir literatūra");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = AppConfig::default();
        config.cache.cache_type = "redis".into();
        assert!(matches!(
            config.cache_settings(),
            Err(ConfigError::Invalid { .. })
        ));

        config.schedule.timezone = "Mars/Olympus".into();
        assert!(config.zone().is_err());

        config.schedule.window_back_days = 0;
        assert!(config.window_policy().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[schedule]\nclass_id = \"7b\"\n").unwrap();
        assert_eq!(AppConfig::from_file(&path).unwrap().schedule.class_id, "7b");

        fs::write(&path, "[schedule\n").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            AppConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
