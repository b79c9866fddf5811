use log::LevelFilter;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

pub const LOG_FILE_VAR: &str = "WISH_LOG";
pub const LOG_LEVEL_VAR: &str = "WISH_LOG_LEVEL";

/// Everything the interpreter takes from its environment at startup. Only
/// `PATH` changes how commands run; the other two variables steer the
/// diagnostics log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Raw `PATH` value used to seed the search path.
    pub search_path: Option<OsString>,
    /// Diagnostics log, appended to. Nothing is logged when unset.
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_path: None,
            log_file: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var_os(key))
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<OsString>) -> Self {
        let defaults = Self::default();

        Self {
            search_path: var("PATH"),
            log_file: var(LOG_FILE_VAR)
                .filter(|path| !path.as_encoded_bytes().trim_ascii().is_empty())
                .map(PathBuf::from),
            log_level: var(LOG_LEVEL_VAR)
                .and_then(|level| level.to_str()?.trim().parse().ok())
                .unwrap_or(defaults.log_level),
        }
    }
}
