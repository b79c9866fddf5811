use crate::config::Config;
use anyhow::Context;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;

/// Installs a file logger when `WISH_LOG` names one. Without it the `log`
/// macros stay no-ops, so the terminal only ever shows command output and the
/// fixed diagnostic.
pub fn init(config: &Config) -> anyhow::Result<bool> {
    let Some(path) = &config.log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(log::LevelFilter::Off)
        .build();

    WriteLogger::init(config.log_level, log_config, file)
        .context("install logger")?;
    log::debug!("logging to {} at {}", path.display(), config.log_level);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_log_file_installs_nothing() {
        assert!(!init(&Config::default()).unwrap());
    }

    #[test]
    fn unopenable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            log_file: Some(dir.path().join("missing").join("wish.log")),
            ..Config::default()
        };
        assert!(init(&config).is_err());
    }
}
