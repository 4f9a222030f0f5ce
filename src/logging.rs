//! Logger Setup for the CLI
//!
//! Modules in this crate emit through the `log` macros and never install a
//! logger themselves. `avatarforge-cli` installs one `env_logger` writing to
//! stderr, keeping stdout for JSON results.

use log::LevelFilter;
use std::sync::Once;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directives such as `warn` or `avatarforge_core::tree=trace`.
    /// `None` falls back to `RUST_LOG`, then to `info`.
    pub directives: Option<String>,
    pub colors: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directives: None,
            colors: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// `--verbose` maps to `debug` for everything.
    pub fn verbose(verbose: bool) -> Self {
        Self {
            directives: verbose.then(|| LevelFilter::Debug.to_string().to_lowercase()),
            ..Self::default()
        }
    }
}

static INSTALLED: Once = Once::new();

/// Install the stderr logger. Only the first call does anything.
pub fn init_logging(config: LoggingConfig) {
    INSTALLED.call_once(|| {
        let directives = config
            .directives
            .or_else(|| std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        match directives {
            Some(d) => builder.parse_filters(&d),
            None => builder.filter_level(LevelFilter::Info),
        };
        builder
            .write_style(config.colors)
            .target(env_logger::Target::Stderr);

        match builder.try_init() {
            Ok(()) => log::debug!("stderr logger installed"),
            Err(e) => eprintln!("logger already set: {}", e),
        }
    });
}
