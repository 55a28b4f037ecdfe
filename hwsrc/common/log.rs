//! Logging facade re-exports and the console logger used by the hosts embedding the hardware wallet crates.

pub use ::log::{debug, error, info, trace, warn, LevelFilter};

use log4rs::encode::pattern;
use log4rs::{append, config};
use std::fmt;
use std::str::FromStr;

const DEFAULT_CONSOLE_FORMAT: &str = "[{d(%Y-%m-%d %H:%M:%S %Z)(utc)} {h({l})} {M}:{f}:{L}] {m}\n";
const DEFAULT_LEVEL_FILTER: LogLevel = LogLevel::Info;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum LogLevel {
    /// A level lower than all log levels.
    Off = 0,
    /// Corresponds to the `ERROR` log level.
    Error = 1,
    /// Corresponds to the `WARN` log level.
    Warn = 2,
    /// Corresponds to the `INFO` log level.
    Info = 3,
    /// Corresponds to the `DEBUG` log level.
    Debug = 4,
    /// Corresponds to the `TRACE` log level.
    Trace = 5,
}

impl LogLevel {
    pub fn from_env() -> Option<LogLevel> {
        let env_val = std::env::var("RUST_LOG").ok()?;
        LogLevel::from_str(&env_val).ok()
    }
}

impl Default for LogLevel {
    fn default() -> Self { DEFAULT_LEVEL_FILTER }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Unknown log level '{}'", s)),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

pub struct UnifiedLoggerBuilder {
    console_format: String,
    filter: LogLevel,
    console: bool,
}

impl Default for UnifiedLoggerBuilder {
    fn default() -> UnifiedLoggerBuilder {
        UnifiedLoggerBuilder {
            console_format: DEFAULT_CONSOLE_FORMAT.to_owned(),
            filter: LogLevel::from_env().unwrap_or_default(),
            console: true,
        }
    }
}

impl UnifiedLoggerBuilder {
    pub fn new() -> UnifiedLoggerBuilder { UnifiedLoggerBuilder::default() }

    pub fn console_format(mut self, console_format: &str) -> UnifiedLoggerBuilder {
        self.console_format = console_format.to_owned();
        self
    }

    pub fn level_filter(mut self, filter: LogLevel) -> UnifiedLoggerBuilder {
        self.filter = filter;
        self
    }

    pub fn console(mut self, console: bool) -> UnifiedLoggerBuilder {
        self.console = console;
        self
    }

    pub fn try_init(self) -> Result<(), String> {
        let mut appenders = Vec::new();

        if self.console {
            let encoder = Box::new(pattern::PatternEncoder::new(&self.console_format));
            let appender = append::console::ConsoleAppender::builder()
                .encoder(encoder)
                .target(append::console::Target::Stdout)
                .build();
            appenders.push(config::Appender::builder().build("console", Box::new(appender)));
        }

        let app_names: Vec<_> = appenders.iter().map(|app| app.name().to_owned()).collect();
        let root = config::Root::builder()
            .appenders(app_names)
            .build(LevelFilter::from(self.filter));
        let config = config::Config::builder()
            .appenders(appenders)
            .build(root)
            .map_err(|e| e.to_string())?;

        log4rs::init_config(config).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Logs an error that is intentionally not propagated any further.
pub trait LogOnError {
    fn warn_log(self);

    fn warn_log_with_msg(self, msg: &str);

    fn error_log(self);
}

impl<T, E: fmt::Display> LogOnError for Result<T, E> {
    #[track_caller]
    fn warn_log(self) {
        if let Err(e) = self {
            let location = std::panic::Location::caller();
            warn!("{}:{}] {}", location.file(), location.line(), e);
        }
    }

    #[track_caller]
    fn warn_log_with_msg(self, msg: &str) {
        if let Err(e) = self {
            let location = std::panic::Location::caller();
            warn!("{}:{}] {}: {}", location.file(), location.line(), msg, e);
        }
    }

    #[track_caller]
    fn error_log(self) {
        if let Err(e) = self {
            let location = std::panic::Location::caller();
            error!("{}:{}] {}", location.file(), location.line(), e);
        }
    }
}
