// A minimal `log` backend for the command-line tool: every record goes to
// stderr, filtering is left to `log::set_max_level`.

use log::{self, Log};

#[derive(Debug)]
pub struct Logger(());

const LOGGER: &Logger = &Logger(());

impl Logger {
    /// Install the logger, taking the level from `LPCRE2_LOG`
    /// (`error|warn|info|debug|trace`, default `warn`).
    pub fn init_from_env() -> Result<(), log::SetLoggerError> {
        let level = std::env::var("LPCRE2_LOG")
            .ok()
            .and_then(|v| v.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Warn);
        log::set_logger(LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        match record.line() {
            Some(line) => {
                eprintln!("{}|{}:{}: {}", record.level(), record.target(), line, record.args())
            }
            None => eprintln!("{}|{}: {}", record.level(), record.target(), record.args()),
        }
    }

    fn flush(&self) {}
}
