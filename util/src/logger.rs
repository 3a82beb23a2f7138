//! Logging setup
//!
//! Every record goes to stdout and to the session's log file, stamped with the seconds elapsed
//! since the session epoch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use colored::{ColoredString, Colorize};
use log::{info, Level};
use thiserror::Error;

use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Cannot open the log file: {0}")]
    LogFile(#[from] std::io::Error),

    #[error("A logger is already set: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Must only be called once per process.
pub fn logger_init(level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    let log_file = fern::log_file(&session.log_file_path)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_record(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message
                )
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()?;

    info!(
        "Logging at {:?} since {} to {:?}",
        level,
        session::get_epoch(),
        session.log_file_path
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single record.
///
/// Debug and trace records are tagged with the module they came from, so planner and tracker
/// output can be told apart when both are logging every cycle.
fn format_record(elapsed_s: f64, level: Level, target: &str, message: impl std::fmt::Display) -> String {
    if level > Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            elapsed_s,
            level_tag(level),
            short_target(target),
            message
        )
    }
    else {
        format!("[{:10.6} {}] {}", elapsed_s, level_tag(level), message)
    }
}

/// Last path segment of a log target, `robot_lib::superstructure::planner` becomes `planner`.
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed(),
        Level::Debug => "DBG".cyan(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow().bold(),
        Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record_format() {
        colored::control::set_override(false);

        assert_eq!(short_target("robot_lib::superstructure::planner"), "planner");
        assert_eq!(short_target("robot_exec"), "robot_exec");

        assert_eq!(
            format_record(1.5, Level::Info, "robot_lib::sim", "Stepped"),
            "[  1.500000 INF] Stepped"
        );
        assert_eq!(
            format_record(0.02, Level::Debug, "robot_lib::traj_ctrl::tracker", "Tracking"),
            "[  0.020000 DBG] tracker: Tracking"
        );
    }
}
