use std::io::{self, Write};

use anstyle::Style;
use chrono::Local;
use log::{Level, LevelFilter, Log};
#[cfg(all(unix, feature = "journald"))]
use systemd_journal_logger::{JournalLog, connected_to_journal, current_exe_identifier};

/// Environment variable that turns off timestamps when set to anything non-empty.
const NO_TIMESTAMPS_VAR: &str = "VERCEL_DOMAINS_LOG_NO_TIMESTAMPS";

/// Timestamp format for log output, e.g. `Jul 08 2001 14:46:23`.
const TIMESTAMP_FMT: &str = "%b %d %Y %H:%M:%S";

/// Writes this crate's log messages to `stderr`, or to journald when running under systemd.
///
/// Colour and `NO_COLOR` support come from [`anstream`].
pub struct Logger {
    filter: LevelFilter,
    timestamps: bool,
    #[cfg(all(unix, feature = "journald"))]
    journald: Option<JournalLog>,
}

/// Level colours, matching what `journalctl` shows for the priorities [`JournalLog`] maps each level onto.
#[rustfmt::skip]
mod styles {
    use anstyle::{Ansi256Color, AnsiColor, Color, Style};

    pub const TRACE: Style = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(245))));
    pub const DEBUG: Style = Style::new();
    pub const INFO: Style  = Style::new().bold();
    pub const WARN: Style  = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(185)))).bold();
    pub const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold();
}

#[rustfmt::skip]
fn level_style(level: Level) -> (Style, &'static str) {
    match level {
        Level::Trace => (styles::TRACE, "[trace]"),
        Level::Debug => (styles::DEBUG, "[debug]"),
        Level::Info  => ( styles::INFO, "[info]"),
        Level::Warn  => ( styles::WARN, "[warn]"),
        Level::Error => (styles::ERROR, "[error]"),
    }
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        let mut timestamps = !crate::get_var(NO_TIMESTAMPS_VAR).is_ok_and(|v| !v.is_empty());

        // journald stamps messages itself.
        #[cfg(all(unix, feature = "journald"))]
        let journald = init_journald().inspect(|_| timestamps = false);

        Self {
            filter: level,
            timestamps,
            #[cfg(all(unix, feature = "journald"))]
            journald,
        }
    }

    /// Installs this logger as the global [`log`] logger.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.filter;
        log::set_boxed_logger(Box::new(self)).map(|_| log::set_max_level(level))
    }

    fn try_log(&self, record: &log::Record) -> io::Result<()> {
        // The library and the binary share a crate name; everything else (reqwest, hyper) is noise here.
        if !record.target().starts_with(env!("CARGO_CRATE_NAME")) || !self.enabled(record.metadata()) {
            return Ok(());
        }

        #[cfg(all(unix, feature = "journald"))]
        if let Some(journald) = self.journald.as_ref() {
            return journald.journal_send(record);
        }

        let mut output = anstream::stderr().lock();
        let (style, tag) = level_style(record.level());

        if self.timestamps {
            write!(output, "{} ", Local::now().format(TIMESTAMP_FMT))?;
        }

        writeln!(output, "{style}{tag} {}{style:#}", record.args())?;
        output.flush()
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &log::Record) {
        let _ = self.try_log(record);
    }

    fn flush(&self) {
        let _ = anstream::stderr().flush();

        #[cfg(all(unix, feature = "journald"))]
        if let Some(journald) = self.journald.as_ref() {
            <JournalLog as Log>::flush(journald);
        }
    }
}

#[cfg(all(unix, feature = "journald"))]
fn init_journald() -> Option<JournalLog> {
    if !connected_to_journal() {
        return None;
    }

    let identifier = current_exe_identifier().unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let logger = JournalLog::empty()
        .ok()?
        .with_syslog_identifier(identifier)
        .add_extra_field("version", env!("CARGO_PKG_VERSION"));
    Some(logger)
}
