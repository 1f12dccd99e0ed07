//! The process-wide sink for solver statistics.
//!
//! Nothing is written until [`configure_statistic_logging`] has been called; afterwards every
//! statistic becomes one line `{prefix} {name}={value}` in the configured writer.
use std::fmt::Debug;
use std::fmt::Display;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

/// The layout of statistic lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatisticOptions {
    /// Written in front of every statistic, e.g. `%%%mzn-stat:` for MiniZinc-style output.
    pub prefix: String,
    /// A line closing every block of statistics.
    pub closing_line: Option<String>,
    /// Statistic names are re-cased with this case, e.g. to camel case.
    pub casing: Option<Case>,
}

impl Default for StatisticOptions {
    fn default() -> Self {
        StatisticOptions {
            prefix: "c".to_owned(),
            closing_line: None,
            casing: None,
        }
    }
}

impl StatisticOptions {
    fn format_line(&self, name: impl Display, value: impl Display) -> String {
        let name = match self.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        format!("{} {name}={value}", self.prefix)
    }
}

struct StatisticSink {
    options: StatisticOptions,
    writer: Box<dyn Write + Send>,
}

impl Debug for StatisticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticSink")
            .field("options", &self.options)
            .field("writer", &"<Writer>")
            .finish()
    }
}

static STATISTIC_SINK: OnceLock<Mutex<StatisticSink>> = OnceLock::new();

/// Sends statistics to `writer`, or to stdout without one. Only the first call has an effect.
pub fn configure_statistic_logging(options: StatisticOptions, writer: Option<Box<dyn Write + Send>>) {
    let _ = STATISTIC_SINK.get_or_init(|| {
        Mutex::new(StatisticSink {
            options,
            writer: writer.unwrap_or_else(|| Box::new(std::io::stdout())),
        })
    });
}

fn with_sink(write: impl FnOnce(&mut StatisticSink)) {
    if let Some(sink) = STATISTIC_SINK.get() {
        if let Ok(mut sink) = sink.lock() {
            write(&mut sink);
        }
    }
}

/// Writes the statistic `name` with `value`.
pub fn log_statistic(name: impl Display, value: impl Display) {
    with_sink(|sink| {
        let line = sink.options.format_line(name, value);
        let _ = writeln!(sink.writer, "{line}");
    });
}

/// Writes the closing line of a block of statistics, if one is configured.
pub fn log_statistic_postfix() {
    with_sink(|sink| {
        if let Some(closing_line) = &sink.options.closing_line {
            let _ = writeln!(sink.writer, "{closing_line}");
        }
    });
}

/// Whether statistics are written at all.
pub fn should_log_statistics() -> bool {
    STATISTIC_SINK.get().is_some()
}
