//! A colourised `log` backend.
//!
//! This one honours a level filter, unlike an always-on logger, so a
//! deployed client isn't pinned to trace-level output.

use std::time::SystemTime;

use log::{Level, LevelFilter, Metadata, Record};
use nu_ansi_term::ansi::RESET;
use nu_ansi_term::{Color, Style};

struct Logger {
	level: LevelFilter,
}

impl log::Log for Logger {
	fn enabled(&self, metadata: &Metadata) -> bool {
		metadata.level() <= self.level
	}

	fn log(&self, record: &Record) {
		if !self.enabled(record.metadata()) {
			return;
		}

		let time = humantime::format_rfc3339_nanos(SystemTime::now());
		let dim = Style::new().dimmed().prefix();

		eprintln!(
			"{dim}{time}{RESET} {}{:5}{RESET} {}{}{RESET}{dim}:{RESET} {}",
			level_color(record.level()).bold().prefix(),
			record.level(),
			Style::new().bold().prefix(),
			record.target(),
			record.args()
		);
	}

	fn flush(&self) {}
}

fn level_color(level: Level) -> Color {
	match level {
		Level::Trace => Color::Purple,
		Level::Debug => Color::Blue,
		Level::Info => Color::Green,
		Level::Warn => Color::Yellow,
		Level::Error => Color::Red,
	}
}

/// Parse a level filter the way `RUST_LOG`/`SL_LOG` would for a single global level.
fn level_from_env(var: &str) -> LevelFilter {
	std::env::var(var)
		.ok()
		.and_then(|s| s.parse().ok())
		.unwrap_or(LevelFilter::Info)
}

/// Install the global logger, reading `SL_LOG` (falling back to `RUST_LOG`) for the level.
pub fn init() {
	let level = std::env::var("SL_LOG")
		.ok()
		.and_then(|s| s.parse().ok())
		.unwrap_or_else(|| level_from_env("RUST_LOG"));

	init_with_level(level);
}

/// Install the global logger at an explicit level, bypassing the environment.
pub fn init_with_level(level: LevelFilter) {
	let logger = Box::new(Logger { level });

	if log::set_boxed_logger(logger).is_ok() {
		log::set_max_level(level);
	}
}
