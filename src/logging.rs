//! `log` backend for the browser console

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

/// Forwards `log` records to `console.error`/`warn`/`info`/`debug`
pub struct ConsoleLogger {
    level: LevelFilter,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    level: LevelFilter::Info,
};

impl ConsoleLogger {
    /// Install the console logger. Later calls, or calls after another
    /// logger was installed, are ignored.
    pub fn install() {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LOGGER.level);
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}
