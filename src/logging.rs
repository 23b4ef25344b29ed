//! Forwards `log` records to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Parse a level name as accepted by `initLogging` (`"off"`, `"error"` .. `"trace"`).
/// Unknown names mean `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

fn format_record(record: &Record) -> String {
    format!("{}:{} -- {}", record.level(), record.target(), record.args())
}

#[cfg(target_arch = "wasm32")]
mod console {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = error)]
        pub fn error(s: &str);
        #[wasm_bindgen(js_namespace = console, js_name = warn)]
        pub fn warn(s: &str);
        #[wasm_bindgen(js_namespace = console, js_name = info)]
        pub fn info(s: &str);
        #[wasm_bindgen(js_namespace = console, js_name = debug)]
        pub fn debug(s: &str);
    }
}

pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format_record(record);
        #[cfg(target_arch = "wasm32")]
        match record.level() {
            Level::Error => console::error(&message),
            Level::Warn => console::warn(&message),
            Level::Info => console::info(&message),
            Level::Debug | Level::Trace => console::debug(&message),
        }
        #[cfg(not(target_arch = "wasm32"))]
        match record.level() {
            Level::Error | Level::Warn => eprintln!("{message}"),
            Level::Info | Level::Debug | Level::Trace => println!("{message}"),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Calling it again only changes the level.
pub fn init(level: LevelFilter) {
    // a second set_logger fails; the level still applies
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
