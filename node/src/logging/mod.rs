use lazy_static::lazy_static;
use serde::Serialize;

use crate::config::LoggingConfiguration;

lazy_static! {
    pub static ref RUST_LOG_JSON: bool = std::env::var("RUST_LOG_JSON").is_ok();
}

pub fn init() {
    if let Ok(directives) = ::std::env::var("RUST_LOG") {
        init_with_directives(&directives);
    } else {
        println!("Logging disabled");
    }
}

/// `RUST_LOG` overrides the configured directives.
pub fn init_with_config(config: &LoggingConfiguration) {
    match ::std::env::var("RUST_LOG") {
        Ok(directives) => init_with_directives(&directives),
        Err(_) => init_with_directives(&config.directives),
    }
}

pub fn init_with_directives(directives: &str) {
    println!("Logging enabled with directives: {directives}",);
    if let Err(err) = pretty_env_logger::formatted_timed_builder()
        .parse_filters(directives)
        .format_timestamp_millis()
        .try_init()
    {
        eprintln!("Logger already initialized: {err}");
    }
}

pub fn pretty_json<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    if *RUST_LOG_JSON {
        let json = serde_json::json!(&value);
        match serde_json::to_string_pretty(&json) {
            Ok(s) => s,
            _ => json.to_string(),
        }
    } else {
        format!("{value:?}",)
    }
}
