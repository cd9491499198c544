//! Configuration loading for narration highlighting.
//!
//! Settings are read from a sectioned TOML file (`conf/config.toml` by
//! default). Missing or invalid entries fall back to defaults so a session
//! can always be built.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, LogLevel, SpeechConfig};
