#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Concept configuration files for layered-concepts.
//!
//! ## Formats
//!
//! - TOML and JSON in the structured form described in [`file`]
//! - JSON in the simple form `{"Concept": ["term", ...]}`
//!
//! ## Modules
//!
//! - [`file`] - Serialized shape of a configuration and its options
//! - [`loader`] - Loading and saving by file extension
//! - [`predefined`] - Configurations embedded in the crate
//! - [`errors`] - Error types for configuration files

pub mod errors;
pub mod file;
pub mod loader;
pub mod predefined;

pub use errors::{ConfigError, ConfigFileResult};
pub use file::{ConceptEntry, ConceptFile, OptionsSection, PatternEntry};
pub use loader::{load_config_file, parse_json, parse_toml, save_config_file, ConfigFormat, LoadedConfig};
pub use predefined::{load_predefined, predefined_names};
