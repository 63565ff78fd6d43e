//! Configurations shipped with the crate.

use layered_concepts::SearchOptions;

use crate::errors::{ConfigError, ConfigFileResult};
use crate::loader::{parse_toml, LoadedConfig};

const PREDEFINED: &[(&str, &str)] = &[(
    "BasicSearch",
    include_str!("../configs/basic-search.toml"),
)];

/// Names of the predefined configurations.
pub fn predefined_names() -> impl Iterator<Item = &'static str> {
    PREDEFINED.iter().map(|(name, _)| *name)
}

/// Load a predefined configuration by name. Its short name is `#<name>`.
pub fn load_predefined(name: &str) -> ConfigFileResult<LoadedConfig> {
    let (_, content) = PREDEFINED
        .iter()
        .find(|(known, _)| *known == name)
        .ok_or_else(|| ConfigError::UnknownPredefined {
            name: name.to_string(),
        })?;
    let mut file = parse_toml(content, name)?;
    file.name = Some(format!("#{}", name));
    Ok(LoadedConfig {
        config: file.to_config(name)?,
        options: file.options.apply(SearchOptions::default()),
    })
}
