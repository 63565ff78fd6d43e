//! Reading and writing configuration files.

use std::fs;
use std::path::Path;

use layered_concepts::{ConceptConfig, SearchOptions};
use serde_json::Value;

use crate::errors::{ConfigError, ConfigFileResult};
use crate::file::ConceptFile;

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format named by the file extension.
    pub fn from_path(path: &Path) -> ConfigFileResult<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnknownFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// A configuration together with the search options stored with it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ConceptConfig,
    pub options: SearchOptions,
}

/// Load a `.toml` or `.json` configuration file.
///
/// The configuration is named after the file stem unless the file names it.
pub fn load_config_file(path: &Path) -> ConfigFileResult<LoadedConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let label = path.display().to_string();
    let file = match format {
        ConfigFormat::Toml => parse_toml(&content, &label)?,
        ConfigFormat::Json => parse_json(&content, &label)?,
    };
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let loaded = LoadedConfig {
        config: file.to_config(&stem)?,
        options: file.options.apply(SearchOptions::default()),
    };
    tracing::debug!(
        path = %label,
        config = loaded.config.short_name(),
        concepts = loaded.config.len(),
        terms = loaded.config.term_count(),
        "loaded concept configuration"
    );
    Ok(loaded)
}

/// Write a configuration in the format named by the file extension.
pub fn save_config_file(path: &Path, config: &ConceptConfig, options: &SearchOptions) -> ConfigFileResult<()> {
    let file = ConceptFile::from_config(config, options);
    let content = match ConfigFormat::from_path(path)? {
        ConfigFormat::Toml => toml::to_string_pretty(&file).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })?,
        ConfigFormat::Json => serde_json::to_string_pretty(&file).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })?,
    };
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse the TOML form. `label` names the source in errors.
pub fn parse_toml(content: &str, label: &str) -> ConfigFileResult<ConceptFile> {
    toml::from_str(content).map_err(|source| ConfigError::Toml {
        path: label.to_string(),
        source,
    })
}

/// Parse either JSON form.
///
/// An object with a `concepts` array is the structured form shared with
/// TOML. Any other object maps concept names to term lists, in file order;
/// keys starting with `_` are skipped.
pub fn parse_json(content: &str, label: &str) -> ConfigFileResult<ConceptFile> {
    let value: Value = serde_json::from_str(content).map_err(|source| ConfigError::Json {
        path: label.to_string(),
        source,
    })?;
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(shape(label, format!("expected an object, found {}", kind_of(&other))));
        }
    };

    if matches!(object.get("concepts"), Some(Value::Array(_))) {
        return serde_json::from_value(Value::Object(object)).map_err(|source| ConfigError::Json {
            path: label.to_string(),
            source,
        });
    }

    let mut file = ConceptFile::default();
    for (name, terms) in object {
        if name.starts_with('_') {
            continue;
        }
        let terms = match terms {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(term) => Ok(term),
                    other => Err(shape(
                        label,
                        format!("concept {:?}: expected a string term, found {}", name, kind_of(&other)),
                    )),
                })
                .collect::<ConfigFileResult<Vec<_>>>()?,
            other => {
                return Err(shape(
                    label,
                    format!("concept {:?}: expected a list of terms, found {}", name, kind_of(&other)),
                ));
            }
        };
        file.concepts.push(crate::file::ConceptEntry {
            name,
            terms,
            patterns: Vec::new(),
        });
    }
    Ok(file)
}

fn shape(label: &str, message: String) -> ConfigError {
    ConfigError::Shape {
        path: label.to_string(),
        message,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_concepts::{BoundaryPolicy, ConfigurationError, TermKind};
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    #[test]
    fn test_simple_json_keeps_order_and_skips_private_keys() {
        let file = parse_json(
            r#"{"_comment": ["ignored"], "Performance Metrics": ["recall", "sensitivity"], "Data Ethics": ["bias"]}"#,
            "inline",
        )
        .unwrap();
        let names: Vec<_> = file.concepts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Performance Metrics", "Data Ethics"]);
    }

    #[test]
    fn test_simple_json_shape_errors() {
        let err = parse_json(r#"{"Data Ethics": "bias"}"#, "bad.json").unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad.json: concept \"Data Ethics\": expected a list of terms, found a string"
        );
        let err = parse_json(r#"["bias"]"#, "bad.json").unwrap_err();
        assert!(matches!(err, ConfigError::Shape { .. }));
        let err = parse_json(r#"{"Data Ethics": [1]}"#, "bad.json").unwrap_err();
        assert!(err.to_string().contains("found a number"));
    }

    #[test]
    fn test_structured_json() {
        let file = parse_json(
            r#"{"name": "Dates", "concepts": [{"name": "Year", "patterns": [{"regex": "\\b\\d{4}\\b"}]}]}"#,
            "inline",
        )
        .unwrap();
        let config = file.to_config("x").unwrap();
        assert_eq!(config.short_name(), "Dates");
        assert_eq!(config.concepts()[0].terms()[0].kind(), TermKind::Pattern);
    }

    #[test]
    fn test_load_toml_named_after_stem() {
        let mut file = Builder::new().prefix("ethics").suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[options]
token_chars = "-"

[[concepts]]
name = "Data Ethics"
terms = ["bias", "non-maleficence"]
"#
        )
        .unwrap();

        let loaded = load_config_file(file.path()).unwrap();
        let stem = file.path().file_stem().unwrap().to_string_lossy().into_owned();
        assert_eq!(loaded.config.short_name(), stem);
        assert_eq!(loaded.options.boundary, BoundaryPolicy::with_token_chars(['-']));
    }

    #[test]
    fn test_invalid_concepts_surface() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"Data Ethics": ["bias", "  "]}}"#).unwrap();
        let err = load_config_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Concepts(ConfigurationError::EmptyTerm { position: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_format() {
        let err = load_config_file(Path::new("concepts.xlsx")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config_file(Path::new("/nonexistent/concepts.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let config = ConceptConfig::builder()
            .short_name("Roundtrip")
            .concept("Performance Metrics", ["recall", "F1"])
            .unwrap()
            .pattern("Dates", r"\b\d{4}\b", true)
            .unwrap()
            .build();
        let options = SearchOptions {
            boundary: BoundaryPolicy::with_token_chars(['-']),
            threads: Some(3),
            ..SearchOptions::default()
        };

        for name in ["concepts.toml", "concepts.json"] {
            let path = dir.path().join(name);
            save_config_file(&path, &config, &options).unwrap();
            let loaded = load_config_file(&path).unwrap();
            assert_eq!(loaded.config, config);
            assert_eq!(loaded.options, options);
        }
    }
}
