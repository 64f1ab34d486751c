//! Parameter file loaders
//!
//! Each supported file format is a variant of the closed [`Format`] enum and
//! has a [`Loader`] that turns raw bytes into [`ParsedContent`], a nested
//! string-keyed mapping. All formats are converted to `serde_json` values so
//! that contents from different files and snapshots compare structurally.
//!
//! | Format | Suffixes          |
//! |--------|-------------------|
//! | YAML   | `.yaml`, `.yml`   |
//! | JSON   | `.json`           |
//! | TOML   | `.toml`           |
//! | INI    | `.ini`, `.cfg`    |

use std::fmt;

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use thiserror::Error;
use toml::Value as TomlValue;

use crate::error::{Error, Result};
use crate::filesystem::Tree;
use crate::path::FileLocation;

/// Nested key/value content of a parameters file.
pub type ParsedContent = Map<String, Value>;

/// Supported parameter file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Json,
    Toml,
    Ini,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Yaml, Format::Json, Format::Toml, Format::Ini];

    /// File suffixes (lowercase, with leading dot) handled by this format.
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &[".yaml", ".yml"],
            Format::Json => &[".json"],
            Format::Toml => &[".toml"],
            Format::Ini => &[".ini", ".cfg"],
        }
    }

    /// Look up the format for a lowercase suffix such as `.yaml`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.suffixes().contains(&suffix))
    }

    /// Select the format for a file by its lowercased suffix.
    pub fn for_location(location: &FileLocation) -> Result<Self> {
        let suffix = location.suffix().unwrap_or_default();
        Self::from_suffix(&suffix).ok_or_else(|| Error::UnsupportedFormat {
            path: location.to_string(),
            suffix,
        })
    }

    pub fn loader(self) -> &'static dyn Loader {
        match self {
            Format::Yaml => &YamlLoader,
            Format::Json => &JsonLoader,
            Format::Toml => &TomlLoader,
            Format::Ini => &IniLoader,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Json => "JSON",
            Format::Toml => "TOML",
            Format::Ini => "INI",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Malformed file content for a given format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{format} parse error: {message}")]
pub struct ParseError {
    pub format: Format,
    pub message: String,
}

impl ParseError {
    pub fn new(format: Format, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
        }
    }
}

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parses the bytes of one parameters file.
pub trait Loader: Send + Sync {
    fn format(&self) -> Format;

    /// Parse file content into a top-level mapping.
    ///
    /// Empty documents parse to an empty mapping; any other non-mapping
    /// top-level value is a parse error.
    fn parse(&self, content: &[u8]) -> ParseResult<ParsedContent>;
}

/// Read and parse `location` from `tree`.
///
/// Returns `Ok(None)` when the file does not exist in the tree.
pub fn load(tree: &dyn Tree, location: &FileLocation) -> Result<Option<ParsedContent>> {
    if !tree.exists(location) {
        return Ok(None);
    }
    let format = Format::for_location(location)?;
    let content = tree.read(location)?;
    format
        .loader()
        .parse(&content)
        .map(Some)
        .map_err(|source| Error::Parse {
            path: location.to_string(),
            source,
        })
}

fn expect_mapping(format: Format, value: Value) -> ParseResult<ParsedContent> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ParsedContent::new()),
        other => Err(ParseError::new(
            format,
            format!("expected a mapping at the top level, found {}", type_name(&other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}

fn utf8(format: Format, content: &[u8]) -> ParseResult<&str> {
    std::str::from_utf8(content).map_err(|err| ParseError::new(format, err.to_string()))
}

/// YAML 1.2 loader (`serde_yaml`)
pub struct YamlLoader;

impl YamlLoader {
    fn convert(value: YamlValue) -> ParseResult<Value> {
        Ok(match value {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Bool(b),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::from(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    float_value(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            YamlValue::String(s) => Value::String(s),
            YamlValue::Sequence(seq) => Value::Array(
                seq.into_iter()
                    .map(Self::convert)
                    .collect::<ParseResult<Vec<_>>>()?,
            ),
            YamlValue::Mapping(mapping) => {
                let mut map = Map::new();
                for (key, value) in mapping {
                    map.insert(Self::key(key)?, Self::convert(value)?);
                }
                Value::Object(map)
            }
            YamlValue::Tagged(tagged) => Self::convert(tagged.value)?,
        })
    }

    fn key(key: YamlValue) -> ParseResult<String> {
        match key {
            YamlValue::String(s) => Ok(s),
            YamlValue::Number(n) => Ok(n.to_string()),
            YamlValue::Bool(b) => Ok(b.to_string()),
            YamlValue::Null => Ok("null".to_string()),
            YamlValue::Tagged(tagged) => Self::key(tagged.value),
            _ => Err(ParseError::new(
                Format::Yaml,
                "mapping keys must be scalars",
            )),
        }
    }
}

impl Loader for YamlLoader {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, content: &[u8]) -> ParseResult<ParsedContent> {
        let text = utf8(Format::Yaml, content)?;
        if text.trim().is_empty() {
            return Ok(ParsedContent::new());
        }
        let value: YamlValue = serde_yaml::from_str(text)
            .map_err(|err| ParseError::new(Format::Yaml, err.to_string()))?;
        expect_mapping(Format::Yaml, Self::convert(value)?)
    }
}

/// JSON loader (`serde_json`)
pub struct JsonLoader;

impl Loader for JsonLoader {
    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, content: &[u8]) -> ParseResult<ParsedContent> {
        let value: Value = serde_json::from_slice(content)
            .map_err(|err| ParseError::new(Format::Json, err.to_string()))?;
        expect_mapping(Format::Json, value)
    }
}

/// TOML loader (`toml`)
pub struct TomlLoader;

impl TomlLoader {
    fn convert(value: TomlValue) -> Value {
        match value {
            TomlValue::String(s) => Value::String(s),
            TomlValue::Integer(i) => Value::from(i),
            TomlValue::Float(f) => float_value(f),
            TomlValue::Boolean(b) => Value::Bool(b),
            TomlValue::Datetime(dt) => Value::String(dt.to_string()),
            TomlValue::Array(array) => Value::Array(array.into_iter().map(Self::convert).collect()),
            TomlValue::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Self::convert(value)))
                    .collect(),
            ),
        }
    }
}

impl Loader for TomlLoader {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn parse(&self, content: &[u8]) -> ParseResult<ParsedContent> {
        let text = utf8(Format::Toml, content)?;
        let table: toml::Table = toml::from_str(text)
            .map_err(|err| ParseError::new(Format::Toml, err.to_string()))?;
        expect_mapping(Format::Toml, Self::convert(TomlValue::Table(table)))
    }
}

/// INI loader (`rust-ini`)
///
/// Keys outside any section land at the top level, each section becomes a
/// nested mapping. All values are strings.
pub struct IniLoader;

impl Loader for IniLoader {
    fn format(&self) -> Format {
        Format::Ini
    }

    fn parse(&self, content: &[u8]) -> ParseResult<ParsedContent> {
        let text = utf8(Format::Ini, content)?;
        let ini = ini::Ini::load_from_str(text)
            .map_err(|err| ParseError::new(Format::Ini, err.to_string()))?;

        let mut result = ParsedContent::new();
        for (section, properties) in ini.iter() {
            let entries: ParsedContent = properties
                .iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect();
            match section {
                None => result.extend(entries),
                Some(name) => {
                    result.insert(name.to_string(), Value::Object(entries));
                }
            }
        }
        Ok(result)
    }
}
