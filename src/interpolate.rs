//! `${...}` interpolation of stage definitions
//!
//! A [`Context`] is an ordered stack of variable sources. A reference such as
//! `${train.lr}` is looked up in each source in turn; the first hit wins.
//! Every value resolved from a file-backed source is recorded, so a stage
//! knows which parameters it consumed even when it never listed them under
//! `params`. Write `\${...}` to keep a reference literal.

use regex::Regex;
use serde_json::Value;

use crate::content::{insert_path, lookup};
use crate::error::Result;
use crate::loader::ParsedContent;
use crate::path::FileLocation;
use crate::stage::TrackedVars;

const REFERENCE_PATTERN: &str = r"(\\)?\$\{\s*([^}]*?)\s*\}";

/// One layer of variables.
#[derive(Debug, Clone, PartialEq)]
pub struct VarsSource {
    /// File the values came from; `None` for inline values.
    pub file: Option<FileLocation>,
    pub data: ParsedContent,
}

impl VarsSource {
    pub fn file(location: FileLocation, data: ParsedContent) -> Self {
        Self {
            file: Some(location),
            data,
        }
    }

    pub fn inline(data: ParsedContent) -> Self {
        Self { file: None, data }
    }
}

/// Ordered variable sources available to a stage
#[derive(Debug, Clone)]
pub struct Context {
    pattern: Regex,
    sources: Vec<VarsSource>,
}

impl Context {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(REFERENCE_PATTERN)?,
            sources: Vec::new(),
        })
    }

    /// Returns true if `text` contains an unescaped `${...}` reference.
    pub fn has_references(&self, text: &str) -> bool {
        self.pattern
            .captures_iter(text)
            .any(|caps| caps.get(1).is_none())
    }

    /// Returns true if a source backed by `location` is already present.
    pub fn contains_file(&self, location: &FileLocation) -> bool {
        self.sources
            .iter()
            .any(|source| source.file.as_ref() == Some(location))
    }

    /// Push a source after the existing ones.
    ///
    /// A file that is already present is ignored. A top-level key defined by
    /// two different sources is rejected.
    pub fn add(&mut self, source: VarsSource) -> std::result::Result<(), String> {
        if let Some(file) = &source.file {
            if self.contains_file(file) {
                return Ok(());
            }
        }

        for existing in &self.sources {
            if let Some(key) = source.data.keys().find(|key| existing.data.contains_key(*key)) {
                return Err(format!(
                    "key '{}' from {} conflicts with {}",
                    key,
                    describe(&source),
                    describe(existing)
                ));
            }
        }

        self.sources.push(source);
        Ok(())
    }

    /// Resolve a dotted key against the sources.
    pub fn lookup(&self, key: &str) -> Option<(&VarsSource, &Value)> {
        self.sources
            .iter()
            .find_map(|source| lookup(&source.data, key).map(|value| (source, value)))
    }

    /// Replace every reference in `template`.
    ///
    /// Values taken from file-backed sources are recorded in `tracked`.
    pub fn resolve(
        &self,
        template: &str,
        tracked: &mut TrackedVars,
    ) -> std::result::Result<String, String> {
        let mut output = String::with_capacity(template.len());
        let mut last = 0;

        for caps in self.pattern.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            output.push_str(&template[last..whole.start()]);
            last = whole.end();

            if caps.get(1).is_some() {
                // Escaped: drop the backslash and keep the reference verbatim
                output.push_str(&whole.as_str()[1..]);
                continue;
            }

            let key = caps.get(2).map_or("", |m| m.as_str());
            if key.is_empty() {
                return Err(format!("empty reference in '{}'", template));
            }

            let (source, value) = self
                .lookup(key)
                .ok_or_else(|| format!("could not find '{}'", key))?;
            let rendered = render_scalar(value)
                .ok_or_else(|| format!("cannot interpolate non-scalar value of '{}'", key))?;
            if let Some(file) = &source.file {
                insert_path(tracked.entry(file.clone()).or_default(), key, value.clone());
            }
            output.push_str(&rendered);
        }

        output.push_str(&template[last..]);
        Ok(output)
    }
}

fn describe(source: &VarsSource) -> String {
    match &source.file {
        Some(file) => format!("'{}'", file),
        None => "inline vars".to_string(),
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> ParsedContent {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn context() -> Context {
        let mut context = Context::new().unwrap();
        context
            .add(VarsSource::file(
                "params.yaml".into(),
                data(json!({"train": {"lr": 0.1, "epochs": 5, "layers": [64, 32]}, "seed": 7})),
            ))
            .unwrap();
        context
            .add(VarsSource::inline(data(json!({"model": "resnet"}))))
            .unwrap();
        context
    }

    #[test]
    fn test_resolve_records_file_values() {
        let mut tracked = TrackedVars::new();
        let out = context()
            .resolve("train.py --lr ${train.lr} --seed ${ seed } -m ${model}", &mut tracked)
            .unwrap();
        assert_eq!(out, "train.py --lr 0.1 --seed 7 -m resnet");

        assert_eq!(tracked.len(), 1);
        assert_eq!(
            Value::Object(tracked[&FileLocation::new("params.yaml")].clone()),
            json!({"train": {"lr": 0.1}, "seed": 7})
        );
    }

    #[test]
    fn test_resolve_list_index() {
        let mut tracked = TrackedVars::new();
        let out = context().resolve("${train.layers.0}", &mut tracked).unwrap();
        assert_eq!(out, "64");
    }

    #[test]
    fn test_resolve_escaped_reference() {
        let mut tracked = TrackedVars::new();
        let out = context().resolve(r"echo \${HOME} ${seed}", &mut tracked).unwrap();
        assert_eq!(out, "echo ${HOME} 7");
        assert!(context().has_references("${seed}"));
        assert!(!context().has_references(r"\${seed}"));
    }

    #[test]
    fn test_resolve_errors() {
        let mut tracked = TrackedVars::new();
        let ctx = context();
        assert!(ctx.resolve("${missing}", &mut tracked).unwrap_err().contains("missing"));
        assert!(ctx
            .resolve("${train}", &mut tracked)
            .unwrap_err()
            .contains("non-scalar"));
        assert!(ctx.resolve("${}", &mut tracked).is_err());
        assert!(tracked.is_empty());
    }

    #[test]
    fn test_add_rejects_conflicting_keys() {
        let mut ctx = context();
        let err = ctx
            .add(VarsSource::file("other.yaml".into(), data(json!({"seed": 1}))))
            .unwrap_err();
        assert!(err.contains("'seed'"));
        assert!(err.contains("'params.yaml'"));
    }

    #[test]
    fn test_add_same_file_twice_is_ignored() {
        let mut ctx = context();
        ctx.add(VarsSource::file("params.yaml".into(), data(json!({"seed": 1}))))
            .unwrap();
        let (_, value) = ctx.lookup("seed").unwrap();
        assert_eq!(value, &json!(7));
    }
}
