//! Read the parameter files of one snapshot

use log::trace;

use crate::brancher::SnapshotId;
use crate::diagnostics::{Diagnostic, DiagnosticObserver};
use crate::error::Error;
use crate::filesystem::Tree;
use crate::loader;
use crate::path::FileLocation;
use crate::stage::ParamsDependency;

use super::SnapshotParams;

/// Read `deps` and `locations` from `tree`.
///
/// With `deps_only` each dependency contributes only its declared keys;
/// otherwise dependencies are read as whole files. Missing files are skipped
/// silently and unreadable ones are reported to `observer`. Never fails.
pub fn read_params(
    tree: &dyn Tree,
    snapshot: &SnapshotId,
    deps: &[ParamsDependency],
    locations: &[FileLocation],
    deps_only: bool,
    observer: &dyn DiagnosticObserver,
) -> SnapshotParams {
    let mut result = SnapshotParams::new();
    let mut plain: Vec<FileLocation> = locations.to_vec();

    if deps_only {
        for dep in deps {
            match dep.read_params(tree) {
                Ok(payload) if payload.is_empty() => {}
                Ok(payload) => {
                    result
                        .entry(dep.location.to_string())
                        .or_default()
                        .extend(payload);
                }
                Err(err) => report(observer, snapshot, &dep.location, err),
            }
        }
    } else {
        for dep in deps {
            if !plain.contains(&dep.location) {
                plain.push(dep.location.clone());
            }
        }
    }

    for location in &plain {
        match loader::load(tree, location) {
            Ok(None) => trace!("'{}' does not exist on '{}'", location, snapshot),
            Ok(Some(content)) if content.is_empty() => {}
            Ok(Some(content)) => {
                result.insert(location.to_string(), content);
            }
            Err(err) => report(observer, snapshot, location, err),
        }
    }

    result
}

fn report(
    observer: &dyn DiagnosticObserver,
    snapshot: &SnapshotId,
    location: &FileLocation,
    error: Error,
) {
    let diagnostic = match error {
        Error::UnsupportedFormat { suffix, .. } => Diagnostic::UnsupportedFormat {
            snapshot: snapshot.clone(),
            location: location.clone(),
            suffix,
        },
        Error::Parse { source, .. } => Diagnostic::ReadFailed {
            snapshot: snapshot.clone(),
            location: location.clone(),
            message: source.to_string(),
        },
        other => Diagnostic::ReadFailed {
            snapshot: snapshot.clone(),
            location: location.clone(),
            message: other.to_string(),
        },
    };
    observer.observe(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::tests::RecordingObserver;
    use crate::filesystem::MemoryFS;
    use serde_json::{json, Value};

    fn tree() -> MemoryFS {
        MemoryFS::new()
            .with_file("params.yaml", "lr: 0.1\ntrain:\n  epochs: 5\n")
            .unwrap()
            .with_file("config/model.json", r#"{"layers": 3, "dropout": 0.2}"#)
            .unwrap()
            .with_file("config/broken.toml", "lr = ")
            .unwrap()
            .with_file("config/empty.yaml", "")
            .unwrap()
            .with_file("notes.txt", "hello")
            .unwrap()
    }

    fn main_branch() -> SnapshotId {
        SnapshotId::new("main")
    }

    #[test]
    fn test_reads_plain_locations_and_dependencies() {
        let observer = RecordingObserver::default();
        let deps = vec![ParamsDependency::new("config/model.json".into(), vec!["layers".into()])];
        let result = read_params(
            &tree(),
            &main_branch(),
            &deps,
            &["params.yaml".into()],
            false,
            &observer,
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result["params.yaml"]["lr"], json!(0.1));
        // Whole file when not restricted to declared keys
        assert_eq!(result["config/model.json"].len(), 2);
        assert!(observer.events.borrow().is_empty());
    }

    #[test]
    fn test_deps_only_reads_declared_keys() {
        let observer = RecordingObserver::default();
        let deps = vec![
            ParamsDependency::new("params.yaml".into(), vec!["train.epochs".into()]),
            ParamsDependency::new("config/model.json".into(), vec!["layers".into()]),
            ParamsDependency::new("config/model.json".into(), vec!["dropout".into()]),
            ParamsDependency::new("config/absent.yaml".into(), vec![]),
        ];
        let result = read_params(&tree(), &main_branch(), &deps, &[], true, &observer);

        assert_eq!(
            Value::Object(result["params.yaml"].clone()),
            json!({"train": {"epochs": 5}})
        );
        assert_eq!(
            Value::Object(result["config/model.json"].clone()),
            json!({"layers": 3, "dropout": 0.2})
        );
        assert!(!result.contains_key("config/absent.yaml"));
    }

    #[test]
    fn test_missing_and_empty_files_are_skipped_silently() {
        let observer = RecordingObserver::default();
        let result = read_params(
            &tree(),
            &main_branch(),
            &[],
            &["absent.yaml".into(), "config/empty.yaml".into()],
            false,
            &observer,
        );
        assert!(result.is_empty());
        assert!(observer.events.borrow().is_empty());
    }

    #[test]
    fn test_bad_files_are_reported_and_skipped() {
        let observer = RecordingObserver::default();
        let result = read_params(
            &tree(),
            &main_branch(),
            &[],
            &[
                "config/broken.toml".into(),
                "notes.txt".into(),
                "params.yaml".into(),
            ],
            false,
            &observer,
        );

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["params.yaml"]);
        let events = observer.events.borrow();
        assert_eq!(events.len(), 2);
        match &events[0] {
            Diagnostic::ReadFailed {
                snapshot,
                location,
                message,
            } => {
                assert_eq!(snapshot, &main_branch());
                assert_eq!(location.as_str(), "config/broken.toml");
                assert!(message.starts_with("TOML parse error"));
            }
            other => panic!("Expected ReadFailed, got {:?}", other),
        }
        assert_eq!(
            events[1],
            Diagnostic::UnsupportedFormat {
                snapshot: main_branch(),
                location: "notes.txt".into(),
                suffix: ".txt".to_string(),
            }
        );
    }

    #[test]
    fn test_dependency_read_failure_is_reported() {
        let observer = RecordingObserver::default();
        let deps = vec![ParamsDependency::new("config/broken.toml".into(), vec![])];
        let result = read_params(&tree(), &main_branch(), &deps, &[], true, &observer);
        assert!(result.is_empty());
        assert_eq!(observer.events.borrow().len(), 1);
    }
}
