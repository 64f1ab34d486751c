//! Tabular rendering of parameters and parameter changes
//!
//! Both renderers flatten nested parameters into dotted keys and print one row
//! per `(file, key)` pair. Plain output pads columns with spaces; Markdown
//! output is a pipe table.

use std::collections::BTreeSet;

use console::style;
use serde_json::Value;

use crate::content::flatten;
use crate::output::OutputConfig;
use crate::params::{ParamChange, ParamsResult};

/// Placeholder for a parameter absent from a snapshot.
pub const MISSING: &str = "-";

/// Strings render bare, anything else as compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn format_optional(value: Option<&Value>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_value)
}

/// Render a result with one column per snapshot.
pub fn table(result: &ParamsResult, markdown: bool, config: &OutputConfig) -> String {
    let mut header = vec!["Path".to_string(), "Param".to_string()];
    header.extend(result.keys().map(|id| id.to_string()));

    let flattened: Vec<_> = result
        .values()
        .map(|params| {
            params
                .iter()
                .map(|(path, content)| (path.as_str(), flatten(content)))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut keys: BTreeSet<(&str, &str)> = BTreeSet::new();
    for snapshot in &flattened {
        for (path, leaves) in snapshot {
            keys.extend(leaves.keys().map(|param| (*path, param.as_str())));
        }
    }

    let rows: Vec<Vec<String>> = keys
        .into_iter()
        .map(|(path, param)| {
            let mut row = vec![path.to_string(), param.to_string()];
            for snapshot in &flattened {
                let value = snapshot
                    .iter()
                    .find(|(p, _)| *p == path)
                    .and_then(|(_, leaves)| leaves.get(param));
                row.push(format_optional(value));
            }
            row
        })
        .collect();

    render(&header, &rows, markdown, config)
}

/// Render changes as `Path | Param | <old> | <new>`.
pub fn changes_table(
    changes: &[ParamChange],
    old_label: &str,
    new_label: &str,
    markdown: bool,
    config: &OutputConfig,
) -> String {
    let header = vec![
        "Path".to_string(),
        "Param".to_string(),
        old_label.to_string(),
        new_label.to_string(),
    ];
    let rows: Vec<Vec<String>> = changes
        .iter()
        .map(|change| {
            vec![
                change.path.clone(),
                change.param.clone(),
                format_optional(change.old.as_ref()),
                format_optional(change.new.as_ref()),
            ]
        })
        .collect();

    render(&header, &rows, markdown, config)
}

fn render(header: &[String], rows: &[Vec<String>], markdown: bool, config: &OutputConfig) -> String {
    if markdown {
        return render_markdown(header, rows);
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_line = pad_line(header, &widths);
    if config.use_color {
        out.push_str(&style(header_line).bold().to_string());
    } else {
        out.push_str(&header_line);
    }
    out.push('\n');

    for row in rows {
        out.push_str(&pad_line(row, &widths));
        out.push('\n');
    }
    out
}

fn pad_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    padded.join("  ").trim_end().to_string()
}

fn render_markdown(header: &[String], rows: &[Vec<String>]) -> String {
    let line = |cells: &[String]| {
        let escaped: Vec<String> = cells.iter().map(|c| c.replace('|', "\\|")).collect();
        format!("| {} |", escaped.join(" | "))
    };

    let mut out = line(header);
    out.push('\n');
    out.push_str(&format!("|{}", "---|".repeat(header.len())));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brancher::SnapshotId;
    use crate::loader::ParsedContent;
    use crate::params::SnapshotParams;
    use serde_json::json;

    fn params(value: Value) -> SnapshotParams {
        let content: ParsedContent = match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        };
        SnapshotParams::from([("params.yaml".to_string(), content)])
    }

    fn result() -> ParamsResult {
        let mut result = ParamsResult::new();
        result.insert(
            SnapshotId::workspace(),
            params(json!({"lr": 0.2, "model": "resnet"})),
        );
        result.insert(
            SnapshotId::new("main"),
            params(json!({"lr": 0.1, "model": "resnet", "layers": [64, 32]})),
        );
        result
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("adam")), "adam");
        assert_eq!(format_value(&json!(0.1)), "0.1");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_plain_table() {
        let out = table(&result(), false, &OutputConfig::without_color());
        insta::assert_snapshot!(out, @r"
        Path         Param   workspace  main
        params.yaml  layers  -          [64,32]
        params.yaml  lr      0.2        0.1
        params.yaml  model   resnet     resnet
        ");
    }

    #[test]
    fn test_markdown_table() {
        let out = table(&result(), true, &OutputConfig::without_color());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "| Path | Param | workspace | main |");
        assert_eq!(lines[1], "|---|---|---|---|");
        assert_eq!(lines[2], "| params.yaml | layers | - | [64,32] |");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let mut res = ParamsResult::new();
        res.insert(SnapshotId::workspace(), params(json!({"cmd": "a|b"})));
        let out = table(&res, true, &OutputConfig::without_color());
        assert!(out.contains("| a\\|b |"));
    }

    #[test]
    fn test_changes_table() {
        let changes = vec![ParamChange {
            path: "params.yaml".to_string(),
            param: "lr".to_string(),
            old: Some(json!(0.1)),
            new: None,
        }];
        let out = changes_table(&changes, "HEAD", "workspace", false, &OutputConfig::without_color());
        assert_eq!(
            out,
            "Path         Param  HEAD  workspace\nparams.yaml  lr     0.1   -\n"
        );
    }
}
