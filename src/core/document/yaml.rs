//! YAML binding for document trees.

use serde::Deserialize;
use serde_yaml::value::TaggedValue;
use serde_yaml::Value;

use super::{Node, Scalar, ScalarValue};
use crate::error::DocumentError;

/// Parse every document of a YAML stream.
pub(super) fn parse(source: &str) -> Result<Vec<Node>, DocumentError> {
    serde_yaml::Deserializer::from_str(source)
        .map(|document| {
            Value::deserialize(document)
                .map(from_value)
                .map_err(DocumentError::Parse)
        })
        .collect()
}

/// Replace each `(old, new)` string value in place within `source`.
///
/// Block scalars appear in the text as a run of lines equal to the value's
/// lines modulo indentation; every such run is swapped for the new value's
/// lines at the same indentation. Values written as one double-quoted line
/// (including JSON strings) are swapped for the new value in the same form.
/// Anything else is left alone and its index in `edits` is returned.
pub(super) fn splice(source: &str, edits: &[(&str, &str)]) -> Result<String, usize> {
    let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<String> = source.lines().map(String::from).collect();

    for (index, (old, new)) in edits.iter().enumerate() {
        // both forms may hold copies of the same value
        let block = splice_block(&mut lines, old, new);
        let quoted = splice_quoted(&mut lines, old, new);
        if !block && !quoted {
            return Err(index);
        }
    }

    let mut out = lines.join(newline);
    if source.ends_with('\n') {
        out.push_str(newline);
    }
    Ok(out)
}

fn splice_block(lines: &mut Vec<String>, old: &str, new: &str) -> bool {
    let pattern: Vec<&str> = old
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if pattern.is_empty() {
        return false;
    }

    let starts = find_runs(lines, &pattern);
    if starts.is_empty() {
        return false;
    }

    // back to front so earlier indices stay valid
    for start in starts.into_iter().rev() {
        let indent: String = lines[start]
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        let replacement: Vec<String> = new
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| format!("{}{}", indent, l.trim()))
            .collect();
        lines.splice(start..start + pattern.len(), replacement);
    }
    true
}

fn splice_quoted(lines: &mut [String], old: &str, new: &str) -> bool {
    let needle = double_quoted(old);
    // keep the old value's trailing newline convention
    let new = if old.ends_with('\n') {
        new.to_string()
    } else {
        new.trim_end_matches('\n').to_string()
    };
    let replacement = double_quoted(&new);

    let mut found = false;
    for line in lines.iter_mut().filter(|l| l.contains(&needle)) {
        *line = line.replace(&needle, &replacement);
        found = true;
    }
    found
}

/// `value` as a double-quoted scalar on a single line.
fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Start indices of non-overlapping runs of `lines` matching `pattern`.
fn find_runs(lines: &[String], pattern: &[&str]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i + pattern.len() <= lines.len() {
        let matched = pattern
            .iter()
            .enumerate()
            .all(|(k, expected)| lines[i + k].trim() == *expected);
        if matched {
            starts.push(i);
            i += pattern.len();
        } else {
            i += 1;
        }
    }
    starts
}

fn from_value(value: Value) -> Node {
    match value {
        Value::Null => Node::Scalar(Scalar::plain(ScalarValue::Null)),
        Value::Bool(b) => Node::Scalar(Scalar::plain(ScalarValue::Bool(b))),
        Value::Number(n) => Node::Scalar(Scalar::plain(ScalarValue::Number(n.to_string()))),
        Value::String(s) => Node::Scalar(Scalar::plain(ScalarValue::String(s))),
        Value::Sequence(items) => Node::Sequence(items.into_iter().map(from_value).collect()),
        Value::Mapping(map) => Node::Mapping(
            map.into_iter()
                .map(|(key, value)| (from_value(key), from_value(value)))
                .collect(),
        ),
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            match from_value(value) {
                Node::Scalar(mut scalar) => {
                    scalar.tag = Some(tag.to_string().trim_start_matches('!').to_string());
                    Node::Scalar(scalar)
                }
                // tags on collections are not tracked
                other => other,
            }
        }
    }
}
