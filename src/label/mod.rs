//! YOLO label file reading and writing.
//!
//! One label file per image, one box per line:
//! `<class_id> <cx> <cy> <w> <h>`, all box values normalized to the image.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::TilerError;
use crate::geometry::LabelBox;

/// Extension used for label files.
pub const LABEL_EXTENSION: &str = "txt";

/// Boxes read from one label file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelFile {
    /// Parsed boxes in file order.
    pub boxes: Vec<LabelBox>,
    /// Non-blank lines that could not be parsed and were dropped.
    pub skipped_lines: usize,
}

/// Read the labels for one image.
///
/// A missing file means the image has no objects and yields an empty
/// [`LabelFile`]. Malformed lines are logged and skipped; only failing to
/// read an existing file is an error
/// ([`TilerError::LabelRead`]).
pub fn read_label_file(path: &Path) -> Result<LabelFile, TilerError> {
    if !path.is_file() {
        return Ok(LabelFile::default());
    }

    let content = fs::read_to_string(path).map_err(|source| TilerError::LabelRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_label_str(&content, path))
}

/// Parse label file contents. `path` is only used for diagnostics.
pub fn parse_label_str(content: &str, path: &Path) -> LabelFile {
    let mut file = LabelFile::default();

    for (line_idx, line) in content.lines().enumerate() {
        match parse_label_line(line, path, line_idx + 1) {
            Ok(Some(label)) => file.boxes.push(label),
            Ok(None) => {}
            Err(err) => {
                warn!("Skipping label line: {err}");
                file.skipped_lines += 1;
            }
        }
    }

    file
}

/// Parse a single label line.
///
/// Blank lines give `Ok(None)`. Tokens after the fifth (confidence scores
/// and the like) are ignored.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelBox>, TilerError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().take(5).collect();
    if tokens.len() < 5 {
        return Err(TilerError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected at least 5 tokens, found {}", tokens.len()),
        });
    }

    let class_id = parse_class_token(tokens[0]).ok_or_else(|| TilerError::LabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message: format!(
            "invalid class_id '{}'; expected non-negative integer",
            tokens[0]
        ),
    })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    Ok(Some(LabelBox::new(class_id, cx, cy, w, h)))
}

/// Fuzz-only entrypoint for single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), TilerError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

// Some exporters write the class as a float ("3.0"); those are truncated.
fn parse_class_token(raw: &str) -> Option<u32> {
    if let Ok(id) = raw.parse::<u32>() {
        return Some(id);
    }

    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value < u32::MAX as f64 {
        Some(value.trunc() as u32)
    } else {
        None
    }
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, TilerError> {
    raw.parse::<f64>().map_err(|_| TilerError::LabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
    })
}

/// Format one box as a label line with 6 decimal places.
pub fn format_label_line(label: &LabelBox) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        label.class_id, label.cx, label.cy, label.w, label.h
    )
}

/// Write boxes as a label file, one line per box, without a trailing newline.
pub fn write_label_file(path: &Path, boxes: &[LabelBox]) -> Result<(), TilerError> {
    let content = boxes
        .iter()
        .map(format_label_line)
        .collect::<Vec<_>>()
        .join("\n");

    fs::write(path, content).map_err(TilerError::Io)
}
