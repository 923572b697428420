//! Discovery of user-edited regions inside generated implementation files.
//!
//! A region is delimited by a `<prefix>BEGIN <name>` line and a `<prefix>END <name>` line, where
//! `<prefix>` is the line-comment token of the implementation language. Marker lines may be
//! indented; otherwise they must match exactly, so `foo` never matches the markers of `foo_bar`.

use serde::Serialize;

use crate::error::ReportError;

/// A `[start_line, end_line)` span of 1-based line numbers. An empty region has
/// `start_line == end_line`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionPlace {
    pub start_line: usize,
    pub end_line: usize,
}

impl FunctionPlace {
    pub fn len(&self) -> usize {
        self.end_line - self.start_line
    }

    pub fn is_empty(&self) -> bool {
        self.start_line == self.end_line
    }
}

/// Marker line pair of one function.
struct Markers {
    begin: String,
    end: String,
}

impl Markers {
    fn new(prefix: &str, name: &str) -> Result<Self, ReportError> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ReportError::InvalidMarkerName(name.to_string()));
        }
        Ok(Self {
            begin: format!("{prefix}BEGIN {name}"),
            end: format!("{prefix}END {name}"),
        })
    }
}

/// Finds the region of function `name` in `text`. The first END after the first BEGIN closes the
/// region; a missing pair yields `None`.
pub fn find_place(
    text: &str,
    prefix: &str,
    name: &str,
) -> Result<Option<FunctionPlace>, ReportError> {
    let markers = Markers::new(prefix, name)?;
    let mut lines = text.lines().map(str::trim).zip(1..);

    let Some((_, begin_line)) = lines.find(|(line, _)| *line == markers.begin) else {
        return Ok(None);
    };
    match lines.find(|(line, _)| *line == markers.end) {
        Some((_, end_line)) => Ok(Some(FunctionPlace {
            start_line: begin_line + 1,
            end_line,
        })),
        None => {
            tracing::warn!(function = name, line = begin_line, "BEGIN marker without END marker");
            Ok(None)
        }
    }
}
