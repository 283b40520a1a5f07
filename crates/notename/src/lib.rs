//! Utilities for deriving a note's filename from its content.
//!
//! A note is an ordered sequence of lines, optionally starting with a
//! `---`-delimited front matter block. The name of a note is taken from its
//! first level-1 heading, sanitized into a filesystem-legal form.

mod sanitize;

pub use self::sanitize::{sanitize, SanitizeOptions};

const FRONT_MATTER_DELIMITER: &str = "---";
const HEADING_MARKER: &str = "# ";

/// A located heading line, borrowed from the note content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingLine<'a> {
    /// 0-based index of the line the heading was found on.
    pub line_number: usize,
    /// Verbatim text after the `# ` marker, untrimmed.
    pub text: &'a str,
}

/// Returns the index of the first line of the note body.
///
/// When the very first line is exactly `---`, the body starts right after the
/// next lone `---` line closing the front matter block. An unclosed leading
/// `---` is ordinary content and the body starts at line 0.
pub fn find_note_start<S: AsRef<str>>(lines: &[S]) -> usize {
    if lines
        .first()
        .map(|line| line.as_ref() == FRONT_MATTER_DELIMITER)
        .unwrap_or(false)
    {
        for (index, line) in lines.iter().enumerate().skip(1) {
            if line.as_ref() == FRONT_MATTER_DELIMITER {
                return index + 1;
            }
        }
    }

    0
}

/// Scans from `start` for the first line beginning with `# `.
///
/// Only an exact level-1 marker counts, `##` and `#tag` do not. The returned
/// text is everything after the marker, left as is.
pub fn find_heading<'a>(lines: &[&'a str], start: usize) -> Option<HeadingLine<'a>> {
    lines
        .iter()
        .enumerate()
        .skip(start)
        .find_map(|(line_number, line)| {
            line.strip_prefix(HEADING_MARKER)
                .map(|text| HeadingLine { line_number, text })
        })
}

/// Locates the first usable heading of `content`, skipping the front matter.
pub fn first_heading(content: &str) -> Option<HeadingLine<'_>> {
    let lines: Vec<&str> = content.lines().collect();
    find_heading(&lines, find_note_start(&lines))
}
