//! Heading text to filesystem-legal name sanitization.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

// Characters that are never allowed in a note name, regardless of settings.
static STOCK_ILLEGAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\\/:|#^\[\]]").unwrap());

/// Settings governing how a raw heading is turned into a name.
///
/// Owned by the configuration layer; treated as an immutable snapshot for the
/// duration of one [`sanitize`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Substitute for illegal content, possibly empty (plain deletion).
    pub replacement: String,
    /// Keep only ASCII letters/digits (plus the replacement characters),
    /// transliterating accented Latin letters first.
    pub alphanumeric_only: bool,
    /// User-specified literal strings to strip, applied after the stock set.
    pub illegal_symbols: Vec<String>,
}

/// Sanitizes a raw heading into a name legal for a filename.
///
/// The pipeline order is fixed: trim, stock illegal characters, the optional
/// alphanumeric-only filter, user symbols, then collapsing and stripping of
/// the replacement string. An empty result means there is no valid name.
pub fn sanitize(raw: &str, options: &SanitizeOptions) -> String {
    let replacement = options.replacement.as_str();

    let mut name = STOCK_ILLEGAL
        .replace_all(raw.trim(), NoExpand(replacement))
        .into_owned();

    if options.alphanumeric_only {
        name = restrict_to_alphanumeric(&name, replacement);
    }

    if let Some(user_illegal) = user_symbols_pattern(&options.illegal_symbols) {
        name = user_illegal
            .replace_all(&name, NoExpand(replacement))
            .into_owned();
    }

    if !replacement.is_empty() {
        name = collapse_replacement_runs(&name, replacement);
        if let Some(stripped) = name.strip_suffix(replacement) {
            name.truncate(stripped.len());
        }
    }

    name
}

/// Builds one combined alternation over all non-empty user symbols, each
/// escaped so it matches literally.
fn user_symbols_pattern(symbols: &[String]) -> Option<Regex> {
    let escaped: Vec<String> = symbols
        .iter()
        .filter(|symbol| !symbol.is_empty())
        .map(|symbol| regex::escape(symbol))
        .collect();

    if escaped.is_empty() {
        return None;
    }

    // The alternation of escaped literals is always a valid pattern.
    Regex::new(&escaped.join("|")).ok()
}

fn restrict_to_alphanumeric(text: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.chars() {
        let ch = unaccent(ch);
        if ch.is_ascii_alphanumeric() || replacement.contains(ch) {
            out.push(ch);
        } else {
            out.push_str(replacement);
        }
    }

    out
}

fn collapse_replacement_runs(text: &str, replacement: &str) -> String {
    let escaped = regex::escape(replacement);
    match Regex::new(&format!("(?:{escaped}){{2,}}")) {
        Ok(runs) => runs.replace_all(text, NoExpand(replacement)).into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Transliterates accented Latin vowels and n to their unaccented ASCII
/// equivalent. The table is fixed and not configurable.
fn unaccent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'Á' | 'À' | 'Â' | 'Ä' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        _ => ch,
    }
}
