//! Decides whether a document is skipped by the sync.

use headsync_config::HeadingSyncConfig;
use regex::Regex;
use std::path::Path;

/// Returns true when any ignore mechanism matches: the host exclusion
/// predicate, the explicit ignored-path list, or the ignore pattern.
pub fn is_ignored(
    path: &Path,
    settings: &HeadingSyncConfig,
    is_excluded: impl Fn(&Path) -> bool,
) -> bool {
    if is_excluded(path) {
        return true;
    }

    if settings
        .ignored_files
        .iter()
        .any(|ignored| Path::new(ignored) == path)
    {
        return true;
    }

    matches_ignore_pattern(&settings.ignore_pattern, &path.to_string_lossy())
}

/// Substring match of `path` against the configured pattern.
///
/// A pattern that fails to compile is treated as matching nothing; the
/// config layer already rejects invalid patterns when they are entered, so
/// this only guards against hand-edited config files.
pub fn matches_ignore_pattern(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    match Regex::new(pattern) {
        Ok(re) => re.is_match(path),
        Err(err) => {
            tracing::debug!(%err, pattern, "Ignoring invalid ignore pattern");
            false
        }
    }
}

/// Filters `candidates` down to the paths the pattern currently matches,
/// for the read-only listing in the settings UI.
pub fn matched_paths<'a, I>(pattern: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|path| matches_ignore_pattern(pattern, path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> HeadingSyncConfig {
        HeadingSyncConfig::default()
    }

    #[test]
    fn pattern_matches_as_substring() {
        assert!(matches_ignore_pattern("drafts/.*", "notes/drafts/todo.md"));
        assert!(!matches_ignore_pattern("drafts/.*", "notes/final/todo.md"));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        assert!(!matches_ignore_pattern("", "notes/drafts/todo.md"));
    }

    #[test]
    fn invalid_pattern_fails_open() {
        assert!(!matches_ignore_pattern("*[oops", "notes/todo.md"));
    }

    #[test]
    fn explicit_list_is_membership_only() {
        let mut settings = settings();
        settings.ignored_files = vec!["inbox/scratch.md".to_string()];
        assert!(is_ignored(
            Path::new("inbox/scratch.md"),
            &settings,
            |_| false
        ));
        assert!(!is_ignored(Path::new("inbox/other.md"), &settings, |_| false));
    }

    #[test]
    fn host_exclusion_predicate_wins() {
        assert!(is_ignored(Path::new("anything.md"), &settings(), |_| true));
        assert!(!is_ignored(Path::new("anything.md"), &settings(), |_| false));
    }

    #[test]
    fn any_mechanism_suffices() {
        let mut settings = settings();
        settings.ignore_pattern = "drafts/.*".to_string();
        assert!(is_ignored(
            Path::new("notes/drafts/todo.md"),
            &settings,
            |_| false
        ));
    }

    #[test]
    fn matched_paths_lists_current_matches() {
        let candidates = ["notes/drafts/a.md", "notes/b.md", "drafts/c.md"];
        assert_eq!(
            matched_paths("drafts/", candidates),
            vec!["notes/drafts/a.md", "drafts/c.md"]
        );
        assert!(matched_paths("", candidates).is_empty());
    }
}
