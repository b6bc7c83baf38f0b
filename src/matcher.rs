//! Glob matching for unpack rules.
//!
//! Supports literal segments, `*` within a segment, `{a,b}` brace
//! alternation, and `**` matching zero or more whole segments. Matching is
//! case-sensitive and operates on forward-slash paths; host backslashes are
//! normalized before evaluation.

/// Normalize a relative path to forward slashes.
#[must_use]
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Test whether `path` satisfies `pattern`.
#[must_use]
pub fn matches(pattern: &str, path: &str) -> bool {
    let path = normalize(path);
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    expand_braces(pattern).iter().any(|expanded| {
        let pattern_segments: Vec<&str> =
            expanded.split('/').filter(|s| !s.is_empty()).collect();
        match_segments(&pattern_segments, &path_segments)
    })
}

/// Test whether a file at `rel` is selected by any file-unpack rule.
///
/// A rule matches either the path's final segment or the full relative
/// path, so `*.png` and `dir2/*.png` both work.
#[must_use]
pub fn is_unpacked_file(rel: &str, rules: &[String]) -> bool {
    let rel = normalize(rel);
    let name = rel.rsplit('/').next().unwrap_or(rel.as_str());
    rules
        .iter()
        .any(|rule| matches(rule, name) || matches(rule, &rel))
}

/// Test whether the directory at `rel` is selected by any directory-unpack
/// rule. Propagation to descendants is the tree builder's job.
#[must_use]
pub fn is_unpacked_dir(rel: &str, rules: &[String]) -> bool {
    let rel = normalize(rel);
    rules.iter().any(|rule| matches(rule, &rel))
}

/// Expand `{a,b,...}` groups into plain alternatives. Nested groups are
/// expanded recursively; an unmatched brace is treated as a literal.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    for (i, byte) in pattern.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let body = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    let mut alternatives = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, byte) in body.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                alternatives.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    alternatives.push(&body[start..]);

    let mut expanded = Vec::new();
    for alternative in alternatives {
        expanded.extend(expand_braces(&format!("{prefix}{alternative}{suffix}")));
    }
    expanded
}

/// Match pattern segments against path segments. `**` consumes zero or
/// more whole segments.
fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    let Some((first, rest)) = pattern.split_first() else {
        return path.is_empty();
    };
    if *first == "**" {
        return (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]));
    }
    match path.split_first() {
        Some((segment, remaining)) => {
            match_segment(first, segment) && match_segments(rest, remaining)
        }
        None => false,
    }
}

/// Match a single segment, where `*` matches any run of characters.
fn match_segment(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_chars(&pattern, &text, 0, 0)
}

fn match_chars(pattern: &[char], text: &[char], pi: usize, ti: usize) -> bool {
    if pi == pattern.len() {
        return ti == text.len();
    }
    match pattern[pi] {
        '*' => (ti..=text.len()).any(|i| match_chars(pattern, text, pi + 1, i)),
        c => ti < text.len() && text[ti] == c && match_chars(pattern, text, pi + 1, ti + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_and_star() {
        assert!(matches("dir2", "dir2"));
        assert!(!matches("dir2", "dir1"));
        assert!(!matches("dir2", "dir2/subdir"));
        assert!(matches("*.png", "file2.png"));
        assert!(!matches("*.png", "file3.txt"));
        assert!(matches("dir2/*.png", "dir2/file2.png"));
        assert!(!matches("dir2/*.png", "dir1/file2.png"));
    }

    #[test]
    fn star_stays_within_one_segment() {
        assert!(!matches("*", "dir1/file1.txt"));
        assert!(matches("*/*", "dir1/file1.txt"));
    }

    #[test]
    fn case_sensitive() {
        assert!(!matches("Dir2", "dir2"));
    }

    #[test]
    fn brace_groups() {
        assert!(matches("{x1,x2}", "x1"));
        assert!(matches("{x1,x2}", "x2"));
        assert!(!matches("{x1,x2}", "y3"));
        assert!(matches("y3/{x1,z1}", "y3/z1"));
        assert!(!matches("y3/{x1,z1}", "y3/y2"));
    }

    #[test]
    fn globstar_matches_any_depth() {
        assert!(matches("**/{x1,x2}", "x1"));
        assert!(matches("**/{x1,x2}", "y3/x1"));
        assert!(matches("**/{x1,x2}", "y3/z1/x2"));
        assert!(!matches("**/{x1,x2}", "y3/z1"));
    }

    #[test]
    fn file_rules_match_name_or_full_path() {
        let rules = vec!["*.png".to_string()];
        assert!(is_unpacked_file("dir2/file2.png", &rules));
        assert!(!is_unpacked_file("dir2/file3.txt", &rules));

        let rules = vec!["dir2/*.png".to_string()];
        assert!(is_unpacked_file("dir2/file2.png", &rules));
        assert!(!is_unpacked_file("dir1/file2.png", &rules));
    }

    #[test]
    fn dir_rules_match_relative_path() {
        let rules = vec!["dir2/subdir".to_string()];
        assert!(is_unpacked_dir("dir2/subdir", &rules));
        assert!(!is_unpacked_dir("dir2", &rules));
    }

    #[test]
    fn backslashes_are_normalized() {
        assert!(matches("dir2/*.png", "dir2\\file2.png"));
    }
}
