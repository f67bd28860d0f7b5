//! Trailing line comments
//!
//! Finds and rewrites the `# ...` comment at the end of a single YAML line
//! without touching the code part of the line.

/// Byte offset of the `#` opening the trailing comment of `line`
///
/// A `#` only opens a comment at line start or after whitespace, and never
/// inside a quoted scalar.
#[must_use]
pub fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'"') => match b {
                b'\\' => i += 1,
                b'"' => quote = None,
                _ => {}
            },
            Some(q) => {
                if b == q {
                    // '' is an escaped quote inside single-quoted scalars
                    if bytes.get(i + 1) == Some(&q) {
                        i += 1;
                    } else {
                        quote = None;
                    }
                }
            }
            None => {
                if b == b'#' && (i == 0 || bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') {
                    return Some(i);
                }
                if (b == b'"' || b == b'\'') && opens_scalar(bytes, i) {
                    quote = Some(b);
                }
            }
        }
        i += 1;
    }
    None
}

fn opens_scalar(bytes: &[u8], at: usize) -> bool {
    let before = &bytes[..at];
    match before.iter().rposition(|b| !b.is_ascii_whitespace()) {
        None => true,
        Some(pos) => {
            let adjacent = before[at - 1];
            matches!(bytes[pos], b':' | b'-' | b'[' | b'{' | b',' | b'?')
                && (adjacent.is_ascii_whitespace() || matches!(adjacent, b'[' | b'{' | b','))
        }
    }
}

/// Text of the trailing comment, without `#` and surrounding whitespace
#[must_use]
pub fn trailing_comment(line: &str) -> Option<&str> {
    comment_start(line).map(|start| line[start + 1..].trim())
}

/// Replace (or add) the trailing comment of `line`
///
/// `line` must not contain its line terminator. Returns the rewritten line
/// as `<code> # <comment>`; the code part keeps its exact bytes apart from
/// trailing whitespace.
#[must_use]
pub fn with_trailing_comment(line: &str, comment: &str) -> String {
    let code = match comment_start(line) {
        Some(start) => &line[..start],
        None => line,
    };
    let code = code.trim_end();
    if code.is_empty() {
        format!("# {comment}")
    } else {
        format!("{code} # {comment}")
    }
}

/// Split a raw line into its content and its terminator (`\n`, `\r\n` or none)
#[must_use]
pub fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else {
        (raw, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_plain_comment() {
        assert_eq!(comment_start("a: 1 # note"), Some(5));
        assert_eq!(comment_start("# whole line"), Some(0));
        assert_eq!(comment_start("a: 1"), None);
    }

    #[test]
    fn hash_without_space_is_content() {
        assert_eq!(comment_start("image: nginx#latest"), None);
        assert_eq!(comment_start("url: http://x/#frag"), None);
    }

    #[test]
    fn ignores_hash_inside_quotes() {
        assert_eq!(comment_start(r#"a: "x # y""#), None);
        assert_eq!(comment_start("a: 'x # y'"), None);
        assert_eq!(comment_start(r#"a: "x \" # y" # real"#), Some(14));
        assert_eq!(comment_start("a: 'it''s # y' # real"), Some(15));
        assert_eq!(comment_start(r#"- "a # b""#), None);
        assert_eq!(comment_start(r#"a: ["x # y", 'z'] # c"#), Some(18));
    }

    #[test]
    fn apostrophe_inside_plain_scalar_is_not_a_quote() {
        assert_eq!(comment_start("msg: it's fine # c"), Some(15));
    }

    #[test]
    fn rewrites_comment() {
        assert_eq!(
            with_trailing_comment("  replicas: 3", r#"{"$openapi":"replicas"}"#),
            r#"  replicas: 3 # {"$openapi":"replicas"}"#
        );
        assert_eq!(
            with_trailing_comment("  list:", r#"{"$openapi":"list"}"#),
            r#"  list: # {"$openapi":"list"}"#
        );
        assert_eq!(
            with_trailing_comment(r#"  x: 1   # {"$openapi":"old"}"#, r#"{"$openapi":"new"}"#),
            r#"  x: 1 # {"$openapi":"new"}"#
        );
    }

    #[test]
    fn reads_trailing_comment() {
        assert_eq!(trailing_comment(r#"a: 1 # {"$openapi":"a"}"#), Some(r#"{"$openapi":"a"}"#));
        assert_eq!(trailing_comment("a: 1"), None);
    }

    #[test]
    fn splits_terminators() {
        assert_eq!(split_terminator("a: 1\r\n"), ("a: 1", "\r\n"));
        assert_eq!(split_terminator("a: 1\n"), ("a: 1", "\n"));
        assert_eq!(split_terminator("a: 1"), ("a: 1", ""));
    }
}
