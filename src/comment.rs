//! Tag sanitization and dialect-aware comment placement.

use std::borrow::Cow;

/// Where a backend expects the annotation comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// `/* tag */ sql ` — MySQL's `SHOW PROCESSLIST` truncates long
    /// statements, so the comment goes first.
    Leading,
    /// `sql /* tag */` — backends whose activity views show the full
    /// statement text.
    Trailing,
}

/// Engine identifier to comment placement. Engines not listed here get no
/// annotation at all.
static ENGINE_PLACEMENTS: &[(&str, Placement)] = &[
    ("mysql", Placement::Leading),
    ("mariadb", Placement::Leading),
    ("postgres", Placement::Trailing),
    ("postgresql", Placement::Trailing),
    ("sqlite", Placement::Trailing),
    ("sqlite3", Placement::Trailing),
];

fn placement_for(engine: &str) -> Option<Placement> {
    ENGINE_PLACEMENTS
        .iter()
        .find(|(name, _)| engine.eq_ignore_ascii_case(name))
        .map(|(_, placement)| *placement)
}

/// Neutralize characters that would let a tag escape the comment.
///
/// `*` becomes `_` so the tag can never contain the `*/` terminator, and a
/// lone `%` becomes `%%` so the tag can never be read as a parameter
/// placeholder. A `%%` pair is already escaped and is left alone, which makes
/// sanitizing idempotent.
fn sanitize(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut chars = tag.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push('_'),
            '%' => {
                if chars.peek() == Some(&'%') {
                    chars.next();
                }
                out.push_str("%%");
            }
            _ => out.push(c),
        }
    }
    out
}

/// Embed `tag` into `sql` as a comment appropriate for `engine`.
///
/// Returns the SQL unchanged (borrowed, byte-identical) when there is no tag,
/// the tag is empty, or the engine is not recognized. Never fails; a tag is
/// sanitized rather than rejected.
///
/// # Example
///
/// ```rust
/// use sea_orm_query_tag::annotate;
///
/// assert_eq!(
///     annotate("SELECT 1", Some("/login"), "mysql"),
///     "/* /login */ SELECT 1 "
/// );
/// assert_eq!(annotate("SELECT 1", None, "mysql"), "SELECT 1");
/// ```
pub fn annotate<'a>(sql: &'a str, tag: Option<&str>, engine: &str) -> Cow<'a, str> {
    let tag = match tag {
        Some(tag) if !tag.is_empty() => tag,
        _ => return Cow::Borrowed(sql),
    };

    let placement = match placement_for(engine) {
        Some(placement) => placement,
        None => return Cow::Borrowed(sql),
    };

    let tag = sanitize(tag);
    match placement {
        Placement::Leading => Cow::Owned(format!("/* {tag} */ {sql} ")),
        Placement::Trailing => Cow::Owned(format!("{sql} /* {tag} */")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_placement() {
        assert_eq!(
            annotate("SELECT 1", Some("/login"), "mysql"),
            "/* /login */ SELECT 1 "
        );
    }

    #[test]
    fn test_trailing_placement() {
        assert_eq!(
            annotate("SELECT 1", Some("a*b%c"), "sqlite3"),
            "SELECT 1 /* a_b%%c */"
        );
        assert_eq!(
            annotate("DELETE FROM carts", Some("/checkout"), "postgres"),
            "DELETE FROM carts /* /checkout */"
        );
    }

    #[test]
    fn test_engine_name_case_insensitive() {
        assert_eq!(
            annotate("SELECT 1", Some("/login"), "MySQL"),
            "/* /login */ SELECT 1 "
        );
    }

    #[test]
    fn test_no_tag_is_passthrough() {
        assert!(matches!(
            annotate("SELECT 1", None, "mysql"),
            Cow::Borrowed("SELECT 1")
        ));
    }

    #[test]
    fn test_empty_tag_is_passthrough() {
        assert!(matches!(
            annotate("SELECT 1", Some(""), "mysql"),
            Cow::Borrowed("SELECT 1")
        ));
    }

    #[test]
    fn test_unknown_engine_is_passthrough() {
        assert!(matches!(
            annotate("SELECT 1", Some("/login"), "unknown_db"),
            Cow::Borrowed("SELECT 1")
        ));
    }

    #[test]
    fn test_sanitize_neutralizes_comment_terminator() {
        let annotated = annotate("SELECT 1", Some("evil */ DROP TABLE users; --"), "postgres");
        assert_eq!(
            annotated,
            "SELECT 1 /* evil _/ DROP TABLE users; -- */"
        );
    }

    #[test]
    fn test_sanitize_escapes_placeholders() {
        assert_eq!(sanitize("100%"), "100%%");
        assert_eq!(sanitize("a*b%c"), "a_b%%c");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for tag in ["a*b%c", "100%", "%%", "%%%", "plain", "*%*%"] {
            let once = sanitize(tag);
            assert_eq!(sanitize(&once), once, "tag {tag:?} re-escaped");
        }
    }
}
