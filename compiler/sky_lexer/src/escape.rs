//! String escape processing.

/// Resolve backslash escapes in string literal content.
///
/// Unknown escapes are kept verbatim (backslash included).
pub(crate) fn unescape_string(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_escapes() {
        assert_eq!(unescape_string(r#"a\nb\t\"q\"\\"#), "a\nb\t\"q\"\\");
    }

    #[test]
    fn unknown_escape_is_kept() {
        assert_eq!(unescape_string(r"\d+"), r"\d+");
    }

    #[test]
    fn escaped_newline_joins_lines() {
        assert_eq!(unescape_string("a\\\nb"), "ab");
    }
}
