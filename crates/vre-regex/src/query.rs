/// The raw query string split into its `cmd/pattern/flag` or
/// `cmd/pattern/replace/flag` fields, before the pattern's `\/` escapes are
/// resolved and the pattern is compiled.
///
/// `cmd` and `flag` are captured but never interpreted by the core (open
/// question (a) in the design notes): a future host can read them off a
/// compiled [`crate::Program`] without any change to this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub cmd: String,
    pub pattern: String,
    pub replace: Option<String>,
    pub flag: String,
}

/// Splits `input` on `/`, treating `\/` as a literal slash rather than a
/// field delimiter. Fields keep their raw text (including the backslash of
/// an escaped slash) — unescaping only ever happens when a `pattern` field
/// is compiled into a regex, never during this split.
fn split_fields(input: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(escaped) = chars.next() {
                current.push(escaped);
            }
            continue;
        }
        if c == '/' {
            fields.push(std::mem::take(&mut current));
            continue;
        }
        current.push(c);
    }
    fields.push(current);
    fields
}

/// Parses a raw query string into its fields. Valid shapes are exactly
/// `cmd/pattern/flag` (3 fields) or `cmd/pattern/replace/flag` (4 fields);
/// any other field count, or an empty `pattern`, is a parse failure.
pub fn parse(input: &str) -> Option<ParsedQuery> {
    let fields = split_fields(input);
    let parsed = match fields.len() {
        3 => ParsedQuery {
            cmd: fields[0].clone(),
            pattern: fields[1].clone(),
            replace: None,
            flag: fields[2].clone(),
        },
        4 => ParsedQuery {
            cmd: fields[0].clone(),
            pattern: fields[1].clone(),
            replace: Some(fields[2].clone()),
            flag: fields[3].clone(),
        },
        _ => return None,
    };

    if parsed.pattern.is_empty() {
        return None;
    }

    Some(parsed)
}

/// Replaces escaped slashes (`\/`) with a literal `/`, as the last step
/// before a `pattern` field is handed to the regex compiler.
pub fn unescape_pattern(pattern: &str) -> String {
    pattern.replace("\\/", "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_fields_have_no_replace() {
        let q = parse("a/b/c").unwrap();
        assert_eq!(q.cmd, "a");
        assert_eq!(q.pattern, "b");
        assert_eq!(q.replace, None);
        assert_eq!(q.flag, "c");
    }

    #[test]
    fn four_fields_carry_a_replace() {
        let q = parse("a/b/c/d").unwrap();
        assert_eq!(q.cmd, "a");
        assert_eq!(q.pattern, "b");
        assert_eq!(q.replace.as_deref(), Some("c"));
        assert_eq!(q.flag, "d");
    }

    #[test]
    fn escaped_slash_stays_inside_a_field() {
        let q = parse(r"a\/b/c/d").unwrap();
        assert_eq!(q.cmd, r"a\/b");
        assert_eq!(q.pattern, "c");
        assert_eq!(q.replace, None);
        assert_eq!(q.flag, "d");
    }

    #[test]
    fn backslash_before_escaped_slash_is_its_own_pair() {
        let q = parse(r"a\\/x/y/z").unwrap();
        assert_eq!(q.cmd, r"a\\");
        assert_eq!(q.pattern, "x");
        assert_eq!(q.replace.as_deref(), Some("y"));
        assert_eq!(q.flag, "z");
    }

    #[test]
    fn wrong_field_counts_fail() {
        assert_eq!(parse("a/b"), None);
        assert_eq!(parse("a/b/c/d/e"), None);
    }

    #[test]
    fn empty_pattern_fails_regardless_of_shape() {
        assert_eq!(parse("a//c"), None);
        assert_eq!(parse("a//c/d"), None);
    }

    #[test]
    fn unescape_resolves_literal_slash() {
        assert_eq!(unescape_pattern(r"foo\/bar"), "foo/bar");
    }
}
