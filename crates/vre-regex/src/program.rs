use crate::query::{self, ParsedQuery};
use regex::bytes::Regex;
use vre_model::Interval;

/// A compiled query: a matcher plus, in replace mode, the template used to
/// expand each match.
///
/// Matching is always capped at the first match per line: a line either has
/// "the" match or it doesn't, so only one `Interval` is ever recorded per
/// slot.
pub struct Program {
    parsed: ParsedQuery,
    regex: Regex,
}

impl Program {
    /// Parses and compiles `input`. Returns `None` on a parse failure (wrong
    /// field shape, empty pattern) or a regex compile failure — both cases
    /// the Engine treats identically: no Program, scanning paused.
    pub fn compile(input: &str) -> Option<Program> {
        let parsed = query::parse(input)?;
        let pattern = query::unescape_pattern(&parsed.pattern);
        let regex = Regex::new(&pattern).ok()?;
        Some(Program { parsed, regex })
    }

    pub fn cmd(&self) -> &str {
        &self.parsed.cmd
    }

    pub fn flag(&self) -> &str {
        &self.parsed.flag
    }

    pub fn has_replace(&self) -> bool {
        self.parsed.replace.is_some()
    }

    /// Find mode: at most one match per line.
    pub fn find(&self, line: &[u8]) -> Option<Interval> {
        self.regex
            .find(line)
            .map(|m| Interval::new(m.start(), m.end()))
    }

    /// Replace mode: builds the new line (original prefix + expansion +
    /// original suffix) and returns the original match bounds, the bounds
    /// of the expansion within the new line, and the new line itself.
    ///
    /// Panics if this `Program` has no `replace` template — callers must
    /// check [`Self::has_replace`] first.
    pub fn replace(&self, line: &[u8]) -> Option<(Interval, Interval, Vec<u8>)> {
        let template = self
            .parsed
            .replace
            .as_ref()
            .expect("replace() called on a find-only Program");
        let caps = self.regex.captures(line)?;
        let m = caps.get(0).expect("capture group 0 always matches");

        let mut new_line = Vec::with_capacity(line.len());
        new_line.extend_from_slice(&line[..m.start()]);
        let expansion_start = new_line.len();
        caps.expand(template.as_bytes(), &mut new_line);
        let expansion_end = new_line.len();
        new_line.extend_from_slice(&line[m.end()..]);

        Some((
            Interval::new(m.start(), m.end()),
            Interval::new(expansion_start, expansion_end),
            new_line,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_mode_locates_first_match_only() {
        let prog = Program::compile("/foo/").unwrap();
        assert!(!prog.has_replace());
        let interval = prog.find(b"foofoo").unwrap();
        assert_eq!((interval.start, interval.end), (0, 3));
    }

    #[test]
    fn no_match_returns_none() {
        let prog = Program::compile("/zzz/").unwrap();
        assert_eq!(prog.find(b"foo"), None);
    }

    #[test]
    fn replace_mode_expands_capture_groups() {
        let prog = Program::compile(r"/(\w+)@(\w+)/$2:$1/").unwrap();
        assert!(prog.has_replace());
        let (old, new, line) = prog.replace(b"user@host rest").unwrap();
        assert_eq!((old.start, old.end), (0, 9));
        assert_eq!(&line[new.start..new.end], b"host:user");
        assert_eq!(&line[..], b"host:user rest");
    }

    #[test]
    fn replace_preserves_prefix_and_suffix() {
        let prog = Program::compile("/foo/FOO/").unwrap();
        let (_, _, line) = prog.replace(b"xxfooyy").unwrap();
        assert_eq!(&line[..], b"xxFOOyy");
    }

    #[test]
    fn invalid_pattern_yields_no_program() {
        assert!(Program::compile("/(/0/").is_none());
        assert!(Program::compile("/b").is_none());
    }

    #[test]
    fn cmd_and_flag_are_captured_but_unused() {
        let prog = Program::compile("cmdtext/foo/flagtext").unwrap();
        assert_eq!(prog.cmd(), "cmdtext");
        assert_eq!(prog.flag(), "flagtext");
    }
}
