//! Pure line-rendering: tab expansion, interval remapping, and SGR
//! highlighting. Kept free of any crossterm/TTY dependency so it can be
//! tested without a real terminal.

use vre_model::Interval;

/// The two named styles `render_line` switches between, plus the reset
/// sequence emitted at the end of every rendered line.
#[derive(Debug, Clone, Copy)]
pub struct LineStyle {
    pub base: &'static str,
    pub highlight: &'static str,
    pub reset: &'static str,
}

pub const DEFAULT_STYLE: LineStyle = LineStyle {
    base: "\x1b[90m",
    highlight: "\x1b[97;41m",
    reset: "\x1b[0m",
};

pub const HEADER_STYLE: &str = "\x1b[1;36m";

/// Expands `\t` into spaces up to the next multiple of `tabstop`, and
/// remaps `interval`'s boundaries to the corresponding positions in the
/// expanded bytes so a highlight stays aligned with the text it marked.
pub fn expand_tabs(bytes: &[u8], interval: Option<Interval>, tabstop: usize) -> (Vec<u8>, Option<Interval>) {
    let mut out = Vec::with_capacity(bytes.len());
    let mut new_start = interval.map(|iv| iv.start);
    let mut new_end = interval.map(|iv| iv.end);

    for (idx, &b) in bytes.iter().enumerate() {
        if interval.is_some_and(|iv| iv.start == idx) {
            new_start = Some(out.len());
        }
        if interval.is_some_and(|iv| iv.end == idx) {
            new_end = Some(out.len());
        }
        if b == b'\t' {
            let next_stop = (out.len() / tabstop + 1) * tabstop;
            out.resize(next_stop, b' ');
        } else {
            out.push(b);
        }
    }
    if interval.is_some_and(|iv| iv.end == bytes.len()) {
        new_end = Some(out.len());
    }

    let remapped = match (new_start, new_end) {
        (Some(s), Some(e)) => Some(Interval::new(s, e)),
        _ => None,
    };
    (out, remapped)
}

/// Renders one line's bytes into the column window `[a, b)`, expanding tabs
/// first and highlighting `interval` (if any and if it survives clipping to
/// the window) in `style.highlight`, the rest in `style.base`.
///
/// `a > len(expanded)` blank-pads to width `b - a`, matching the renderer's
/// convention for a line shorter than the current horizontal scroll.
pub fn render_line(bytes: &[u8], interval: Option<Interval>, a: usize, b: usize, style: &LineStyle) -> String {
    let (expanded, interval) = expand_tabs(bytes, interval, vre_model::TABSTOP);
    let len = expanded.len();
    if a >= len {
        return " ".repeat(b.saturating_sub(a));
    }
    let end = b.min(len);
    let window = &expanded[a..end];

    let clip = |x: usize| x.saturating_sub(a).min(window.len());
    let highlight = interval.and_then(|iv| {
        let s = clip(iv.start.max(a));
        let e = clip(iv.end);
        (s < e).then_some((s, e))
    });

    let mut out = String::new();
    match highlight {
        None => {
            out.push_str(style.base);
            out.push_str(&String::from_utf8_lossy(window));
        }
        Some((s, e)) => {
            out.push_str(style.base);
            out.push_str(&String::from_utf8_lossy(&window[..s]));
            out.push_str(style.highlight);
            out.push_str(&String::from_utf8_lossy(&window[s..e]));
            out.push_str(style.base);
            out.push_str(&String::from_utf8_lossy(&window[e..]));
        }
    }
    out.push_str(style.reset);
    out
}

/// Splits a replace-mode row in half: the original line (with its match
/// highlighted) on the left, the substituted line (with the expansion
/// highlighted) on the right, separated by a vertical bar.
pub fn render_split(
    original: &[u8],
    original_interval: Option<Interval>,
    substituted: &[u8],
    substituted_interval: Option<Interval>,
    width: usize,
    style: &LineStyle,
) -> String {
    let left_width = width / 2;
    let right_width = width.saturating_sub(left_width + 1);
    let left = render_line(original, original_interval, 0, left_width, style);
    let right = render_line(substituted, substituted_interval, 0, right_width, style);
    format!("{left}{reset}|{right}", reset = style.reset)
}

fn strip_sgr(rendered: &str) -> String {
    let mut out = String::new();
    let mut chars = rendered.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_expansion_pads_to_next_stop() {
        let (expanded, _) = expand_tabs(b"\tfoo", None, 8);
        assert_eq!(expanded, b"        foo");
    }

    #[test]
    fn interval_boundaries_shift_with_leading_tab() {
        let (expanded, interval) = expand_tabs(b"\tfoo", Some(Interval::new(1, 4)), 8);
        assert_eq!(expanded, b"        foo");
        let interval = interval.unwrap();
        assert_eq!((interval.start, interval.end), (8, 11));
    }

    #[test]
    fn interval_at_line_end_is_preserved() {
        let (_, interval) = expand_tabs(b"foo", Some(Interval::new(0, 3)), 8);
        assert_eq!(interval, Some(Interval::new(0, 3)));
    }

    #[test]
    fn render_line_strips_to_visible_text_with_no_match() {
        let rendered = render_line(b"hello world", None, 0, 20, &DEFAULT_STYLE);
        assert_eq!(strip_sgr(&rendered), "hello world");
    }

    #[test]
    fn render_line_highlights_only_the_matched_span() {
        let rendered = render_line(b"foobar", Some(Interval::new(0, 3)), 0, 20, &DEFAULT_STYLE);
        assert_eq!(strip_sgr(&rendered), "foobar");
        assert!(rendered.contains(DEFAULT_STYLE.highlight));
        assert!(rendered.contains("foo"));
    }

    #[test]
    fn render_line_clips_match_to_the_visible_window() {
        // bytes: x x f o o y y (indices 0..7); window [3,6) = "ooy"; the
        // match [2,5) clips to [3,5) = "oo" inside that window.
        let rendered = render_line(b"xxfooyy", Some(Interval::new(2, 5)), 3, 6, &DEFAULT_STYLE);
        assert_eq!(strip_sgr(&rendered), "ooy");
        assert!(rendered.contains(DEFAULT_STYLE.highlight));
    }

    #[test]
    fn render_line_blank_pads_past_end_of_line() {
        let rendered = render_line(b"hi", None, 10, 15, &DEFAULT_STYLE);
        assert_eq!(rendered, "     ");
    }

    #[test]
    fn render_split_joins_both_halves_with_a_bar() {
        let rendered = render_split(
            b"foo bar",
            Some(Interval::new(0, 3)),
            b"FOO bar",
            Some(Interval::new(0, 3)),
            20,
            &DEFAULT_STYLE,
        );
        assert!(strip_sgr(&rendered).contains('|'));
    }
}
