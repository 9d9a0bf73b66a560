//! Inline markup → styled runs.
//!
//! Paragraph bodies arrive as lightweight HTML-ish markup from the form
//! editor. We recognise a small tag set (`b`/`strong`, `i`/`em`, `u`, `br`)
//! which may nest; anything else is kept as literal text. Parsing never
//! fails.

use serde::{Deserialize, Serialize};

/// Inline style of a run. Flags combine freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

impl RunStyle {
    pub const NORMAL: RunStyle = RunStyle {
        bold: false,
        italic: false,
        underline: false,
    };

    pub const BOLD: RunStyle = RunStyle {
        bold: true,
        italic: false,
        underline: false,
    };

    pub const ITALIC: RunStyle = RunStyle {
        bold: false,
        italic: true,
        underline: false,
    };

    pub const UNDERLINE: RunStyle = RunStyle {
        bold: false,
        italic: false,
        underline: true,
    };
}

/// A contiguous span of plain text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    #[serde(default)]
    pub style: RunStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::NORMAL)
    }
}

/// Insert a second space after every sentence-ending period.
///
/// A period followed by exactly one space, with a non-whitespace character
/// after that space, becomes a period followed by two spaces. Applying the
/// transform twice is the same as applying it once.
pub fn normalize_sentence_spacing(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if c == '.'
            && chars.get(i + 1) == Some(&' ')
            && chars.get(i + 2).is_some_and(|next| !next.is_whitespace())
        {
            out.push(' ');
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineTag {
    Bold,
    Italic,
    Underline,
    Break,
}

fn classify_tag(name: &str) -> Option<InlineTag> {
    match name.to_ascii_lowercase().as_str() {
        "b" | "strong" => Some(InlineTag::Bold),
        "i" | "em" => Some(InlineTag::Italic),
        "u" => Some(InlineTag::Underline),
        "br" => Some(InlineTag::Break),
        _ => None,
    }
}

/// A recognised tag token: `(tag, closing)`. Attributes are ignored.
fn parse_tag(raw: &str) -> Option<(InlineTag, bool)> {
    let inner = raw.strip_prefix('<')?.strip_suffix('>')?.trim();
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, inner),
    };
    let inner = inner.trim_end_matches('/').trim_end();
    let name = inner.split_whitespace().next()?;
    let tag = classify_tag(name)?;
    Some((tag, closing))
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "&amp;" => Some('&'),
        "&lt;" => Some('<'),
        "&gt;" => Some('>'),
        "&quot;" => Some('"'),
        "&#39;" | "&apos;" => Some('\''),
        "&nbsp;" => Some(' '),
        _ => None,
    }
}

struct RunBuilder {
    runs: Vec<StyledRun>,
    current: String,
    style: RunStyle,
}

impl RunBuilder {
    fn push_char(&mut self, c: char, style: RunStyle) {
        if style != self.style {
            self.flush();
            self.style = style;
        }
        self.current.push(c);
    }

    fn push_str(&mut self, s: &str, style: RunStyle) {
        for c in s.chars() {
            self.push_char(c, style);
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.runs
                .push(StyledRun::new(std::mem::take(&mut self.current), self.style));
        }
    }
}

/// Parse inline markup into an ordered list of non-empty styled runs.
///
/// Newlines are kept in the run text; the line wrapper treats them as
/// explicit breaks. Unmatched closing tags and unknown tags are literal.
pub fn parse_to_runs(markup: &str) -> Vec<StyledRun> {
    let mut builder = RunBuilder {
        runs: Vec::new(),
        current: String::new(),
        style: RunStyle::NORMAL,
    };
    let (mut bold, mut italic, mut underline) = (0u32, 0u32, 0u32);

    let mut rest = markup;
    while let Some(c) = rest.chars().next() {
        let style = RunStyle {
            bold: bold > 0,
            italic: italic > 0,
            underline: underline > 0,
        };

        if c == '<' {
            if let Some(end) = rest.find('>') {
                let raw = &rest[..=end];
                if let Some((tag, closing)) = parse_tag(raw) {
                    let depth = match tag {
                        InlineTag::Bold => Some(&mut bold),
                        InlineTag::Italic => Some(&mut italic),
                        InlineTag::Underline => Some(&mut underline),
                        InlineTag::Break => None,
                    };
                    match (depth, closing) {
                        (None, _) => builder.push_char('\n', style),
                        (Some(d), false) => *d += 1,
                        (Some(d), true) if *d > 0 => *d -= 1,
                        (Some(_), true) => builder.push_str(raw, style),
                    }
                    rest = &rest[end + 1..];
                    continue;
                }
            }
        } else if c == '&' {
            if let Some(end) = rest.find(';').filter(|&e| e <= 6) {
                if let Some(decoded) = decode_entity(&rest[..=end]) {
                    builder.push_char(decoded, style);
                    rest = &rest[end + 1..];
                    continue;
                }
            }
        }

        let c = if c == '\r' { '\n' } else { c };
        if !(c == '\n' && rest.starts_with("\r\n")) {
            builder.push_char(c, style);
        }
        rest = &rest[c_len(rest)..];
    }

    builder.flush();
    builder.runs
}

fn c_len(s: &str) -> usize {
    s.chars().next().map(char::len_utf8).unwrap_or(0)
}

/// Concatenated plain text of a run list.
pub fn plain_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_space_after_period() {
        assert_eq!(
            normalize_sentence_spacing("One. Two. Three."),
            "One.  Two.  Three."
        );
    }

    #[test]
    fn spacing_leaves_existing_double_space_and_trailing() {
        assert_eq!(normalize_sentence_spacing("Done.  Next. "), "Done.  Next. ");
        assert_eq!(normalize_sentence_spacing("End."), "End.");
        assert_eq!(normalize_sentence_spacing("a. \nb"), "a. \nb");
    }

    #[test]
    fn spacing_is_idempotent() {
        let inputs = [
            "",
            "a. b. c",
            "x.  y. z.   w",
            "1. 2.3. 4",
            "no periods here",
            ". . .",
        ];
        for input in inputs {
            let once = normalize_sentence_spacing(input);
            assert_eq!(normalize_sentence_spacing(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn parse_plain_text() {
        let runs = parse_to_runs("Hello world");
        assert_eq!(runs, vec![StyledRun::plain("Hello world")]);
    }

    #[test]
    fn parse_nested_styles() {
        let runs = parse_to_runs("a <b>bold <i>both</i></b> <u>under</u>");
        assert_eq!(runs.len(), 5);
        assert_eq!(runs[1], StyledRun::new("bold ", RunStyle::BOLD));
        assert_eq!(
            runs[2].style,
            RunStyle {
                bold: true,
                italic: true,
                underline: false
            }
        );
        assert_eq!(runs[4], StyledRun::new("under", RunStyle::UNDERLINE));
    }

    #[test]
    fn unknown_tags_are_literal() {
        let runs = parse_to_runs("x <span>y</span> </b>");
        assert_eq!(plain_text(&runs), "x <span>y</span> </b>");
        assert!(runs.iter().all(|r| r.style == RunStyle::NORMAL));
    }

    #[test]
    fn empty_runs_are_dropped() {
        let runs = parse_to_runs("<b></b>text<i></i>");
        assert_eq!(runs, vec![StyledRun::plain("text")]);
        assert!(parse_to_runs("").is_empty());
    }

    #[test]
    fn br_and_entities() {
        let runs = parse_to_runs("a<br/>b &amp; c&lt;d &bogus; e");
        assert_eq!(plain_text(&runs), "a\nb & c<d &bogus; e");
    }

    #[test]
    fn crlf_becomes_single_break() {
        assert_eq!(plain_text(&parse_to_runs("a\r\nb")), "a\nb");
    }

    #[test]
    fn strong_em_aliases_case_insensitive() {
        let runs = parse_to_runs("<STRONG>x</STRONG><Em>y</Em>");
        assert_eq!(runs[0].style, RunStyle::BOLD);
        assert!(runs[1].style.italic);
    }
}
