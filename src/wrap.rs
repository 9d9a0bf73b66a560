//! Rich-text line wrapper.
//!
//! Runs are flattened into one styled character stream and broken greedily
//! at whitespace. A newline in the stream is an explicit break and always
//! ends the current line. A word wider than the whole line is placed alone
//! on its line rather than split.
//!
//! Positions handed out in [`LayoutLine::start`] / [`LayoutLine::end`] are
//! character indices into that stream, so a caller that has to break the
//! page in the middle of a paragraph can resume wrapping from any line.

use crate::fonts::{FontManager, FontSpec};
use crate::markup::{RunStyle, StyledRun};

/// Where the first and the continuation lines of a paragraph start and how
/// wide they may be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapGeometry {
    pub first_x: f32,
    pub first_width: f32,
    pub cont_x: f32,
    pub cont_width: f32,
}

impl WrapGeometry {
    /// Every line starts at `x` with the same width.
    pub fn uniform(x: f32, width: f32) -> Self {
        Self {
            first_x: x,
            first_width: width,
            cont_x: x,
            cont_width: width,
        }
    }
}

/// A styled piece of a line, positioned relative to the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub style: RunStyle,
    pub x_offset: f32,
    pub width: f32,
}

/// One physical output line.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    /// Top of the line box.
    pub top: f32,
    pub baseline: f32,
    pub x: f32,
    pub fragments: Vec<Fragment>,
    /// The paragraph's first line (label and indent apply).
    pub first_in_paragraph: bool,
    /// Stream position of the first character of this line.
    pub start: usize,
    /// Stream position just past the last character consumed by this line.
    pub end: usize,
    /// The line holds nothing but an explicit break. Such a line is dropped
    /// when it would open a page.
    pub bare_break: bool,
}

impl LayoutLine {
    pub fn width(&self) -> f32 {
        self.fragments
            .last()
            .map(|f| f.x_offset + f.width)
            .unwrap_or(0.0)
    }

    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The same line moved down by `dy`.
    pub fn shifted(&self, dy: f32) -> Self {
        Self {
            top: self.top + dy,
            baseline: self.baseline + dy,
            ..self.clone()
        }
    }
}

/// Result of a wrap: the lines plus the y just below the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapped {
    pub lines: Vec<LayoutLine>,
    pub final_y: f32,
}

/// Where to resume wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resume {
    pub position: usize,
    /// True when `position` is the very start of the paragraph, so the first
    /// line uses the first-line geometry.
    pub paragraph_start: bool,
    /// Consume the explicit breaks sitting at `position` (once) instead of
    /// emitting blank lines for them; used right after a page break.
    pub skip_leading_breaks: bool,
}

impl Resume {
    pub fn start() -> Self {
        Self {
            position: 0,
            paragraph_start: true,
            skip_leading_breaks: false,
        }
    }

    pub fn after_page_break(position: usize) -> Self {
        Self {
            position,
            paragraph_start: position == 0,
            skip_leading_breaks: true,
        }
    }
}

/// Flattened styled text.
pub(crate) struct StyledText {
    chars: Vec<char>,
    styles: Vec<RunStyle>,
}

impl StyledText {
    pub(crate) fn from_runs(runs: &[StyledRun]) -> Self {
        let mut chars = Vec::new();
        let mut styles = Vec::new();
        for run in runs {
            for c in run.text.chars() {
                chars.push(c);
                styles.push(run.style);
            }
        }
        Self { chars, styles }
    }

    pub(crate) fn len(&self) -> usize {
        self.chars.len()
    }
}

pub struct LineWrapper<'a> {
    fonts: &'a FontManager,
    font: FontSpec,
    line_height: f32,
}

impl<'a> LineWrapper<'a> {
    pub fn new(fonts: &'a FontManager, font: FontSpec, line_height: f32) -> Self {
        Self {
            fonts,
            font,
            line_height,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn font(&self) -> FontSpec {
        self.font
    }

    fn char_width(&self, c: char, style: RunStyle) -> f32 {
        let mut buf = [0u8; 4];
        self.fonts
            .measure_text_width(c.encode_utf8(&mut buf), self.font, style)
    }

    fn span_width(&self, text: &StyledText, from: usize, to: usize) -> f32 {
        (from..to)
            .map(|i| self.char_width(text.chars[i], text.styles[i]))
            .sum()
    }

    /// Wrap a whole paragraph starting at `start_y`.
    pub fn wrap(&self, runs: &[StyledRun], geometry: &WrapGeometry, start_y: f32) -> Wrapped {
        self.wrap_from(runs, geometry, start_y, Resume::start())
    }

    /// Wrap from a resume point.
    pub fn wrap_from(
        &self,
        runs: &[StyledRun],
        geometry: &WrapGeometry,
        start_y: f32,
        resume: Resume,
    ) -> Wrapped {
        let text = StyledText::from_runs(runs);
        let n = text.len();
        let ascent = self.fonts.ascender_pt(self.font);

        let mut pos = resume.position.min(n);
        if resume.skip_leading_breaks {
            while pos < n && text.chars[pos] == '\n' {
                pos += 1;
            }
        }

        let mut lines = Vec::new();
        let mut y = start_y;
        let mut first = resume.paragraph_start;

        while pos < n {
            let (x, width) = if first {
                (geometry.first_x, geometry.first_width)
            } else {
                (geometry.cont_x, geometry.cont_width)
            };
            let (content_end, next) = self.break_line(&text, pos, width);

            lines.push(LayoutLine {
                top: y,
                baseline: y + ascent,
                x,
                fragments: self.fragments(&text, pos, content_end),
                first_in_paragraph: first,
                start: pos,
                end: next,
                bare_break: text.chars[pos] == '\n',
            });
            y += self.line_height;
            first = false;
            pos = next;
        }

        Wrapped { lines, final_y: y }
    }

    /// Height the paragraph would occupy, without keeping any lines.
    pub fn measure(&self, runs: &[StyledRun], geometry: &WrapGeometry) -> f32 {
        self.wrap(runs, geometry, 0.0).final_y
    }

    /// Find the end of the line starting at `start`.
    ///
    /// Returns `(content_end, next_start)`: the line shows
    /// `start..content_end`; the next line begins at `next_start`.
    fn break_line(&self, text: &StyledText, start: usize, max_width: f32) -> (usize, usize) {
        let n = text.len();
        let mut i = start;
        let mut committed_end = start;
        let mut committed_width = 0.0f32;
        let mut has_word = false;

        loop {
            if i >= n {
                return (committed_end, n);
            }
            if text.chars[i] == '\n' {
                return (committed_end, i + 1);
            }

            let ws_start = i;
            while i < n && text.chars[i] != '\n' && text.chars[i].is_whitespace() {
                i += 1;
            }
            let word_start = i;
            while i < n && !text.chars[i].is_whitespace() {
                i += 1;
            }

            if word_start == i {
                // Trailing whitespace before a break or end of text.
                continue;
            }

            let candidate = committed_width + self.span_width(text, ws_start, i);
            if candidate > max_width && has_word {
                return (committed_end, word_start);
            }
            committed_end = i;
            committed_width = candidate;
            has_word = true;
        }
    }

    fn fragments(&self, text: &StyledText, from: usize, to: usize) -> Vec<Fragment> {
        let mut out: Vec<Fragment> = Vec::new();
        let mut x = 0.0f32;
        for i in from..to {
            let (c, style) = (text.chars[i], text.styles[i]);
            let w = self.char_width(c, style);
            match out.last_mut() {
                Some(frag) if frag.style == style => {
                    frag.text.push(c);
                    frag.width += w;
                }
                _ => out.push(Fragment {
                    text: c.to_string(),
                    style,
                    x_offset: x,
                    width: w,
                }),
            }
            x += w;
        }
        out
    }
}
