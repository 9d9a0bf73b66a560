//! Page geometry and break policy.
//!
//! The [`Paginator`] owns the vertical cursor and the pages drawn so far.
//! Content asks it for room in one of two ways:
//!
//! - [`Paginator::ensure_space`] before drawing a block that must not be
//!   split at an arbitrary point (heading lines, the end block);
//! - [`Paginator::after_draw`] between the lines of body text, so a
//!   paragraph can break at any line boundary.
//!
//! Both perform the same transition: a new page, the cursor back at the top,
//! and the running header (classification banner, `Subj:` continuation)
//! painted. Page numbers and bottom banners are painted once in
//! [`Paginator::finish`], when the page count is known.

use serde::{Deserialize, Serialize};

use crate::fonts::{FontManager, FontSpec};
use crate::layout_config::{DrawOp, ImageOp, LineOp, PageLayout, TextOp};
use crate::markup::{RunStyle, StyledRun};
use crate::wrap::{LayoutLine, LineWrapper, WrapGeometry};

/// US Letter width in points.
pub const PAGE_WIDTH_PT: f32 = 612.0;
/// US Letter height in points.
pub const PAGE_HEIGHT_PT: f32 = 792.0;
/// One-inch margin on every side.
pub const MARGIN_PT: f32 = 72.0;
pub const CONTENT_WIDTH_PT: f32 = PAGE_WIDTH_PT - 2.0 * MARGIN_PT;
pub const RIGHT_EDGE_PT: f32 = PAGE_WIDTH_PT - MARGIN_PT;
pub const BOTTOM_EDGE_PT: f32 = PAGE_HEIGHT_PT - MARGIN_PT;
/// Tab stop for heading field values ("From:", "Subj:", …).
pub const TAB_PT: f32 = 45.0;
/// Gap between a label and the text that follows it.
pub const LABEL_GAP_PT: f32 = 4.0;
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Baseline of the top classification banner.
pub const CLASSIFICATION_TOP_Y: f32 = 36.0;
/// Baseline of the page number.
pub const PAGE_NUMBER_Y: f32 = PAGE_HEIGHT_PT - 45.0;
/// Baseline of the bottom classification banner, below the page number.
pub const CLASSIFICATION_BOTTOM_Y: f32 = PAGE_HEIGHT_PT - 27.0;

pub const UNDERLINE_THICKNESS_PT: f32 = 0.5;

/// Slack for comparisons of accumulated line positions.
const EPSILON: f32 = 0.01;

/// Keep-together thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationRules {
    /// Fewest lines of a split paragraph left on the page before a break.
    pub min_lines_before_break: usize,
    /// Fewest lines of a split paragraph carried to the next page.
    pub min_lines_after_break: usize,
    /// Lines of the final paragraph kept with the signature block.
    pub end_block_keep_lines: usize,
    /// A final paragraph this short moves whole rather than split from
    /// the signature.
    pub short_paragraph_lines: usize,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            min_lines_before_break: 2,
            min_lines_after_break: 2,
            end_block_keep_lines: 3,
            short_paragraph_lines: 5,
        }
    }
}

/// Mutable layout position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    /// 1-based.
    pub page: usize,
    /// Top of the next line box.
    pub y: f32,
    /// Where content starts on this page, below any running header.
    pub top: f32,
    pub bottom: f32,
}

impl PageCursor {
    pub fn remaining(&self) -> f32 {
        self.bottom - self.y
    }
}

/// Matter repeated on every page.
#[derive(Debug, Clone, Default)]
pub struct RunningMatter {
    pub classification: Option<String>,
    /// Upper-cased subject repeated at the top of continuation pages.
    pub subject: Option<String>,
}

pub struct Paginator<'a> {
    fonts: &'a FontManager,
    font: FontSpec,
    line_height: f32,
    running: RunningMatter,
    cursor: PageCursor,
    pages: Vec<PageLayout>,
    /// False for measure-only passes: pages are counted, ops are dropped.
    record: bool,
    continuation_top: f32,
}

impl<'a> Paginator<'a> {
    pub fn new(fonts: &'a FontManager, font: FontSpec, running: RunningMatter) -> Self {
        Self::with_recording(fonts, font, running, true)
    }

    /// A paginator that tracks geometry only.
    pub fn measuring(fonts: &'a FontManager, font: FontSpec, running: RunningMatter) -> Self {
        Self::with_recording(fonts, font, running, false)
    }

    fn with_recording(
        fonts: &'a FontManager,
        font: FontSpec,
        running: RunningMatter,
        record: bool,
    ) -> Self {
        let line_height = fonts.line_height_pt(font.size, LINE_HEIGHT_FACTOR);
        let mut pager = Self {
            fonts,
            font,
            line_height,
            running,
            cursor: PageCursor {
                page: 1,
                y: MARGIN_PT,
                top: MARGIN_PT,
                bottom: BOTTOM_EDGE_PT,
            },
            pages: vec![PageLayout::new(0)],
            record,
            continuation_top: MARGIN_PT,
        };
        pager.continuation_top = MARGIN_PT + pager.continuation_header_height();
        pager.draw_top_matter();
        pager
    }

    pub fn fonts(&self) -> &'a FontManager {
        self.fonts
    }

    pub fn font(&self) -> FontSpec {
        self.font
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn wrapper(&self) -> LineWrapper<'a> {
        LineWrapper::new(self.fonts, self.font, self.line_height)
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn y(&self) -> f32 {
        self.cursor.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.cursor.y = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor.y += dy;
    }

    /// Advance by `n` blank lines.
    pub fn skip_lines(&mut self, n: usize) {
        self.cursor.y += n as f32 * self.line_height;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn bottom(&self) -> f32 {
        self.cursor.bottom
    }

    /// Content top of every page after the first.
    pub fn continuation_top(&self) -> f32 {
        self.continuation_top
    }

    pub fn at_page_top(&self) -> bool {
        (self.cursor.y - self.cursor.top).abs() < EPSILON
    }

    /// Would `need` points starting at `y` stay above the bottom margin?
    pub fn fits(&self, y: f32, need: f32) -> bool {
        y + need <= self.cursor.bottom + EPSILON
    }

    /// Whole lines that fit between `y` and the bottom margin.
    pub fn lines_fitting_from(&self, y: f32) -> usize {
        let room = self.cursor.bottom - y + EPSILON;
        if room < self.line_height {
            0
        } else {
            (room / self.line_height).floor() as usize
        }
    }

    /// Whole lines that fit on a fresh continuation page.
    pub fn lines_per_fresh_page(&self) -> usize {
        self.lines_fitting_from(self.continuation_top)
    }

    /// Pre-check: break before drawing if `need` does not fit.
    /// Returns true when a page break happened.
    pub fn ensure_space(&mut self, need: f32) -> bool {
        if self.fits(self.cursor.y, need) {
            return false;
        }
        if self.at_page_top() {
            // Taller than a page; let it run over rather than loop.
            return false;
        }
        self.new_page();
        true
    }

    /// Post-check after a line has been drawn: move the cursor to
    /// `current_y` and break if the next line would not fit.
    pub fn after_draw(&mut self, current_y: f32) -> bool {
        self.cursor.y = current_y;
        self.ensure_space(self.line_height)
    }

    /// Start a new page and paint its running header.
    pub fn new_page(&mut self) {
        self.pages.push(PageLayout::new(self.pages.len()));
        self.cursor.page += 1;
        self.cursor.y = MARGIN_PT;
        log::debug!("page break: now on page {}", self.cursor.page);
        self.draw_top_matter();
        self.cursor.top = self.cursor.y;
    }

    fn continuation_header_height(&self) -> f32 {
        match &self.running.subject {
            Some(subject) => {
                let runs = [StyledRun::plain(subject.clone())];
                self.wrapper().measure(&runs, &subject_geometry()) + self.line_height
            }
            None => 0.0,
        }
    }

    fn draw_top_matter(&mut self) {
        if let Some(banner) = self.running.classification.clone() {
            self.centered_text(&banner, CLASSIFICATION_TOP_Y, self.font, RunStyle::BOLD);
        }
        if self.cursor.page == 1 {
            return;
        }
        if let Some(subject) = self.running.subject.clone() {
            let top = self.cursor.y;
            self.text_at(top, "Subj:", MARGIN_PT, RunStyle::NORMAL);
            let runs = [StyledRun::plain(subject)];
            let wrapped = self.wrapper().wrap(&runs, &subject_geometry(), top);
            for line in &wrapped.lines {
                self.draw_line(line);
            }
            self.cursor.y = wrapped.final_y + self.line_height;
        }
    }

    fn push(&mut self, op: DrawOp) {
        if !self.record {
            return;
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn baseline_for(&self, top: f32) -> f32 {
        top + self.fonts.ascender_pt(self.font)
    }

    /// Draw `text` on the baseline, underlining it if the style says so.
    pub fn text(&mut self, text: &str, x: f32, baseline: f32, font: FontSpec, style: RunStyle) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text(TextOp {
            text: text.to_string(),
            x,
            y: baseline,
            family: font.family,
            size: font.size,
            bold: style.bold,
            italic: style.italic,
        }));
        if style.underline {
            let width = self.fonts.measure_text_width(text, font, style);
            self.underline(x, x + width, baseline, font.size);
        }
    }

    /// Draw body-font text in the line box whose top is `top`.
    pub fn text_at(&mut self, top: f32, text: &str, x: f32, style: RunStyle) {
        let baseline = self.baseline_for(top);
        self.text(text, x, baseline, self.font, style);
    }

    pub fn centered_text(&mut self, text: &str, baseline: f32, font: FontSpec, style: RunStyle) {
        let width = self.fonts.measure_text_width(text, font, style);
        self.text(text, (PAGE_WIDTH_PT - width) / 2.0, baseline, font, style);
    }

    pub fn underline(&mut self, x1: f32, x2: f32, baseline: f32, font_size: f32) {
        let y = baseline + font_size * 0.1;
        self.push(DrawOp::Line(LineOp {
            x1,
            y1: y,
            x2,
            y2: y,
            thickness: UNDERLINE_THICKNESS_PT,
        }));
    }

    /// Paint a wrapped line at its own coordinates.
    pub fn draw_line(&mut self, line: &LayoutLine) {
        for frag in &line.fragments {
            let x = line.x + frag.x_offset;
            self.push(DrawOp::Text(TextOp {
                text: frag.text.clone(),
                x,
                y: line.baseline,
                family: self.font.family,
                size: self.font.size,
                bold: frag.style.bold,
                italic: frag.style.italic,
            }));
            if frag.style.underline {
                self.underline(x, x + frag.width, line.baseline, self.font.size);
            }
        }
    }

    pub fn image(&mut self, op: ImageOp) {
        self.push(DrawOp::Image(op));
    }

    /// Paint bottom matter on every page and hand the pages over.
    pub fn finish(mut self) -> Vec<PageLayout> {
        if self.record {
            let font = self.font;
            let banner = self.running.classification.clone();
            let mut pages = std::mem::take(&mut self.pages);
            for (i, page) in pages.iter_mut().enumerate() {
                let mut bottom = Vec::new();
                if i > 0 {
                    bottom.push((format!("{}", i + 1), PAGE_NUMBER_Y, RunStyle::NORMAL));
                }
                if let Some(banner) = &banner {
                    bottom.push((banner.clone(), CLASSIFICATION_BOTTOM_Y, RunStyle::BOLD));
                }
                for (text, baseline, style) in bottom {
                    let width = self.fonts.measure_text_width(&text, font, style);
                    page.ops.push(DrawOp::Text(TextOp {
                        text,
                        x: (PAGE_WIDTH_PT - width) / 2.0,
                        y: baseline,
                        family: font.family,
                        size: font.size,
                        bold: style.bold,
                        italic: style.italic,
                    }));
                }
            }
            return pages;
        }
        self.pages
    }
}

/// Geometry of the wrapped subject text at the heading tab.
pub fn subject_geometry() -> WrapGeometry {
    WrapGeometry::uniform(MARGIN_PT + TAB_PT, CONTENT_WIDTH_PT - TAB_PT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontFamily;

    fn font() -> FontSpec {
        FontSpec::new(FontFamily::Times, 12.0)
    }

    #[test]
    fn ensure_space_breaks_only_when_needed() {
        let fonts = FontManager::default();
        let mut pager = Paginator::new(&fonts, font(), RunningMatter::default());
        assert!(!pager.ensure_space(100.0));
        pager.set_y(BOTTOM_EDGE_PT - 10.0);
        assert!(pager.ensure_space(20.0));
        assert_eq!(pager.cursor().page, 2);
        assert_eq!(pager.y(), MARGIN_PT);
        assert_eq!(pager.page_count(), 2);
    }

    #[test]
    fn after_draw_breaks_when_next_line_would_overflow() {
        let fonts = FontManager::default();
        let mut pager = Paginator::new(&fonts, font(), RunningMatter::default());
        let lh = pager.line_height();
        assert!(!pager.after_draw(BOTTOM_EDGE_PT - lh));
        assert!(pager.after_draw(BOTTOM_EDGE_PT - lh + 1.0));
        assert_eq!(pager.cursor().page, 2);
    }

    #[test]
    fn oversize_block_at_page_top_does_not_loop() {
        let fonts = FontManager::default();
        let mut pager = Paginator::new(&fonts, font(), RunningMatter::default());
        assert!(!pager.ensure_space(PAGE_HEIGHT_PT * 2.0));
        assert_eq!(pager.page_count(), 1);
    }

    #[test]
    fn continuation_pages_repeat_subject() {
        let fonts = FontManager::default();
        let running = RunningMatter {
            classification: Some("CUI".into()),
            subject: Some("ANNUAL TRAINING REQUIREMENTS".into()),
        };
        let mut pager = Paginator::new(&fonts, font(), running);
        let lh = pager.line_height();
        assert!((pager.continuation_top() - (MARGIN_PT + 2.0 * lh)).abs() < 0.001);
        pager.new_page();
        assert!((pager.y() - pager.continuation_top()).abs() < 0.001);
        assert!(pager.at_page_top());
        let pages = pager.finish();
        let texts: Vec<&str> = pages[1]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"Subj:"));
        assert!(texts.contains(&"ANNUAL TRAINING REQUIREMENTS"));
        assert!(texts.contains(&"2"));
        assert_eq!(texts.iter().filter(|t| **t == "CUI").count(), 2);
    }

    #[test]
    fn consecutive_breaks_each_get_a_header() {
        let fonts = FontManager::default();
        let running = RunningMatter {
            classification: None,
            subject: Some("FLEET READINESS".into()),
        };
        let mut pager = Paginator::new(&fonts, font(), running);
        pager.new_page();
        pager.new_page();
        assert_eq!(pager.cursor().page, 3);
        assert!(pager.at_page_top());
        let pages = pager.finish();
        for page in &pages[1..] {
            let subj = page
                .ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Text(t) if t.text == "Subj:"))
                .count();
            assert_eq!(subj, 1);
        }
    }

    #[test]
    fn first_page_has_no_number() {
        let fonts = FontManager::default();
        let pager = Paginator::new(&fonts, font(), RunningMatter::default());
        let pages = pager.finish();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].ops.is_empty());
    }

    #[test]
    fn measuring_drops_ops_but_counts_pages() {
        let fonts = FontManager::default();
        let mut pager = Paginator::measuring(&fonts, font(), RunningMatter::default());
        pager.text_at(MARGIN_PT, "hello", MARGIN_PT, RunStyle::NORMAL);
        pager.new_page();
        let pages = pager.finish();
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.ops.is_empty()));
    }

    #[test]
    fn lines_fitting() {
        let fonts = FontManager::default();
        let pager = Paginator::new(&fonts, font(), RunningMatter::default());
        let lh = pager.line_height();
        assert_eq!(pager.lines_fitting_from(BOTTOM_EDGE_PT - 2.0 * lh), 2);
        assert_eq!(pager.lines_fitting_from(BOTTOM_EDGE_PT - 0.5 * lh), 0);
        assert_eq!(pager.lines_fitting_from(BOTTOM_EDGE_PT + 5.0), 0);
    }
}
