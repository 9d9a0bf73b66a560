//! Layout engine – walks a [`DocumentData`] top to bottom and places every
//! line on a page.
//!
//! The heading blocks and the end block live in [`crate::blocks`]; this
//! module owns the body paragraphs: numbering, label and subject placement,
//! and the keep-together rules that decide where a paragraph may break.

use crate::document::{DocumentData, Paragraph};
use crate::fonts::FontManager;
use crate::layout_config::PageLayout;
use crate::markup::{RunStyle, StyledRun};
use crate::numbering::NumberingState;
use crate::pagination::{
    PaginationRules, Paginator, RunningMatter, CONTENT_WIDTH_PT, LABEL_GAP_PT, MARGIN_PT,
    RIGHT_EDGE_PT,
};
use crate::wrap::{LayoutLine, Resume, WrapGeometry};

/// Body text continues on the subject line only if at least this much
/// width is left for it.
pub const MIN_INLINE_BODY_PT: f32 = 50.0;

/// Whether drawn operations are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Draw,
    MeasureOnly,
}

/// Result of a layout pass.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
    /// Cursor position after the last block, on the last page.
    pub final_y: f32,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Lay out `doc` and return the finished pages.
pub fn render_document(
    doc: &DocumentData,
    fonts: &FontManager,
    rules: &PaginationRules,
) -> Vec<PageLayout> {
    layout_document(doc, fonts, rules, LayoutMode::Draw).pages
}

/// Run the layout pass in either mode. Both modes take the same decisions.
pub fn layout_document(
    doc: &DocumentData,
    fonts: &FontManager,
    rules: &PaginationRules,
    mode: LayoutMode,
) -> DocumentLayout {
    let font = doc.font.spec();
    let subject = doc.subject_line();
    let running = RunningMatter {
        classification: doc.classification.banner().map(str::to_string),
        subject: (!subject.is_empty()).then_some(subject),
    };
    let pager = match mode {
        LayoutMode::Draw => Paginator::new(fonts, font, running),
        LayoutMode::MeasureOnly => Paginator::measuring(fonts, font, running),
    };

    let mut layouter = Layouter {
        doc,
        pager,
        rules: rules.clone(),
        numbering: NumberingState::new(),
    };
    layouter.letterhead();
    layouter.sender_symbols();
    layouter.kind_heading();
    layouter.addressing();
    layouter.subject_block();
    layouter.references_and_enclosures();
    layouter.body();
    layouter.end_block();

    let final_y = layouter.pager.y();
    let pages = layouter.pager.finish();
    log::debug!("layout finished: {} page(s)", pages.len());
    DocumentLayout { pages, final_y }
}

pub(crate) struct Layouter<'a> {
    pub(crate) doc: &'a DocumentData,
    pub(crate) pager: Paginator<'a>,
    pub(crate) rules: PaginationRules,
    pub(crate) numbering: NumberingState,
}

/// Where the first line of a paragraph puts its pieces.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PreparedParagraph {
    pub runs: Vec<StyledRun>,
    pub portion: Option<(String, f32)>,
    pub label: String,
    pub label_x: f32,
    pub subject: Option<PlacedSubject>,
    /// Body text starts on the label line.
    pub body_inline: bool,
    pub geometry: WrapGeometry,
    /// Body lines wrapped from y = 0.
    pub lines: Vec<LayoutLine>,
    /// Body lines when the paragraph opens a page: leading breaks consumed.
    pub lines_opening_page: Vec<LayoutLine>,
    pub shape: LineShape,
}

impl PreparedParagraph {
    fn body_lines(&self, opens_page: bool) -> &[LayoutLine] {
        if opens_page {
            &self.lines_opening_page
        } else {
            &self.lines
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedSubject {
    pub text: String,
    pub x: f32,
    pub truncated: bool,
}

/// The lines of a paragraph in drawing order, label line first. `true`
/// marks a line holding only an explicit break; it is not drawn when a
/// page break lands on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LineShape {
    pub in_flow: Vec<bool>,
    /// Shape when the paragraph starts at the top of a page.
    pub opening_page: Vec<bool>,
}

impl LineShape {
    /// `lines` lines of text, no explicit breaks.
    #[cfg(test)]
    pub fn plain(lines: usize) -> Self {
        Self {
            in_flow: vec![false; lines],
            opening_page: vec![false; lines],
        }
    }

    fn outline(lines: &[LayoutLine], body_inline: bool) -> Vec<bool> {
        let mut out = Vec::with_capacity(lines.len() + 1);
        if !body_inline {
            out.push(false);
        }
        out.extend(lines.iter().map(|l| l.bare_break));
        // The label line always shows.
        match out.first_mut() {
            Some(first) => *first = false,
            None => out.push(false),
        }
        out
    }

    pub fn get(&self, opens_page: bool) -> &[bool] {
        if opens_page {
            &self.opening_page
        } else {
            &self.in_flow
        }
    }
}

/// Decision taken before drawing a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BreakPlan {
    pub break_before: bool,
    /// Force a page break before this line of the paragraph (0-based).
    pub force_at: Option<usize>,
}

/// Text lines a paragraph would put on each page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Simulation {
    pub per_page: Vec<usize>,
    pub end_y: f32,
}

impl Simulation {
    fn last(&self) -> usize {
        self.per_page.last().copied().unwrap_or(0)
    }
}

/// Index of the line from which `visible` text lines remain to the end.
fn tail_start(shape: &[bool], visible: usize) -> Option<usize> {
    let mut seen = 0;
    for (i, bare) in shape.iter().enumerate().rev() {
        if !bare {
            seen += 1;
            if seen == visible {
                return Some(i);
            }
        }
    }
    None
}

/// Shorten an overlong subject by the ratio of available to full width,
/// applied to the character count, and mark the cut with "...".
pub fn truncate_subject(subject: &str, available: f32, full_width: f32) -> String {
    if full_width <= available || full_width <= 0.0 {
        return subject.to_string();
    }
    let ratio = (available / full_width).max(0.0);
    let count = subject.chars().count();
    let keep = ((count as f32 * ratio).floor() as usize).saturating_sub(3);
    let head: String = subject.chars().take(keep).collect();
    format!("{}...", head.trim_end())
}

impl<'a> Layouter<'a> {
    fn body(&mut self) {
        let doc = self.doc;
        let last = doc.paragraphs.iter().rposition(|p| !p.is_blank());
        let end_block = self.end_block_height();

        for (i, para) in doc.paragraphs.iter().enumerate() {
            if para.is_blank() {
                log::debug!("skipping empty paragraph {i}");
                continue;
            }
            let is_last = Some(i) == last;
            let prepared = self.prepare_paragraph(para);
            let plan = self.plan_breaks(
                &prepared.shape,
                if is_last { Some(end_block) } else { None },
            );
            self.draw_paragraph(&prepared, plan);
            if !is_last {
                self.pager.skip_lines(1);
            }
        }
    }

    /// Number the paragraph and measure it against the widths it will be
    /// drawn with.
    pub(crate) fn prepare_paragraph(&mut self, para: &Paragraph) -> PreparedParagraph {
        let fonts = self.pager.fonts();
        let font = self.pager.font();
        let label = self.numbering.advance(para.level);
        let label_x = MARGIN_PT + para.level.indent();

        let mut x = label_x;
        let portion = match (&para.portion_marking, self.doc.portion_marking) {
            (Some(mark), true) if !mark.trim().is_empty() => {
                let text = format!("({})", mark.trim().to_uppercase());
                let width = fonts.measure_text_width(&text, font, RunStyle::BOLD);
                let at = x;
                x += width + LABEL_GAP_PT;
                Some((text, at))
            }
            _ => None,
        };

        let label_width = fonts.measure_text_width(&label, font, RunStyle::NORMAL);
        let after_label = x + label_width + LABEL_GAP_PT;
        // The portion marking pushes the label right.
        let label_x = x;

        let mut body_inline = true;
        let mut body_x = after_label;
        let subject = para.effective_subject().map(|subject| {
            let full = fonts.measure_text_width(subject, font, RunStyle::UNDERLINE);
            let available = RIGHT_EDGE_PT - after_label;
            if full > available {
                body_inline = false;
                PlacedSubject {
                    text: truncate_subject(subject, available, full),
                    x: after_label,
                    truncated: true,
                }
            } else {
                body_x = after_label
                    + full
                    + fonts.measure_text_width("  ", font, RunStyle::NORMAL);
                body_inline = RIGHT_EDGE_PT - body_x >= MIN_INLINE_BODY_PT;
                PlacedSubject {
                    text: subject.to_string(),
                    x: after_label,
                    truncated: false,
                }
            }
        });

        let geometry = if body_inline {
            WrapGeometry {
                first_x: body_x,
                first_width: RIGHT_EDGE_PT - body_x,
                cont_x: MARGIN_PT,
                cont_width: CONTENT_WIDTH_PT,
            }
        } else {
            WrapGeometry::uniform(MARGIN_PT, CONTENT_WIDTH_PT)
        };

        let runs = para.runs();
        let wrapper = self.pager.wrapper();
        let lines = wrapper.wrap(&runs, &geometry, 0.0).lines;
        // Only an inline body can open the page; otherwise the label line does.
        let lines_opening_page = if body_inline {
            wrapper
                .wrap_from(&runs, &geometry, 0.0, Resume::after_page_break(0))
                .lines
        } else {
            lines.clone()
        };
        let shape = LineShape {
            in_flow: LineShape::outline(&lines, body_inline),
            opening_page: LineShape::outline(&lines_opening_page, body_inline),
        };

        PreparedParagraph {
            runs,
            portion,
            label,
            label_x,
            subject,
            body_inline,
            geometry,
            lines,
            lines_opening_page,
            shape,
        }
    }

    /// Where each line of a paragraph of `shape` starting at `start_y`
    /// would land, with an optional forced break before line `forced`.
    /// Bare break lines take up space but are not counted; those a page
    /// break lands on are dropped, as they are when drawing.
    pub(crate) fn simulate(
        &self,
        shape: &[bool],
        start_y: f32,
        forced: Option<usize>,
    ) -> Simulation {
        let lh = self.pager.line_height();
        let mut per_page = vec![0usize];
        let mut y = start_y;
        let mut just_broke = false;
        for (i, &bare) in shape.iter().enumerate() {
            if i > 0 && !just_broke && (forced == Some(i) || !self.pager.fits(y, lh)) {
                per_page.push(0);
                y = self.pager.continuation_top();
                just_broke = true;
            }
            if just_broke && bare {
                continue;
            }
            just_broke = false;
            if !bare {
                if let Some(n) = per_page.last_mut() {
                    *n += 1;
                }
            }
            y += lh;
        }
        Simulation { per_page, end_y: y }
    }

    /// Orphan/widow and end-block keep-together decision.
    ///
    /// `end_block` is the height of the signature and copy-to block when
    /// this is the final paragraph.
    pub(crate) fn plan_breaks(&self, shape: &LineShape, end_block: Option<f32>) -> BreakPlan {
        let rules = &self.rules;
        let lh = self.pager.line_height();
        let y = self.pager.y();
        let at_top = self.pager.at_page_top();

        let mut plan = BreakPlan::default();
        if !at_top {
            let sim = self.simulate(shape.get(false), y, None);
            let on_current = sim.per_page[0];
            let on_next: usize = sim.per_page[1..].iter().sum();
            let split = sim.per_page.len() > 1;
            if !self.pager.fits(y, lh)
                || (split
                    && (on_current < rules.min_lines_before_break
                        || on_next < rules.min_lines_after_break))
            {
                log::debug!(
                    "paragraph moves to next page ({on_current} line(s) would fit, {on_next} carried)"
                );
                plan.break_before = true;
            }
        }
        let lines = shape.get(at_top || plan.break_before);
        let start_y = if plan.break_before {
            self.pager.continuation_top()
        } else {
            y
        };
        let movable = !at_top && !plan.break_before;

        plan.force_at = self.widow_break(lines, start_y);

        let Some(end_block) = end_block.filter(|h| *h > 0.0) else {
            return plan;
        };
        let total = lines.iter().filter(|bare| !**bare).count();
        let sim = self.simulate(lines, start_y, plan.force_at);
        if self.pager.fits(sim.end_y, end_block) {
            return plan;
        }

        let keep = rules.end_block_keep_lines.max(1);
        let tail = sim.last();
        if sim.per_page.len() == 1 && (total <= rules.short_paragraph_lines || total <= keep) {
            if movable {
                log::debug!("short final paragraph moves to join the signature");
                plan.break_before = true;
                plan.force_at = self.widow_break(shape.get(true), self.pager.continuation_top());
            }
            return plan;
        }
        if tail > keep {
            let keep = keep.min(tail.saturating_sub(rules.min_lines_before_break));
            if let Some(at) = tail_start(lines, keep).filter(|&i| i > 0) {
                log::debug!("keeping last {keep} line(s) with the signature");
                plan.force_at = Some(at);
            }
        } else if movable {
            log::debug!("final paragraph moves whole to stay with the signature");
            plan.break_before = true;
            plan.force_at = self.widow_break(shape.get(true), self.pager.continuation_top());
        }
        plan
    }

    /// A paragraph running over several pages must not strand a single
    /// line on its final page: break early enough to carry the minimum.
    fn widow_break(&self, shape: &[bool], start_y: f32) -> Option<usize> {
        let rules = &self.rules;
        let sim = self.simulate(shape, start_y, None);
        let pages = sim.per_page.len();
        if pages < 2 || sim.last() >= rules.min_lines_after_break {
            return None;
        }
        let at = tail_start(shape, rules.min_lines_after_break).filter(|&i| i > 0)?;
        let forced = self.simulate(shape, start_y, Some(at));
        let n = forced.per_page.len();
        (n == pages
            && forced.per_page[n - 2] >= rules.min_lines_before_break
            && forced.last() >= rules.min_lines_after_break)
            .then_some(at)
    }

    pub(crate) fn draw_paragraph(&mut self, prepared: &PreparedParagraph, plan: BreakPlan) {
        let lh = self.pager.line_height();
        let font = self.pager.font();
        if plan.break_before {
            self.pager.new_page();
        }
        self.pager.ensure_space(lh);
        let opens_page = self.pager.at_page_top();

        let top = self.pager.y();
        if let Some((text, x)) = &prepared.portion {
            self.pager.text_at(top, text, *x, RunStyle::BOLD);
        }
        self.pager
            .text_at(top, &prepared.label, prepared.label_x, RunStyle::NORMAL);
        if let Some(subject) = &prepared.subject {
            let baseline = self.pager.baseline_for(top);
            self.pager
                .text(&subject.text, subject.x, baseline, font, RunStyle::UNDERLINE);
        }

        // Lines were wrapped from y = 0; `dy` places them on the page.
        let mut index = if prepared.body_inline { 0 } else { 1 };
        let mut dy = if prepared.body_inline { top } else { top + lh };
        let mut end = top + lh;
        let mut just_broke = false;

        for line in prepared.body_lines(opens_page) {
            if index > 0 && !just_broke {
                let line_top = line.top + dy;
                let broke = if plan.force_at == Some(index) {
                    self.pager.set_y(line_top);
                    self.pager.new_page();
                    true
                } else {
                    self.pager.after_draw(line_top)
                };
                if broke {
                    end = self.pager.y();
                    just_broke = true;
                }
            }
            index += 1;
            if just_broke {
                if line.bare_break {
                    continue;
                }
                dy = self.pager.y() - line.top;
                just_broke = false;
            }
            let placed = line.shifted(dy);
            end = placed.top + lh;
            self.pager.draw_line(&placed);
        }
        self.pager.set_y(end);
    }
}
