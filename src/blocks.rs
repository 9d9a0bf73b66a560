//! Letter heading blocks and the end block.
//!
//! Everything here draws through the same [`Paginator`] as the body, so a
//! heading list long enough to overflow page 1 (27 references, say) breaks
//! line by line like body text.
//!
//! [`Paginator`]: crate::pagination::Paginator

use crate::document::DocumentKind;
use crate::fonts::{FontManager, FontSpec};
use crate::layout::Layouter;
use crate::layout_config::ImageOp;
use crate::markup::{RunStyle, StyledRun};
use crate::numbering::{numbered_label, ordinal_word, reference_label};
use crate::pagination::{
    subject_geometry, LABEL_GAP_PT, MARGIN_PT, PAGE_WIDTH_PT, RIGHT_EDGE_PT, TAB_PT,
};
use crate::wrap::{Resume, WrapGeometry};

/// Signature lines start at the horizontal centre of the page.
pub const SIGNATURE_X: f32 = PAGE_WIDTH_PT / 2.0;
/// Blank lines left above the signature name.
pub const SIGNATURE_GAP_LINES: usize = 3;

const SEAL_X: f32 = 36.0;
const SEAL_Y: f32 = 36.0;
const SEAL_SIZE: f32 = 72.0;
/// Baseline of "DEPARTMENT OF THE NAVY".
const LETTERHEAD_TOP_Y: f32 = 45.0;
const LETTERHEAD_TITLE_SIZE: f32 = 10.0;
const LETTERHEAD_LINE_SIZE: f32 = 8.0;
/// Letterhead is pushed down this far when a top banner is printed.
const BANNER_CLEARANCE: f32 = 12.0;

/// How the entries of a labelled heading list are marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markers {
    Plain,
    /// "(1)", "(2)" … only when there is more than one entry.
    NumberedIfMany,
    Numbered,
    Lettered,
}

impl Markers {
    fn marker(self, index: usize, count: usize) -> Option<String> {
        match self {
            Markers::Plain => None,
            Markers::NumberedIfMany if count < 2 => None,
            Markers::NumberedIfMany | Markers::Numbered => Some(numbered_label(index)),
            Markers::Lettered => Some(reference_label(index)),
        }
    }
}

/// Copy-to entries hang past their marker at the left margin.
fn copy_to_text_x(marker: Option<String>, fonts: &FontManager, font: FontSpec) -> f32 {
    match marker {
        Some(m) => MARGIN_PT + fonts.measure_text_width(&m, font, RunStyle::NORMAL) + LABEL_GAP_PT,
        None => MARGIN_PT,
    }
}

fn non_empty(entries: &[String]) -> Vec<&str> {
    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect()
}

impl<'a> Layouter<'a> {
    pub(crate) fn letterhead(&mut self) {
        let doc = self.doc;
        let Some(letterhead) = &doc.letterhead else {
            return;
        };
        let font = self.pager.font();
        let shift = if doc.classification.banner().is_some() {
            BANNER_CLEARANCE
        } else {
            0.0
        };

        let mut content_top = MARGIN_PT;
        if let Some(seal) = &letterhead.seal {
            if crate::assets::probe_seal(seal).is_some() {
                self.pager.image(ImageOp {
                    src: seal.clone(),
                    x: SEAL_X,
                    y: SEAL_Y + shift,
                    width: SEAL_SIZE,
                    height: SEAL_SIZE,
                });
                content_top = content_top.max(SEAL_Y + shift + SEAL_SIZE);
            }
        }

        let mut baseline = LETTERHEAD_TOP_Y + shift;
        let title = font.with_size(LETTERHEAD_TITLE_SIZE);
        self.pager
            .centered_text("DEPARTMENT OF THE NAVY", baseline, title, RunStyle::BOLD);
        let small = font.with_size(LETTERHEAD_LINE_SIZE);
        let lines = std::iter::once(letterhead.unit_name.trim())
            .chain(letterhead.address_lines.iter().map(|l| l.trim()))
            .filter(|l| !l.is_empty());
        for line in lines {
            baseline += LETTERHEAD_LINE_SIZE * 1.25;
            self.pager
                .centered_text(&line.to_uppercase(), baseline, small, RunStyle::NORMAL);
        }

        let lh = self.pager.line_height();
        let y = content_top.max(baseline + lh);
        self.pager.set_y(y);
        log::debug!("letterhead ends at y={y:.1}");
    }

    /// SSIC, office code and date, left-aligned as a block whose widest
    /// line ends at the right margin.
    pub(crate) fn sender_symbols(&mut self) {
        let doc = self.doc;
        let fields = [doc.ssic.clone(), doc.office_code.clone(), doc.date.clone()];
        let lines = non_empty(&fields);
        if lines.is_empty() {
            return;
        }
        let fonts = self.pager.fonts();
        let font = self.pager.font();
        let widest = lines
            .iter()
            .map(|l| fonts.measure_text_width(l, font, RunStyle::NORMAL))
            .fold(0.0f32, f32::max);
        let x = (RIGHT_EDGE_PT - widest).max(MARGIN_PT);
        let lh = self.pager.line_height();
        for line in lines {
            self.pager.ensure_space(lh);
            let top = self.pager.y();
            self.pager.text_at(top, line, x, RunStyle::NORMAL);
            self.pager.skip_lines(1);
        }
        self.pager.skip_lines(1);
    }

    pub(crate) fn kind_heading(&mut self) {
        let heading = match self.doc.kind {
            DocumentKind::BasicLetter => return,
            DocumentKind::Memorandum => "MEMORANDUM".to_string(),
            DocumentKind::Endorsement => {
                let Some(endorsement) = &self.doc.endorsement else {
                    log::warn!("endorsement without endorsement details, heading skipped");
                    return;
                };
                let ordinal = ordinal_word(endorsement.number.max(1));
                match endorsement.on.trim() {
                    "" => format!("{ordinal} ENDORSEMENT"),
                    on => format!("{ordinal} ENDORSEMENT on {on}"),
                }
            }
        };
        let lh = self.pager.line_height();
        self.pager.ensure_space(lh);
        let runs = [StyledRun::plain(heading)];
        self.draw_flowing(&runs, &WrapGeometry::uniform(MARGIN_PT, RIGHT_EDGE_PT - MARGIN_PT));
        self.pager.skip_lines(1);
    }

    /// From, To and Via.
    pub(crate) fn addressing(&mut self) {
        let doc = self.doc;
        self.labeled_list("From:", &[doc.from.clone()], Markers::Plain);
        self.labeled_list("To:", &[doc.to.clone()], Markers::Plain);
        self.labeled_list("Via:", &doc.via, Markers::NumberedIfMany);
        self.pager.skip_lines(1);
    }

    pub(crate) fn subject_block(&mut self) {
        let subject = self.doc.subject_line();
        if subject.is_empty() {
            return;
        }
        let lh = self.pager.line_height();
        self.pager.ensure_space(lh);
        let top = self.pager.y();
        self.pager.text_at(top, "Subj:", MARGIN_PT, RunStyle::NORMAL);
        self.draw_flowing(&[StyledRun::plain(subject)], &subject_geometry());
        self.pager.skip_lines(1);
    }

    pub(crate) fn references_and_enclosures(&mut self) {
        let doc = self.doc;
        let refs = self.labeled_list("Ref:", &doc.references, Markers::Lettered);
        let encls = self.labeled_list("Encl:", &doc.enclosures, Markers::Numbered);
        if refs + encls > 0 {
            self.pager.skip_lines(1);
        }
    }

    /// Draw `label` at the margin and the entries at the tab stop, each with
    /// a hanging indent past its marker. Returns the number of entries drawn.
    fn labeled_list(&mut self, label: &str, entries: &[String], markers: Markers) -> usize {
        let entries = non_empty(entries);
        let count = entries.len();
        let fonts = self.pager.fonts();
        let font = self.pager.font();
        let lh = self.pager.line_height();
        let tab_x = MARGIN_PT + TAB_PT;

        for (i, entry) in entries.into_iter().enumerate() {
            self.pager.ensure_space(lh);
            let top = self.pager.y();
            if i == 0 {
                self.pager.text_at(top, label, MARGIN_PT, RunStyle::NORMAL);
            }
            let text_x = match markers.marker(i, count) {
                Some(marker) => {
                    self.pager.text_at(top, &marker, tab_x, RunStyle::NORMAL);
                    tab_x + fonts.measure_text_width(&marker, font, RunStyle::NORMAL) + LABEL_GAP_PT
                }
                None => tab_x,
            };
            let geometry = WrapGeometry::uniform(text_x, RIGHT_EDGE_PT - text_x);
            self.draw_flowing(&[StyledRun::plain(entry)], &geometry);
        }
        count
    }

    /// Draw wrapped text from the cursor, breaking pages between lines.
    /// The caller has already made room for the first line.
    fn draw_flowing(&mut self, runs: &[StyledRun], geometry: &WrapGeometry) {
        let wrapper = self.pager.wrapper();
        let mut y = self.pager.y();
        let mut resume = Resume::start();
        let mut first = true;
        'batches: loop {
            let wrapped = wrapper.wrap_from(runs, geometry, y, resume);
            for line in &wrapped.lines {
                if !first && self.pager.after_draw(line.top) {
                    resume = Resume::after_page_break(line.start);
                    y = self.pager.y();
                    first = true;
                    continue 'batches;
                }
                first = false;
                self.pager.draw_line(line);
            }
            let end = if wrapped.lines.is_empty() {
                y + wrapper.line_height()
            } else {
                wrapped.final_y
            };
            self.pager.set_y(end);
            return;
        }
    }

    fn copy_to_lines(&self) -> usize {
        let entries = non_empty(&self.doc.copy_to);
        if entries.is_empty() {
            return 0;
        }
        let fonts = self.pager.fonts();
        let font = self.pager.font();
        let wrapper = self.pager.wrapper();
        let count = entries.len();
        let body: usize = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let x = copy_to_text_x(Markers::NumberedIfMany.marker(i, count), fonts, font);
                let runs = [StyledRun::plain(*entry)];
                wrapper
                    .wrap(&runs, &WrapGeometry::uniform(x, RIGHT_EDGE_PT - x), 0.0)
                    .lines
                    .len()
            })
            .sum();
        1 + body
    }

    fn signature_lines(&self) -> usize {
        if self.doc.signature_name().is_empty() {
            return 0;
        }
        1 + usize::from(self.doc.signature.by_direction)
    }

    /// Height of the signature and copy-to block when drawn below body text.
    pub(crate) fn end_block_height(&self) -> f32 {
        let lh = self.pager.line_height();
        let signature = self.signature_lines();
        let copy_to = self.copy_to_lines();
        let mut lines = 0;
        if signature > 0 {
            lines += SIGNATURE_GAP_LINES + signature;
        }
        if copy_to > 0 {
            lines += usize::from(signature > 0) + copy_to;
        }
        lines as f32 * lh
    }

    /// Signature and copy-to, kept together as one unit.
    pub(crate) fn end_block(&mut self) {
        let height = self.end_block_height();
        if height <= 0.0 {
            return;
        }
        let lh = self.pager.line_height();
        if self.pager.ensure_space(height) {
            log::debug!("end block moved to page {}", self.pager.cursor().page);
        }

        let doc = self.doc;
        let name = doc.signature_name();
        let has_signature = !name.is_empty();
        if has_signature {
            if !self.pager.at_page_top() {
                self.pager.skip_lines(SIGNATURE_GAP_LINES);
            }
            self.pager.ensure_space(lh);
            let top = self.pager.y();
            self.pager.text_at(top, &name, SIGNATURE_X, RunStyle::NORMAL);
            self.pager.skip_lines(1);
            if doc.signature.by_direction {
                self.pager.ensure_space(lh);
                let top = self.pager.y();
                self.pager
                    .text_at(top, "By direction", SIGNATURE_X, RunStyle::NORMAL);
                self.pager.skip_lines(1);
            }
        }

        let entries = non_empty(&doc.copy_to);
        if entries.is_empty() {
            return;
        }
        if has_signature {
            self.pager.skip_lines(1);
        }
        self.pager.ensure_space(lh);
        let top = self.pager.y();
        self.pager.text_at(top, "Copy to:", MARGIN_PT, RunStyle::NORMAL);
        self.pager.skip_lines(1);

        let fonts = self.pager.fonts();
        let font = self.pager.font();
        let count = entries.len();
        for (i, entry) in entries.into_iter().enumerate() {
            self.pager.ensure_space(lh);
            let top = self.pager.y();
            let marker = Markers::NumberedIfMany.marker(i, count);
            if let Some(marker) = &marker {
                self.pager.text_at(top, marker, MARGIN_PT, RunStyle::NORMAL);
            }
            let x = copy_to_text_x(marker, fonts, font);
            self.draw_flowing(
                &[StyledRun::plain(entry)],
                &WrapGeometry::uniform(x, RIGHT_EDGE_PT - x),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        Classification, DocumentData, Endorsement, Letterhead, Paragraph, ParagraphLevel,
        Signature,
    };
    use crate::fonts::FontManager;
    use crate::layout::{layout_document, LayoutMode};
    use crate::layout_config::{DrawOp, PageLayout, TextOp};
    use crate::pagination::{PaginationRules, CLASSIFICATION_TOP_Y};

    fn base_doc() -> DocumentData {
        DocumentData {
            from: "Commanding Officer, USS Neverdock (DDG 999)".into(),
            to: "Chief of Naval Operations (N1)".into(),
            subject: "Request for training quotas".into(),
            paragraphs: vec![Paragraph::new(ParagraphLevel::Top, "Body text.")],
            signature: Signature {
                name: "j. p. jones".into(),
                by_direction: false,
            },
            ..Default::default()
        }
    }

    fn pages(doc: &DocumentData) -> Vec<PageLayout> {
        let fonts = FontManager::default();
        layout_document(doc, &fonts, &PaginationRules::default(), LayoutMode::Draw).pages
    }

    fn texts(pages: &[PageLayout]) -> Vec<&TextOp> {
        pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn find<'p>(pages: &'p [PageLayout], text: &str) -> Option<&'p TextOp> {
        texts(pages).into_iter().find(|t| t.text == text)
    }

    #[test]
    fn single_via_is_not_numbered() {
        let mut doc = base_doc();
        doc.via = vec!["Commander, Naval Surface Force".into()];
        let pages = pages(&doc);
        assert!(find(&pages, "Via:").is_some());
        assert!(find(&pages, "(1)").is_none());
    }

    #[test]
    fn multiple_vias_are_numbered() {
        let mut doc = base_doc();
        doc.via = vec!["First".into(), "Second".into()];
        let pages = pages(&doc);
        let one = find(&pages, "(1)").unwrap();
        let two = find(&pages, "(2)").unwrap();
        assert_eq!(one.x, MARGIN_PT + TAB_PT);
        assert!(two.y > one.y);
        let first = find(&pages, "First").unwrap();
        assert!(first.x > one.x);
    }

    #[test]
    fn twenty_seven_references() {
        let mut doc = base_doc();
        doc.references = (1..=27).map(|i| format!("OPNAVINST {i}")).collect();
        let pages = pages(&doc);
        for label in ["(a)", "(z)", "(aa)"] {
            assert!(find(&pages, label).is_some(), "missing {label}");
        }
        assert!(find(&pages, "(ab)").is_none());
    }

    #[test]
    fn subject_is_uppercased_at_tab() {
        let pages = pages(&base_doc());
        let subj = find(&pages, "Subj:").unwrap();
        let text = find(&pages, "REQUEST FOR TRAINING QUOTAS").unwrap();
        assert_eq!(subj.x, MARGIN_PT);
        assert_eq!(text.x, MARGIN_PT + TAB_PT);
        assert_eq!(subj.y, text.y);
    }

    #[test]
    fn sender_symbols_end_at_right_margin() {
        let fonts = FontManager::default();
        let mut doc = base_doc();
        doc.ssic = "5216".into();
        doc.office_code = "Ser N1/123".into();
        doc.date = "19 Oct 26".into();
        let pages = pages(&doc);
        let ssic = find(&pages, "5216").unwrap();
        let serial = find(&pages, "Ser N1/123").unwrap();
        assert_eq!(ssic.x, serial.x);
        let width = fonts.measure_text_width("Ser N1/123", doc.font.spec(), RunStyle::NORMAL);
        assert!((serial.x + width - RIGHT_EDGE_PT).abs() < 0.01);
    }

    #[test]
    fn endorsement_heading() {
        let mut doc = base_doc();
        doc.kind = DocumentKind::Endorsement;
        doc.endorsement = Some(Endorsement {
            number: 2,
            on: "CO ltr 5216 Ser N1/123 of 1 Oct 26".into(),
        });
        let pages = pages(&doc);
        assert!(find(&pages, "SECOND ENDORSEMENT on CO ltr 5216 Ser N1/123 of 1 Oct 26").is_some());
    }

    #[test]
    fn memorandum_heading() {
        let mut doc = base_doc();
        doc.kind = DocumentKind::Memorandum;
        assert!(find(&pages(&doc), "MEMORANDUM").is_some());
    }

    #[test]
    fn letterhead_with_seal() {
        let mut doc = base_doc();
        doc.classification = Classification::Cui;
        doc.letterhead = Some(Letterhead {
            unit_name: "USS Neverdock (DDG 999)".into(),
            address_lines: vec!["FPO AE 09999-1234".into()],
            seal: Some(crate::assets::tests::tiny_png_uri()),
        });
        let pages = pages(&doc);
        let title = find(&pages, "DEPARTMENT OF THE NAVY").unwrap();
        assert!(title.bold);
        assert_eq!(title.size, LETTERHEAD_TITLE_SIZE);
        assert_eq!(title.y, LETTERHEAD_TOP_Y + BANNER_CLEARANCE);
        assert!(title.y > CLASSIFICATION_TOP_Y);
        assert!(find(&pages, "USS NEVERDOCK (DDG 999)").is_some());
        let images = pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image(_)))
            .count();
        assert_eq!(images, 1);
        let from = find(&pages, "From:").unwrap();
        assert!(from.y > SEAL_Y + BANNER_CLEARANCE + SEAL_SIZE);
    }

    #[test]
    fn corrupt_seal_is_skipped_without_moving_text() {
        let mut good = base_doc();
        good.letterhead = Some(Letterhead {
            unit_name: "Unit".into(),
            address_lines: vec![],
            seal: None,
        });
        let mut bad = good.clone();
        if let Some(l) = bad.letterhead.as_mut() {
            l.seal = Some("data:image/png;base64,AAAA".into());
        }
        let a = pages(&good);
        let b = pages(&bad);
        assert_eq!(a, b);
    }

    #[test]
    fn signature_at_center_with_by_direction() {
        let mut doc = base_doc();
        doc.signature.by_direction = true;
        let pages = pages(&doc);
        let name = find(&pages, "J. P. JONES").unwrap();
        let by = find(&pages, "By direction").unwrap();
        assert_eq!(name.x, SIGNATURE_X);
        assert_eq!(by.x, SIGNATURE_X);
        assert!(by.y > name.y);
    }

    #[test]
    fn copy_to_numbered_only_when_many() {
        let mut doc = base_doc();
        doc.copy_to = vec!["COMNAVSURFLANT".into()];
        let single = pages(&doc);
        assert!(find(&single, "Copy to:").is_some());
        let entry = find(&single, "COMNAVSURFLANT").unwrap();
        assert_eq!(entry.x, MARGIN_PT);
        assert!(find(&single, "(1)").is_none());

        doc.copy_to.push("COMNAVAIRLANT".into());
        let many = pages(&doc);
        assert_eq!(find(&many, "(2)").unwrap().x, MARGIN_PT);
    }

    #[test]
    fn end_block_height_counts_lines() {
        let fonts = FontManager::default();
        let mut doc = base_doc();
        doc.signature.by_direction = true;
        doc.copy_to = vec!["A".into(), "B".into()];
        let layout = layout_document(&doc, &fonts, &PaginationRules::default(), LayoutMode::Draw);
        assert_eq!(layout.page_count(), 1);

        let lh = fonts.line_height_pt(12.0, crate::pagination::LINE_HEIGHT_FACTOR);
        let font = doc.font.spec();
        let l = Layouter {
            doc: &doc,
            pager: crate::pagination::Paginator::new(&fonts, font, Default::default()),
            rules: PaginationRules::default(),
            numbering: Default::default(),
        };
        // gap 3 + name + by direction, blank + "Copy to:" + 2 entries
        assert!((l.end_block_height() - 9.0 * lh).abs() < 1e-3);
    }
}
