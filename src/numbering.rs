//! Paragraph and list numbering.
//!
//! Paragraph numbers are derived while walking the flattened paragraph
//! list; nothing is stored on the paragraphs themselves.

use crate::document::ParagraphLevel;

/// Lower-case letter sequence: 0 → "a", 25 → "z", 26 → "aa", 27 → "ab".
pub fn letter_label(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Current counters for the four paragraph levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberingState {
    pub top: u32,
    pub sub: u32,
    pub subsub: u32,
    pub subsubsub: u32,
}

impl NumberingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step the counter for `level`, zeroing every deeper counter first,
    /// and return the label for the new paragraph.
    pub fn advance(&mut self, level: ParagraphLevel) -> String {
        match level {
            ParagraphLevel::Top => {
                self.sub = 0;
                self.subsub = 0;
                self.subsubsub = 0;
                self.top += 1;
            }
            ParagraphLevel::Sub => {
                self.subsub = 0;
                self.subsubsub = 0;
                self.sub += 1;
            }
            ParagraphLevel::SubSub => {
                self.subsubsub = 0;
                self.subsub += 1;
            }
            ParagraphLevel::SubSubSub => {
                self.subsubsub += 1;
            }
        }
        self.label(level)
    }

    /// Label for the current counter value at `level`.
    pub fn label(&self, level: ParagraphLevel) -> String {
        match level {
            ParagraphLevel::Top => format!("{}.", self.top),
            ParagraphLevel::Sub => format!("{}.", letter_label(self.sub.saturating_sub(1) as usize)),
            ParagraphLevel::SubSub => format!("({})", self.subsub),
            ParagraphLevel::SubSubSub => {
                format!("({})", letter_label(self.subsubsub.saturating_sub(1) as usize))
            }
        }
    }
}

/// "(a)", "(b)", … for reference lists.
pub fn reference_label(index: usize) -> String {
    format!("({})", letter_label(index))
}

/// "(1)", "(2)", … for via, enclosure and copy-to lists.
pub fn numbered_label(index: usize) -> String {
    format!("({})", index + 1)
}

/// Ordinal word for endorsement headings ("FIRST", "SECOND", …).
pub fn ordinal_word(n: u32) -> String {
    const WORDS: [&str; 10] = [
        "FIRST", "SECOND", "THIRD", "FOURTH", "FIFTH", "SIXTH", "SEVENTH", "EIGHTH", "NINTH",
        "TENTH",
    ];
    match n {
        1..=10 => WORDS[n as usize - 1].to_string(),
        _ => {
            let suffix = match (n % 10, n % 100) {
                (_, 11..=13) => "TH",
                (1, _) => "ST",
                (2, _) => "ND",
                (3, _) => "RD",
                _ => "TH",
            };
            format!("{n}{suffix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ParagraphLevel::*;

    #[test]
    fn letter_sequence() {
        assert_eq!(letter_label(0), "a");
        assert_eq!(letter_label(25), "z");
        assert_eq!(letter_label(26), "aa");
        assert_eq!(letter_label(27), "ab");
        assert_eq!(letter_label(51), "az");
        assert_eq!(letter_label(52), "ba");
        assert_eq!(letter_label(701), "zz");
        assert_eq!(letter_label(702), "aaa");
    }

    #[test]
    fn twenty_seven_references() {
        let labels: Vec<String> = (0..27).map(reference_label).collect();
        assert_eq!(labels[0], "(a)");
        assert_eq!(labels[25], "(z)");
        assert_eq!(labels[26], "(aa)");
    }

    #[test]
    fn labels_per_level() {
        let mut n = NumberingState::new();
        assert_eq!(n.advance(Top), "1.");
        assert_eq!(n.advance(Sub), "a.");
        assert_eq!(n.advance(SubSub), "(1)");
        assert_eq!(n.advance(SubSubSub), "(a)");
        assert_eq!(n.advance(SubSubSub), "(b)");
        assert_eq!(n.advance(SubSub), "(2)");
        assert_eq!(n.advance(SubSubSub), "(a)");
        assert_eq!(n.advance(Sub), "b.");
        assert_eq!(n.advance(SubSub), "(1)");
        assert_eq!(n.advance(Top), "2.");
        assert_eq!(n.advance(Sub), "a.");
    }

    #[test]
    fn reset_law_holds_for_every_sequence() {
        let seq = [Top, Sub, Sub, SubSub, SubSubSub, Top, SubSub, Sub, SubSubSub, Top];
        let mut n = NumberingState::new();
        for level in seq {
            let before = n;
            n.advance(level);
            let deeper = match level {
                Top => [n.sub, n.subsub, n.subsubsub],
                Sub => [0, n.subsub, n.subsubsub],
                SubSub => [0, 0, n.subsubsub],
                SubSubSub => [0, 0, 0],
            };
            assert_eq!(deeper, [0, 0, 0], "after {level:?} from {before:?}");
        }
    }

    #[test]
    fn sub_beyond_z() {
        let mut n = NumberingState::new();
        n.advance(Top);
        let mut last = String::new();
        for _ in 0..27 {
            last = n.advance(Sub);
        }
        assert_eq!(last, "aa.");
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal_word(1), "FIRST");
        assert_eq!(ordinal_word(10), "TENTH");
        assert_eq!(ordinal_word(11), "11TH");
        assert_eq!(ordinal_word(22), "22ND");
    }
}
