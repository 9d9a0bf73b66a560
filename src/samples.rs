//! Sample documents for testing and demonstration.
//!
//! Each sample exercises a different part of the layout: headings, nesting
//! levels, inline markup, page breaks and the end block.

use crate::document::{
    Classification, DocumentData, DocumentKind, Endorsement, Letterhead, Paragraph,
    ParagraphLevel, Signature,
};

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 4] = ["basic-letter", "memorandum", "endorsement", "long-letter"];

/// Look up a sample by name.
pub fn by_name(name: &str) -> Option<DocumentData> {
    match name {
        "basic-letter" => Some(basic_letter()),
        "memorandum" => Some(memorandum()),
        "endorsement" => Some(endorsement()),
        "long-letter" => Some(long_letter()),
        _ => None,
    }
}

fn para(level: ParagraphLevel, content: &str) -> Paragraph {
    Paragraph::new(level, content)
}

/// One-page standard letter with letterhead, references and a copy-to list.
pub fn basic_letter() -> DocumentData {
    DocumentData {
        ssic: "1500".into(),
        office_code: "Ser N7/0412".into(),
        date: "19 Oct 26".into(),
        letterhead: Some(Letterhead {
            unit_name: "USS Neverdock (DDG 999)".into(),
            address_lines: vec!["FPO AE 09599-1234".into()],
            seal: None,
        }),
        from: "Commanding Officer, USS Neverdock (DDG 999)".into(),
        to: "Commander, Naval Surface Force Atlantic".into(),
        subject: "Request for additional damage control training quotas".into(),
        references: vec![
            "OPNAVINST 1500.22H".into(),
            "COMNAVSURFLANT ltr 1500 Ser N7/201 of 2 Sep 26".into(),
        ],
        enclosures: vec!["Training requirement summary".into()],
        paragraphs: vec![
            para(
                ParagraphLevel::Top,
                "Per references (a) and (b), request eight additional quotas for the \
                 Damage Control Assistant course during the first quarter. The current \
                 allocation leaves three repair lockers without a qualified leader.",
            )
            .with_subject("Purpose."),
            para(
                ParagraphLevel::Top,
                "Enclosure (1) lists the affected billets. The ship is in a basic phase \
                 and can release the members for the full course length.",
            ),
            para(ParagraphLevel::Sub, "Repair 2 requires <b>three</b> quotas."),
            para(ParagraphLevel::Sub, "Repair 3 and Repair 5 require <i>five</i> quotas."),
            para(
                ParagraphLevel::Top,
                "Point of contact is LT J. Smith, Damage Control Assistant.",
            ),
        ],
        signature: Signature {
            name: "J. P. Jones".into(),
            by_direction: false,
        },
        copy_to: vec!["COMDESRON 26".into()],
        ..Default::default()
    }
}

/// Memorandum marked CUI with portion markings.
pub fn memorandum() -> DocumentData {
    let mut marked = para(
        ParagraphLevel::Top,
        "All departments will submit updated recall rosters by 1 November. \
         Rosters must list a <u>current</u> personal phone number.",
    );
    marked.portion_marking = Some("U".into());
    let mut sensitive = para(
        ParagraphLevel::Top,
        "Rosters contain personally identifiable information.  Store them in the \
         department safe.",
    );
    sensitive.portion_marking = Some("CUI".into());

    DocumentData {
        classification: Classification::Cui,
        kind: DocumentKind::Memorandum,
        date: "19 Oct 26".into(),
        from: "Executive Officer".into(),
        to: "All Department Heads".into(),
        subject: "Recall roster update".into(),
        paragraphs: vec![marked, sensitive],
        signature: Signature {
            name: "A. B. Seaman".into(),
            by_direction: true,
        },
        portion_marking: true,
        ..Default::default()
    }
}

/// First endorsement forwarding a letter through the chain of command.
pub fn endorsement() -> DocumentData {
    DocumentData {
        kind: DocumentKind::Endorsement,
        ssic: "1500".into(),
        date: "21 Oct 26".into(),
        endorsement: Some(Endorsement {
            number: 1,
            on: "CO USS Neverdock ltr 1500 Ser N7/0412 of 19 Oct 26".into(),
        }),
        from: "Commander, Destroyer Squadron 26".into(),
        to: "Commander, Naval Surface Force Atlantic".into(),
        via: vec![
            "Commander, Carrier Strike Group 8".into(),
            "Commander, Naval Surface Group 2".into(),
        ],
        subject: "Request for additional damage control training quotas".into(),
        paragraphs: vec![para(ParagraphLevel::Top, "Forwarded, recommending approval.")],
        signature: Signature {
            name: "R. T. Halsey".into(),
            by_direction: true,
        },
        ..Default::default()
    }
}

/// Several pages of nested paragraphs ending in a long final paragraph.
pub fn long_letter() -> DocumentData {
    let sentence = "The division will complete the required maintenance actions, record \
                    each action in the current ship's maintenance project, and report \
                    any deferred items to the department head. ";
    let mut paragraphs = Vec::new();
    for section in 0..6 {
        paragraphs.push(
            para(ParagraphLevel::Top, &sentence.repeat(3 + section % 3))
                .with_subject("Maintenance."),
        );
        paragraphs.push(para(ParagraphLevel::Sub, &sentence.repeat(2)));
        paragraphs.push(para(ParagraphLevel::SubSub, &sentence.repeat(1)));
        paragraphs.push(para(ParagraphLevel::SubSubSub, "Verify tag-out.\nLog the result."));
    }
    paragraphs.push(para(ParagraphLevel::Top, &sentence.repeat(12)));

    DocumentData {
        classification: Classification::Fouo,
        ssic: "4700".into(),
        office_code: "Ser 30/118".into(),
        date: "19 Oct 26".into(),
        from: "Commanding Officer, USS Neverdock (DDG 999)".into(),
        to: "Commander, Naval Surface Force Atlantic".into(),
        subject: "Quarterly maintenance status report".into(),
        references: (0..4).map(|i| format!("NAVSEA Tech Manual S9086-{i}")).collect(),
        paragraphs,
        signature: Signature {
            name: "J. P. Jones".into(),
            by_direction: false,
        },
        copy_to: vec!["COMDESRON 26".into(), "SURFMEPP".into()],
        ..Default::default()
    }
}
