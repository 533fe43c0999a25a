use page_split::classify::classify;
use page_split::layout::LayoutType;
use page_split::page_sequence::{ImageMetadata, advise_number_of_logical_pages};
use page_split::rotation::OrthogonalRotation;
use page_split::rule::Rule;

fn meta(width: u32, height: u32) -> ImageMetadata {
    ImageMetadata {
        width,
        height,
        dpi: None,
    }
}

#[test]
fn landscape_scan_is_a_spread() {
    let c = classify(Rule::AutoDetect, &meta(3000, 2000), OrthogonalRotation::None);
    assert_eq!(c.layout_type, LayoutType::TwoPages);
    assert_eq!(c.auto_detected, Some(LayoutType::TwoPages));
    assert!(!c.single_page());
}

#[test]
fn portrait_and_square_scans_are_single() {
    let c = classify(Rule::AutoDetect, &meta(2000, 3000), OrthogonalRotation::None);
    assert_eq!(c.layout_type, LayoutType::SinglePage);
    let c = classify(Rule::AutoDetect, &meta(2000, 2000), OrthogonalRotation::None);
    assert!(c.single_page());
}

#[test]
fn rotation_is_applied_before_the_aspect_test() {
    let c = classify(Rule::AutoDetect, &meta(3000, 2000), OrthogonalRotation::Cw90);
    assert_eq!(c.layout_type, LayoutType::SinglePage);
    let c = classify(Rule::AutoDetect, &meta(3000, 2000), OrthogonalRotation::Cw180);
    assert_eq!(c.layout_type, LayoutType::TwoPages);
}

#[test]
fn resolution_changes_the_physical_aspect() {
    // 3000x2000 pixels at 600x300 dpi is 5x6.67 inches: portrait.
    let m = ImageMetadata {
        width: 3000,
        height: 2000,
        dpi: Some((600.0, 300.0)),
    };
    assert_eq!(
        advise_number_of_logical_pages(&m, OrthogonalRotation::None),
        LayoutType::SinglePage
    );
}

#[test]
fn forced_rules_skip_the_heuristic() {
    let c = classify(Rule::SinglePage, &meta(3000, 2000), OrthogonalRotation::None);
    assert_eq!(c.layout_type, LayoutType::SinglePage);
    assert_eq!(c.auto_detected, None);

    let c = classify(Rule::TwoPages, &meta(2000, 3000), OrthogonalRotation::None);
    assert_eq!(c.layout_type, LayoutType::TwoPages);
    assert_eq!(c.auto_detected, None);
}

#[test]
fn rules_parse_from_short_and_long_names() {
    assert_eq!("auto".parse::<Rule>().unwrap(), Rule::AutoDetect);
    assert_eq!("TWO_PAGES".parse::<Rule>().unwrap(), Rule::TwoPages);
    assert_eq!("single".parse::<Rule>().unwrap(), Rule::SinglePage);
    assert!("three".parse::<Rule>().is_err());
}
