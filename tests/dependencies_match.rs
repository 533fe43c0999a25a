use page_split::dependencies::Dependencies;
use page_split::layout::{AutoManualMode, PageLayout, SplitLine};
use page_split::params::Params;
use page_split::rotation::OrthogonalRotation;

fn deps(sig: &str, rot: OrthogonalRotation, single: bool) -> Dependencies {
    Dependencies::from_parts(sig, rot, single)
}

#[test]
fn auto_mode_needs_every_field() {
    let cached = deps("abc", OrthogonalRotation::None, false);
    assert!(deps("abc", OrthogonalRotation::None, false).matches(&cached, AutoManualMode::Auto));
    assert!(!deps("abc", OrthogonalRotation::None, true).matches(&cached, AutoManualMode::Auto));
    assert!(!deps("abd", OrthogonalRotation::None, false).matches(&cached, AutoManualMode::Auto));
    assert!(!deps("abc", OrthogonalRotation::Cw90, false).matches(&cached, AutoManualMode::Auto));
}

#[test]
fn manual_mode_ignores_the_single_page_hint() {
    let cached = deps("abc", OrthogonalRotation::Cw180, false);
    assert!(deps("abc", OrthogonalRotation::Cw180, true).matches(&cached, AutoManualMode::Manual));
    assert!(!deps("xyz", OrthogonalRotation::Cw180, false).matches(&cached, AutoManualMode::Manual));
    assert!(!deps("abc", OrthogonalRotation::None, false).matches(&cached, AutoManualMode::Manual));
}

#[test]
fn params_hand_back_the_layout_only_when_valid() {
    let layout = PageLayout::two_pages(SplitLine::vertical(50.0, 80.0));
    let params = Params::new(
        layout,
        deps("abc", OrthogonalRotation::None, false),
        AutoManualMode::Auto,
    );
    assert_eq!(
        params.layout_if_valid(&deps("abc", OrthogonalRotation::None, false)),
        Some(layout)
    );
    assert_eq!(
        params.layout_if_valid(&deps("abc", OrthogonalRotation::None, true)),
        None
    );
}
