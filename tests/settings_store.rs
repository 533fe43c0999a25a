use page_split::dependencies::Dependencies;
use page_split::image_id::ImageId;
use page_split::layout::{AutoManualMode, PageLayout, SplitLine};
use page_split::params::Params;
use page_split::rotation::OrthogonalRotation;
use page_split::rule::Rule;
use page_split::settings::{ParamsStore, RuleRepository, Settings};

fn img(name: &str) -> ImageId {
    ImageId::new(name, 0)
}

#[test]
fn rules_default_and_override() {
    let settings = Settings::new();
    assert_eq!(settings.rule_for(&img("a.png")), Rule::AutoDetect);

    settings.set_rule(&img("a.png"), Rule::TwoPages);
    assert_eq!(settings.rule_for(&img("a.png")), Rule::TwoPages);
    assert_eq!(settings.rule_for(&img("b.png")), Rule::AutoDetect);

    settings.set_rule_for_all(Rule::SinglePage);
    assert_eq!(settings.rule_for(&img("a.png")), Rule::SinglePage);
    assert_eq!(settings.rule_for(&img("b.png")), Rule::SinglePage);
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("nope.json")).unwrap();
    assert!(settings.page_params(&img("a.png")).is_none());
}

#[test]
fn save_and_load_keep_rules_and_params() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let params = Params::new(
        PageLayout::right_page_plus_offcut(SplitLine::vertical(12.5, 300.0)),
        Dependencies::from_parts("feed", OrthogonalRotation::Cw270, true),
        AutoManualMode::Manual,
    );
    let multi = ImageId::new("book.tif", 3);

    let settings = Settings::new();
    settings.set_rule_for_all(Rule::TwoPages);
    settings.set_rule(&img("a.png"), Rule::SinglePage);
    settings.set_page_params(&multi, params.clone());
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.rule_for(&img("a.png")), Rule::SinglePage);
    assert_eq!(loaded.rule_for(&img("other.png")), Rule::TwoPages);
    assert_eq!(loaded.page_params(&multi), Some(params));
    assert!(loaded.page_params(&ImageId::new("book.tif", 0)).is_none());
}

#[test]
fn clear_removes_params() {
    let settings = Settings::new();
    let params = Params::new(
        PageLayout::single_page_uncut(),
        Dependencies::from_parts("x", OrthogonalRotation::None, true),
        AutoManualMode::Auto,
    );
    settings.set_page_params(&img("a.png"), params.clone());
    assert_eq!(settings.clear_page_params(&img("a.png")), Some(params));
    assert!(settings.page_params(&img("a.png")).is_none());
}
