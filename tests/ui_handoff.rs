use image::{DynamicImage, GrayImage, Luma};
use page_split::data::{FilterData, ImageTransformation};
use page_split::filter::Filter;
use page_split::image_id::ImageId;
use page_split::layout::{AutoManualMode, PageLayout, SplitLine};
use page_split::locator::ProjectionLocator;
use page_split::page_sequence::PageSequence;
use page_split::rotation::OrthogonalRotation;
use page_split::settings::{ParamsStore, Settings};
use page_split::status::NeverCancel;
use page_split::ui::{HeadlessUi, ui_channel};
use std::sync::Arc;

fn blank(width: u32, height: u32) -> FilterData {
    FilterData::new(
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255]))),
        ImageTransformation::new(OrthogonalRotation::None, None),
        128,
    )
}

struct Setup {
    settings: Arc<Settings>,
    filter: Arc<Filter>,
    pages: Arc<PageSequence>,
}

fn setup() -> Setup {
    let settings = Arc::new(Settings::new());
    Setup {
        filter: Arc::new(Filter::new(settings.clone())),
        settings,
        pages: Arc::new(PageSequence::new()),
    }
}

fn run(s: &Setup, id: &ImageId, data: &FilterData, debug: bool) -> page_split::task::FilterResultPtr {
    s.filter
        .create_task(
            id.clone(),
            s.pages.clone(),
            Arc::new(ProjectionLocator::default()),
            None,
            debug,
        )
        .process(&NeverCancel, data)
        .unwrap()
}

#[test]
fn results_cross_the_channel_in_order() {
    let s = setup();
    let (tx, rx) = ui_channel();
    let a = ImageId::new("a.png", 0);
    let b = ImageId::new("b.png", 0);

    let worker = {
        let (a, b) = (a.clone(), b.clone());
        let data = blank(80, 40);
        let result_a = run(&s, &a, &data, false);
        let result_b = run(&s, &b, &data, false);
        std::thread::spawn(move || {
            tx.send(result_a).ok();
            tx.send(result_b).ok();
        })
    };
    worker.join().unwrap();

    let mut ui = HeadlessUi::new();
    assert_eq!(rx.run(&mut ui), 2);
    let shown: Vec<_> = ui.shown().iter().map(|s| s.image.clone()).collect();
    assert_eq!(shown, vec![a, b]);
    assert_eq!(s.pages.total_logical_pages(), 4);
}

#[test]
fn drain_is_empty_when_nothing_is_queued() {
    let (_tx, rx) = ui_channel();
    let mut ui = HeadlessUi::new();
    assert_eq!(rx.drain_into(&mut ui), 0);
}

#[test]
fn dragging_the_split_line_stores_a_manual_layout() {
    let s = setup();
    let id = ImageId::new("spread.png", 0);
    let data = blank(80, 40);
    let result = run(&s, &id, &data, false);

    let mut ui = HeadlessUi::new();
    result.materialize(&mut ui);
    let manual = PageLayout::two_pages(SplitLine::vertical(25.0, 40.0));
    ui.image_view_mut().unwrap().set_manual_layout(manual);

    assert_eq!(ui.options_panel().unwrap().current_image(), Some(id.clone()));
    let stored = s.settings.page_params(&id).unwrap();
    assert_eq!(*stored.page_layout(), manual);
    assert_eq!(stored.mode(), AutoManualMode::Manual);
    assert_eq!(
        ui.options_panel().unwrap().ui_data().unwrap().mode(),
        AutoManualMode::Manual
    );

    // The next run keeps the user's line.
    let mut ui = HeadlessUi::new();
    run(&s, &id, &data, false).materialize(&mut ui);
    let shown = ui.shown()[0].ui_data.clone().unwrap();
    assert_eq!(shown.page_layout(), manual);
}

#[test]
fn reset_to_auto_forgets_the_manual_layout() {
    let s = setup();
    let id = ImageId::new("spread.png", 0);
    let data = blank(80, 40);

    let mut ui = HeadlessUi::new();
    run(&s, &id, &data, false).materialize(&mut ui);
    ui.image_view_mut()
        .unwrap()
        .set_manual_layout(PageLayout::two_pages(SplitLine::vertical(25.0, 40.0)));

    let panel = ui.options_panel().unwrap().clone();
    panel.reset_to_auto();
    assert!(s.settings.page_params(&id).is_none());
    assert_eq!(panel.ui_data().unwrap().mode(), AutoManualMode::Auto);

    let mut ui = HeadlessUi::new();
    run(&s, &id, &data, false).materialize(&mut ui);
    let shown = ui.shown()[0].ui_data.clone().unwrap();
    assert_eq!(shown.mode(), AutoManualMode::Auto);
    assert_eq!(shown.page_layout().split_line().unwrap().mean_x(), 40.0);
}

#[test]
fn debug_images_are_written_by_the_ui() {
    let s = setup();
    let dir = tempfile::tempdir().unwrap();
    let id = ImageId::new("book.tif", 2);

    let mut ui = HeadlessUi::new().with_debug_dir(dir.path());
    run(&s, &id, &blank(80, 40), true).materialize(&mut ui);

    let written = &ui.shown()[0].debug_images;
    assert_eq!(written.len(), 2);
    assert!(written[0].ends_with("book_p2_00_binarized.png"));
    assert!(written.iter().all(|p| p.exists()));
}
