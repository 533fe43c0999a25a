use crate::{
    classify::classify,
    data::{FilterData, ImageTransformation},
    dependencies::Dependencies,
    error::TaskResult,
    filter::Filter,
    image_id::ImageId,
    layout::PageLayout,
    locator::{DebugImages, SplitLineLocator},
    page_sequence::PageCountRegistry,
    params::Params,
    settings::SettingsStore,
    status::TaskStatus,
    ui::{FilterUiInterface, ImageView, UiData},
};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Presentation payload produced by the last stage of a run.
///
/// Built on a worker thread and sent to the UI thread, which calls
/// [`materialize`](FilterResult::materialize) exactly once.
pub trait FilterResult: Send {
    fn image_id(&self) -> &ImageId;

    fn materialize(self: Box<Self>, ui: &mut dyn FilterUiInterface);
}

pub type FilterResultPtr = Box<dyn FilterResult>;

/// The stage that runs after page splitting, if any.
pub trait NextTask: Send {
    fn process(
        self: Box<Self>,
        status: &dyn TaskStatus,
        data: &FilterData,
        layout: &PageLayout,
    ) -> TaskResult<FilterResultPtr>;
}

/// One page-split run for one image.
///
/// A task is single use: `process` consumes it. Shared state is reached
/// through the handles it was created with.
pub struct Task {
    filter: Arc<Filter>,
    settings: Arc<dyn SettingsStore>,
    page_sequence: Arc<dyn PageCountRegistry>,
    locator: Arc<dyn SplitLineLocator>,
    next_task: Option<Box<dyn NextTask>>,
    image_id: ImageId,
    dbg: Option<DebugImages>,
}

impl Task {
    pub fn new(
        filter: Arc<Filter>,
        page_sequence: Arc<dyn PageCountRegistry>,
        locator: Arc<dyn SplitLineLocator>,
        next_task: Option<Box<dyn NextTask>>,
        image_id: ImageId,
        debug: bool,
    ) -> Self {
        Self {
            settings: Arc::clone(filter.settings()),
            filter,
            page_sequence,
            locator,
            next_task,
            image_id,
            dbg: debug.then(DebugImages::new),
        }
    }

    pub fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    pub fn process(mut self, status: &dyn TaskStatus, data: &FilterData) -> TaskResult<FilterResultPtr> {
        status.throw_if_cancelled()?;

        let pre_rotation = data.xform().pre_rotation();
        let rule = self.settings.rule_for(&self.image_id);
        let classification = classify(rule, &data.metadata(), pre_rotation);
        debug!(
            image = %self.image_id,
            ?rule,
            layout_type = ?classification.layout_type,
            "classified"
        );

        let deps = Dependencies::new(data.image(), pre_rotation, classification.single_page());

        let stored = self.settings.page_params(&self.image_id);
        let mode = stored.as_ref().map(Params::mode).unwrap_or_default();
        let cached = stored.as_ref().and_then(|p| p.layout_if_valid(&deps));

        let layout = match cached {
            Some(layout) => {
                debug!(image = %self.image_id, ?mode, "reusing stored layout");
                layout
            }
            None => {
                let started = Instant::now();
                let layout = self.locator.find_split_line(
                    data.image(),
                    pre_rotation,
                    data.bw_threshold(),
                    classification.single_page(),
                    self.dbg.as_mut(),
                )?;
                info!(
                    image = %self.image_id,
                    kind = ?layout.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "computed layout"
                );

                self.settings
                    .set_page_params(&self.image_id, Params::new(layout, deps.clone(), mode));

                // The stored params stay even if this run is dropped here.
                status.throw_if_cancelled()?;
                layout
            }
        };

        let ui_data = UiData::new(classification.auto_detected, deps, layout, mode);

        self.page_sequence
            .set_logical_pages_in_image(&self.image_id, layout.num_sub_pages());

        match self.next_task {
            Some(next) => {
                debug!(image = %self.image_id, "forwarding to next stage");
                next.process(status, data, &layout)
            }
            None => Ok(Box::new(UiUpdater {
                filter: self.filter,
                dbg: self.dbg,
                image: data.shared_image(),
                xform: *data.xform(),
                image_id: self.image_id,
                ui_data,
            })),
        }
    }
}

/// Everything the UI needs to show a page-split result. Holds data only;
/// nothing UI-owned is touched until `materialize`.
pub struct UiUpdater {
    filter: Arc<Filter>,
    dbg: Option<DebugImages>,
    image: Arc<DynamicImage>,
    xform: ImageTransformation,
    image_id: ImageId,
    ui_data: UiData,
}

impl UiUpdater {
    pub fn ui_data(&self) -> &UiData {
        &self.ui_data
    }
}

impl FilterResult for UiUpdater {
    fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    fn materialize(self: Box<Self>, ui: &mut dyn FilterUiInterface) {
        let this = *self;
        let panel = this.filter.options_panel();
        panel.post_update_ui(&this.image_id, this.ui_data.clone());
        ui.set_options_panel(Arc::clone(&panel));

        let mut view = ImageView::new(
            this.image_id,
            this.image,
            this.xform,
            this.ui_data.page_layout(),
        );
        view.connect_manual_layout_set(move |layout| panel.manual_page_layout_set(*layout));
        ui.set_image_view(view, this.dbg);
    }
}
