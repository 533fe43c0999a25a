//! Presentation side of the stage.
//!
//! Worker threads produce [`FilterResult`](crate::task::FilterResult)
//! payloads and push them through a [`UiSender`]. The thread that owns the
//! UI drains the matching [`UiReceiver`] and materializes each payload into
//! a [`FilterUiInterface`]. Nothing in this module is touched from a worker.

mod headless;
mod options;
mod view;

pub use headless::{HeadlessUi, ShownImage};
pub use options::OptionsPanel;
pub use view::ImageView;

use crate::{
    dependencies::Dependencies,
    image_id::ImageId,
    layout::{AutoManualMode, LayoutType, PageLayout},
    locator::DebugImages,
    task::FilterResultPtr,
};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// What the options panel shows for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiData {
    auto_detected_layout: Option<LayoutType>,
    dependencies: Dependencies,
    page_layout: PageLayout,
    mode: AutoManualMode,
}

impl UiData {
    pub fn new(
        auto_detected_layout: Option<LayoutType>,
        dependencies: Dependencies,
        page_layout: PageLayout,
        mode: AutoManualMode,
    ) -> Self {
        Self {
            auto_detected_layout,
            dependencies,
            page_layout,
            mode,
        }
    }

    pub fn auto_detected_layout(&self) -> Option<LayoutType> {
        self.auto_detected_layout
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn page_layout(&self) -> PageLayout {
        self.page_layout
    }

    pub fn mode(&self) -> AutoManualMode {
        self.mode
    }

    pub(crate) fn set_manual_layout(&mut self, layout: PageLayout) {
        self.page_layout = layout;
        self.mode = AutoManualMode::Manual;
    }
}

/// Surface the UI thread exposes to materializing results.
pub trait FilterUiInterface {
    fn set_options_panel(&mut self, panel: Arc<OptionsPanel>);

    fn set_image_view(&mut self, view: ImageView, debug: Option<DebugImages>);

    /// Files written for an image by an output stage.
    fn show_outputs(&mut self, image: &ImageId, outputs: Vec<PathBuf>);
}

#[derive(Clone)]
pub struct UiSender {
    tx: Sender<FilterResultPtr>,
}

impl UiSender {
    /// Hand a result to the UI thread. Returns it back if the UI side
    /// is gone.
    pub fn send(&self, result: FilterResultPtr) -> Result<(), FilterResultPtr> {
        self.tx.send(result).map_err(|e| e.into_inner())
    }
}

pub struct UiReceiver {
    rx: Receiver<FilterResultPtr>,
}

impl UiReceiver {
    /// Materialize whatever is queued right now.
    pub fn drain_into(&self, ui: &mut dyn FilterUiInterface) -> usize {
        let mut n = 0;
        while let Ok(result) = self.rx.try_recv() {
            result.materialize(ui);
            n += 1;
        }
        n
    }

    /// Materialize results until every sender is dropped.
    pub fn run(&self, ui: &mut dyn FilterUiInterface) -> usize {
        let mut n = 0;
        for result in self.rx.iter() {
            result.materialize(ui);
            n += 1;
        }
        n
    }
}

pub fn ui_channel() -> (UiSender, UiReceiver) {
    let (tx, rx) = unbounded();
    (UiSender { tx }, UiReceiver { rx })
}
