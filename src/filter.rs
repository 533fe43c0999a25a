use crate::{
    image_id::ImageId,
    locator::SplitLineLocator,
    page_sequence::PageCountRegistry,
    settings::SettingsStore,
    task::{NextTask, Task},
    ui::OptionsPanel,
};
use std::sync::Arc;

/// The page-split filter: long-lived owner of the options panel and the
/// settings handle. Creates one [`Task`] per image run.
pub struct Filter {
    settings: Arc<dyn SettingsStore>,
    options_panel: Arc<OptionsPanel>,
}

impl Filter {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        let options_panel = Arc::new(OptionsPanel::new(Arc::clone(&settings)));
        Self {
            settings,
            options_panel,
        }
    }

    pub fn name(&self) -> &'static str {
        "page-split"
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn options_panel(&self) -> Arc<OptionsPanel> {
        Arc::clone(&self.options_panel)
    }

    pub fn create_task(
        self: &Arc<Self>,
        image_id: ImageId,
        page_sequence: Arc<dyn PageCountRegistry>,
        locator: Arc<dyn SplitLineLocator>,
        next_task: Option<Box<dyn NextTask>>,
        debug: bool,
    ) -> Task {
        Task::new(
            Arc::clone(self),
            page_sequence,
            locator,
            next_task,
            image_id,
            debug,
        )
    }
}
