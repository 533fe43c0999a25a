use crate::{data::ImageTransformation, image_id::ImageId, layout::PageLayout};
use image::DynamicImage;
use std::sync::Arc;

type LayoutListener = Box<dyn Fn(&PageLayout) + Send>;

/// Image display parameterized by a layout. The user may drag the split
/// line, which replaces the layout and notifies listeners.
pub struct ImageView {
    image_id: ImageId,
    image: Arc<DynamicImage>,
    xform: ImageTransformation,
    layout: PageLayout,
    on_manual_layout: Vec<LayoutListener>,
}

impl ImageView {
    pub fn new(
        image_id: ImageId,
        image: Arc<DynamicImage>,
        xform: ImageTransformation,
        layout: PageLayout,
    ) -> Self {
        Self {
            image_id,
            image,
            xform,
            layout,
            on_manual_layout: Vec::new(),
        }
    }

    pub fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn xform(&self) -> &ImageTransformation {
        &self.xform
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn connect_manual_layout_set(&mut self, f: impl Fn(&PageLayout) + Send + 'static) {
        self.on_manual_layout.push(Box::new(f));
    }

    /// Apply a layout edited by the user.
    pub fn set_manual_layout(&mut self, layout: PageLayout) {
        self.layout = layout;
        for listener in &self.on_manual_layout {
            listener(&self.layout);
        }
    }
}
