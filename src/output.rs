use crate::{
    data::FilterData,
    error::TaskResult,
    image_id::ImageId,
    layout::PageLayout,
    status::TaskStatus,
    task::{FilterResult, FilterResultPtr, NextTask},
    ui::FilterUiInterface,
    util::ensure_dir,
};
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

/// Downstream stage that cuts the image along the resolved layout and
/// writes each logical sub-page to disk.
pub struct SubPageWriter {
    image_id: ImageId,
    out_dir: PathBuf,
    extension: String,
}

impl SubPageWriter {
    pub fn new(image_id: ImageId, out_dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            image_id,
            out_dir: out_dir.into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }
}

impl NextTask for SubPageWriter {
    fn process(
        self: Box<Self>,
        status: &dyn TaskStatus,
        data: &FilterData,
        layout: &PageLayout,
    ) -> TaskResult<FilterResultPtr> {
        status.throw_if_cancelled()?;

        let rotated = data.xform().pre_rotation().apply(data.image());
        ensure_dir(&self.out_dir)?;

        let spans = layout.sub_page_spans(rotated.width());
        let suffixes: &[&str] = if spans.len() == 2 { &["L", "R"] } else { &[""] };
        let mut outputs = Vec::with_capacity(spans.len());
        for ((start, end), suffix) in spans.into_iter().zip(suffixes) {
            let page = rotated.crop_imm(start, 0, end - start, rotated.height());
            let name = if suffix.is_empty() {
                format!("{}.{}", self.image_id.stem(), self.extension)
            } else {
                format!("{}_{suffix}.{}", self.image_id.stem(), self.extension)
            };
            let path = self.out_dir.join(name);
            page.save(&path)
                .with_context(|| format!("writing sub-page: {}", path.display()))?;
            outputs.push(path);
        }

        info!(image = %self.image_id, pages = outputs.len(), "wrote sub-pages");
        Ok(Box::new(SubPagesWritten {
            image_id: self.image_id,
            outputs,
        }))
    }
}

/// Result of [`SubPageWriter`]: the files it produced.
pub struct SubPagesWritten {
    image_id: ImageId,
    outputs: Vec<PathBuf>,
}

impl SubPagesWritten {
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }
}

impl FilterResult for SubPagesWritten {
    fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    fn materialize(self: Box<Self>, ui: &mut dyn FilterUiInterface) {
        let this = *self;
        ui.show_outputs(&this.image_id, this.outputs);
    }
}
