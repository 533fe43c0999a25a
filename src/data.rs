use crate::{
    config::Config, decode::decode_frame, image_id::ImageId, page_sequence::ImageMetadata,
    rotation::OrthogonalRotation,
};
use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;

/// Geometric context of an image as it enters this stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransformation {
    pre_rotation: OrthogonalRotation,
    dpi: Option<(f64, f64)>,
}

impl ImageTransformation {
    pub fn new(pre_rotation: OrthogonalRotation, dpi: Option<(f64, f64)>) -> Self {
        Self { pre_rotation, dpi }
    }

    pub fn pre_rotation(&self) -> OrthogonalRotation {
        self.pre_rotation
    }

    pub fn dpi(&self) -> Option<(f64, f64)> {
        self.dpi
    }
}

/// Input handed from the previous stage: the raw image and how to look
/// at it. The pixels are shared so results can keep them cheaply.
#[derive(Debug, Clone)]
pub struct FilterData {
    image: Arc<DynamicImage>,
    xform: ImageTransformation,
    bw_threshold: u8,
}

impl FilterData {
    pub fn new(image: DynamicImage, xform: ImageTransformation, bw_threshold: u8) -> Self {
        Self {
            image: Arc::new(image),
            xform,
            bw_threshold,
        }
    }

    /// Decode frame `id.page` of `id.path`. The resolution stored in the
    /// file wins over the configured fallback.
    pub fn load(cfg: &Config, id: &ImageId, pre_rotation: OrthogonalRotation) -> Result<Self> {
        let frame = decode_frame(&id.path, id.page)?;
        let (fx, fy) = (cfg.split.default_dpi_x, cfg.split.default_dpi_y);
        let dpi = frame.dpi.or((fx > 0.0 && fy > 0.0).then_some((fx, fy)));
        Ok(Self::new(
            frame.image,
            ImageTransformation::new(pre_rotation, dpi),
            cfg.split.bw_threshold,
        ))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn shared_image(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.image)
    }

    pub fn xform(&self) -> &ImageTransformation {
        &self.xform
    }

    pub fn bw_threshold(&self) -> u8 {
        self.bw_threshold
    }

    pub fn metadata(&self) -> ImageMetadata {
        ImageMetadata {
            width: self.image.width(),
            height: self.image.height(),
            dpi: self.xform.dpi,
        }
    }
}
