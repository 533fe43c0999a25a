use super::{DebugImages, SplitLineLocator};
use crate::{
    config::Split,
    layout::{PageLayout, SplitLine},
    rotation::OrthogonalRotation,
};
use anyhow::{Result, bail};
use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

const PROFILE_PLOT_HEIGHT: u32 = 128;
/// Columns at or below this share of the peak count as blank paper.
const BLANK_COLUMN_RATIO: f32 = 0.05;

/// Locates the gutter from the vertical ink projection of the binarized
/// image.
#[derive(Debug, Clone)]
pub struct ProjectionLocator {
    cfg: Split,
}

impl ProjectionLocator {
    pub fn new(cfg: &Split) -> Self {
        Self { cfg: cfg.clone() }
    }
}

impl Default for ProjectionLocator {
    fn default() -> Self {
        Self::new(&Split::default())
    }
}

impl SplitLineLocator for ProjectionLocator {
    fn find_split_line(
        &self,
        image: &DynamicImage,
        pre_rotation: OrthogonalRotation,
        bw_threshold: u8,
        single_page: bool,
        mut debug: Option<&mut DebugImages>,
    ) -> Result<PageLayout> {
        let gray = pre_rotation.apply(image).to_luma8();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            bail!("cannot split an empty image ({width}x{height})");
        }

        let ink = binarize(&gray, bw_threshold);
        if let Some(dbg) = debug.as_deref_mut() {
            dbg.add("binarized", ink.clone());
        }

        let profile = column_profile(&ink);
        let smoothed = gaussian_smooth(&profile, (width as f32 / 200.0).max(1.0));
        if let Some(dbg) = debug.as_deref_mut() {
            dbg.add("projection", plot_profile(&smoothed));
        }

        let total: f32 = profile.iter().sum();
        let content_ratio = total / (width as f32 * height as f32);
        let h = f64::from(height);
        if content_ratio < self.cfg.min_content_ratio {
            debug!("content ratio {content_ratio:.4} below minimum; using fallback layout");
            return Ok(fallback(single_page, width, h));
        }

        if single_page {
            Ok(self.single_page_layout(&smoothed, h))
        } else {
            Ok(self.two_page_layout(&smoothed, h))
        }
    }
}

impl ProjectionLocator {
    fn two_page_layout(&self, smoothed: &[f32], height: f64) -> PageLayout {
        let width = smoothed.len();
        let margin = ((width as f32 * self.cfg.edge_exclusion_ratio).floor() as usize).max(1);
        if margin * 2 >= width {
            return fallback(false, width as u32, height);
        }
        let (start, end) = (margin, width - margin);

        let cumulative = cumulative_sum(smoothed);
        let total = cumulative.last().copied().unwrap_or(0.0);
        let peak = smoothed[start..end].iter().copied().fold(0.0f32, f32::max);

        let mut candidates = collect_valleys(smoothed, start, end);
        if candidates.is_empty() {
            candidates.extend(argmin(smoothed, start, end));
        }

        // Prefer a deep valley that leaves similar amounts of ink on each side.
        let best = candidates
            .into_iter()
            .map(|idx| {
                let balance = (cumulative[idx] / (total + 1e-6) - 0.5).abs();
                let depth = smoothed[idx] / (peak + 1e-6);
                (idx, balance + 0.1 * depth)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(width / 2);

        PageLayout::two_pages(SplitLine::vertical(best as f64 + 0.5, height))
    }

    fn single_page_layout(&self, smoothed: &[f32], height: f64) -> PageLayout {
        let width = smoothed.len();
        let cumulative = cumulative_sum(smoothed);
        let total = cumulative.last().copied().unwrap_or(0.0);
        let peak = smoothed.iter().copied().fold(0.0f32, f32::max);
        if total <= f32::EPSILON {
            return PageLayout::single_page_uncut();
        }

        // Blank valley with a sliver of ink on one side: that side is the
        // neighbouring page's edge. Keep the widest such sliver.
        let mut best: Option<(usize, f32, bool)> = None;
        for idx in collect_valleys(smoothed, 1, width.saturating_sub(1)) {
            if smoothed[idx] > peak * BLANK_COLUMN_RATIO {
                continue;
            }
            let left_share = cumulative[idx] / total;
            let (share, offcut_on_left) = if left_share <= 0.5 {
                (left_share, true)
            } else {
                (1.0 - left_share, false)
            };
            if share <= f32::EPSILON || share >= self.cfg.offcut_mass_ratio {
                continue;
            }
            if best.is_none_or(|(_, s, _)| share > s) {
                best = Some((idx, share, offcut_on_left));
            }
        }

        match best {
            Some((idx, _, true)) => {
                PageLayout::right_page_plus_offcut(SplitLine::vertical(idx as f64 + 0.5, height))
            }
            Some((idx, _, false)) => {
                PageLayout::left_page_plus_offcut(SplitLine::vertical(idx as f64 + 0.5, height))
            }
            None => PageLayout::single_page_uncut(),
        }
    }
}

fn fallback(single_page: bool, width: u32, height: f64) -> PageLayout {
    if single_page {
        PageLayout::single_page_uncut()
    } else {
        PageLayout::two_pages(SplitLine::vertical(f64::from(width) / 2.0, height))
    }
}

/// Ink is 255, paper is 0.
fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] < threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

fn column_profile(ink: &GrayImage) -> Vec<f32> {
    let mut profile = vec![0.0f32; ink.width() as usize];
    for (x, _, pixel) in ink.enumerate_pixels() {
        if pixel[0] > 0 {
            profile[x as usize] += 1.0;
        }
    }
    profile
}

fn plot_profile(profile: &[f32]) -> GrayImage {
    let peak = profile.iter().copied().fold(0.0f32, f32::max).max(1.0);
    let width = profile.len().max(1) as u32;
    GrayImage::from_fn(width, PROFILE_PLOT_HEIGHT, |x, y| {
        let value = profile.get(x as usize).copied().unwrap_or(0.0) / peak;
        let bar = (value * PROFILE_PLOT_HEIGHT as f32) as u32;
        if PROFILE_PLOT_HEIGHT - y <= bar {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

fn gaussian_smooth(data: &[f32], sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as isize;
    if data.is_empty() || radius <= 0 {
        return data.to_vec();
    }

    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i as f32).powi(2)) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);

    let last = data.len() as isize - 1;
    (0..data.len() as isize)
        .map(|idx| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sample = (idx + k as isize - radius).clamp(0, last) as usize;
                    data[sample] * weight
                })
                .sum()
        })
        .collect()
}

fn cumulative_sum(data: &[f32]) -> Vec<f32> {
    data.iter()
        .scan(0.0f32, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

fn collect_valleys(data: &[f32], start: usize, end: usize) -> Vec<usize> {
    if data.len() < 3 {
        return Vec::new();
    }
    let upper = end.min(data.len() - 1);
    (start.max(1)..upper)
        .filter(|&i| data[i] <= data[i - 1] && data[i] <= data[i + 1])
        .collect()
}

fn argmin(data: &[f32], start: usize, end: usize) -> Option<usize> {
    (start..end.min(data.len())).min_by(|&a, &b| data[a].total_cmp(&data[b]))
}
