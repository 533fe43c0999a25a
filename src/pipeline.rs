use crate::{
    config::Config,
    data::FilterData,
    error::{TaskError, TaskResult},
    filter::Filter,
    image_id::ImageId,
    locator::SplitLineLocator,
    output::SubPageWriter,
    page_sequence::PageSequence,
    report::{ItemReport, ItemStatus, JobReport},
    rotation::OrthogonalRotation,
    settings::{ParamsStore, Settings},
    status::TaskStatus,
    task::{FilterResultPtr, NextTask},
    ui::{FilterUiInterface, ui_channel},
    util::now_rfc3339,
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Owns the shared state of a job and runs the page-split stage over a
/// set of images.
///
/// Runs execute on a worker pool, one image per unit of work. Their
/// results are materialized on the calling thread, which plays the part
/// of the UI thread.
pub struct Pipeline {
    cfg: Config,
    settings: Arc<Settings>,
    page_sequence: Arc<PageSequence>,
    filter: Arc<Filter>,
    locator: Arc<dyn SplitLineLocator>,
}

struct RunOutcome {
    image: ImageId,
    status: ItemStatus,
    error: Option<String>,
}

impl Pipeline {
    pub fn new(cfg: &Config, settings: Arc<Settings>, locator: Arc<dyn SplitLineLocator>) -> Self {
        let filter = Arc::new(Filter::new(settings.clone()));
        Self {
            cfg: cfg.clone(),
            settings,
            page_sequence: Arc::new(PageSequence::new()),
            filter,
            locator,
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn page_sequence(&self) -> &Arc<PageSequence> {
        &self.page_sequence
    }

    pub fn filter(&self) -> &Arc<Filter> {
        &self.filter
    }

    /// Load one image and run it through the stage chain.
    pub fn run_image(
        &self,
        status: &dyn TaskStatus,
        image: &ImageId,
        rotation: OrthogonalRotation,
        out_dir: &Path,
    ) -> TaskResult<FilterResultPtr> {
        status.throw_if_cancelled()?;
        let data = FilterData::load(&self.cfg, image, rotation)?;

        let next: Option<Box<dyn NextTask>> = if self.cfg.output.write_sub_pages {
            Some(Box::new(SubPageWriter::new(
                image.clone(),
                out_dir,
                &self.cfg.output.image_format,
            )))
        } else {
            None
        };

        let task = self.filter.create_task(
            image.clone(),
            self.page_sequence.clone(),
            self.locator.clone(),
            next,
            self.cfg.debug.enabled,
        );
        task.process(status, &data)
    }

    pub fn run_job(
        &self,
        images: &[ImageId],
        rotation: OrthogonalRotation,
        out_dir: &Path,
        status: &dyn TaskStatus,
        ui: &mut dyn FilterUiInterface,
    ) -> Result<JobReport> {
        let started = now_rfc3339();
        let clock = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.cfg.global.max_parallel_images)
            .thread_name(|i| format!("page-split-{i}"))
            .build()
            .context("building worker pool")?;

        info!(
            filter = self.filter.name(),
            images = images.len(),
            threads = pool.current_num_threads(),
            "starting page-split job"
        );

        let (tx, rx) = ui_channel();
        let outcomes = std::thread::scope(|scope| {
            let worker = scope.spawn(move || {
                pool.install(|| {
                    images
                        .par_iter()
                        .map(|image| {
                            let result = self.run_image(status, image, rotation, out_dir);
                            match result {
                                Ok(result) => {
                                    if tx.send(result).is_err() {
                                        warn!(%image, "UI side closed; result dropped");
                                    }
                                    RunOutcome::new(image, ItemStatus::Ok, None)
                                }
                                Err(TaskError::Cancelled) => {
                                    info!(%image, "run cancelled");
                                    RunOutcome::new(image, ItemStatus::Cancelled, None)
                                }
                                Err(TaskError::Other(err)) => {
                                    warn!(%image, "run failed: {err:#}");
                                    RunOutcome::new(image, ItemStatus::Failed, Some(format!("{err:#}")))
                                }
                            }
                        })
                        .collect::<Vec<_>>()
                })
            });

            let shown = rx.run(ui);
            debug!(shown, "UI queue drained");
            worker.join().map_err(|_| anyhow!("worker thread panicked"))
        })?;

        let items = outcomes
            .into_iter()
            .map(|o| self.item_report(o))
            .collect::<Vec<_>>();

        let report = JobReport {
            job_name: self.cfg.global.job_name.clone(),
            started,
            finished: now_rfc3339(),
            total_images: images.len(),
            total_logical_pages: self.page_sequence.total_logical_pages(),
            items,
        };

        info!(
            ok = report.count(ItemStatus::Ok),
            cancelled = report.count(ItemStatus::Cancelled),
            failed = report.count(ItemStatus::Failed),
            logical_pages = report.total_logical_pages,
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "page-split job finished"
        );
        Ok(report)
    }

    fn item_report(&self, outcome: RunOutcome) -> ItemReport {
        let (layout, mode, sub_pages) = if outcome.status == ItemStatus::Ok {
            let params = self.settings.page_params(&outcome.image);
            (
                params.as_ref().map(|p| *p.page_layout()),
                params.as_ref().map(|p| p.mode()),
                self.page_sequence.logical_pages_in_image(&outcome.image),
            )
        } else {
            (None, None, None)
        };
        ItemReport {
            image: outcome.image,
            status: outcome.status,
            error: outcome.error,
            layout,
            mode,
            sub_pages,
            outputs: Vec::new(),
        }
    }
}

impl RunOutcome {
    fn new(image: &ImageId, status: ItemStatus, error: Option<String>) -> Self {
        Self {
            image: image.clone(),
            status,
            error,
        }
    }
}
