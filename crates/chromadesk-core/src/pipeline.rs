//! The daily update run.
//!
//! Stages, in order: check enabled, fetch metadata, decide freshness, download, apply,
//! record state, prune history, notify. A failure in fetch/download/apply ends the run
//! as a failure and leaves the stored state alone. Failures after a successful apply are
//! logged and never change the verdict.
//!
//! Freshness is keyed on the local calendar day of the last successful apply, not on the
//! date the source labels its image with. One pipeline instance per user at a time is
//! assumed; nothing here guards the wallpaper directory against concurrent runs.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::ports::{BackgroundApplier, Clock, ImageTransport, MetadataFetcher, UpdateStateStore};
use crate::store::ImageStore;

pub const NOTIFY_TITLE: &str = "ChromaDesk Update";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Disabled,
    AlreadyCurrent { date: NaiveDate },
    Updated(UpdateReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub path: PathBuf,
    pub image_date: NaiveDate,
    pub title: String,
    pub reused: bool,
    pub pruned: usize,
    /// Today's date was written to the state store during this run.
    pub state_recorded: bool,
}

pub struct UpdatePipeline<F, T, A, S, C> {
    pub fetcher: F,
    pub store: ImageStore<T>,
    pub applier: A,
    pub state: S,
    pub clock: C,
    pub notify: bool,
}

impl<F, T, A, S, C> UpdatePipeline<F, T, A, S, C>
where
    F: MetadataFetcher,
    T: ImageTransport,
    A: BackgroundApplier,
    S: UpdateStateStore,
    C: Clock,
{
    pub fn new(fetcher: F, store: ImageStore<T>, applier: A, state: S, clock: C) -> Self {
        Self {
            fetcher,
            store,
            applier,
            state,
            clock,
            notify: true,
        }
    }

    pub fn with_notifications(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Run today's update once. Safe to call repeatedly: after the first success of the
    /// day, later runs stop at the freshness check.
    pub fn run(&self) -> Result<RunOutcome, PipelineError> {
        info!("Starting daily update check");
        let result = self.run_stages();
        match &result {
            Ok(outcome) => info!(?outcome, "Daily update finished"),
            Err(e) => error!(stage = e.stage(), error = %e, "Daily update failed"),
        }
        result
    }

    fn run_stages(&self) -> Result<RunOutcome, PipelineError> {
        let state = self.state.read();
        if !state.enabled {
            info!("Daily updates are disabled, skipping");
            return Ok(RunOutcome::Disabled);
        }

        info!(region = %state.region, "Fetching featured image info");
        let image = self.fetcher.fetch(&state.region)?;
        info!(image_date = %image.date, title = image.display_title(), "Fetched featured image info");

        let today = self.clock.today();
        if state.last_update_date == Some(today) {
            info!(%today, "Wallpaper already updated today, skipping");
            return Ok(RunOutcome::AlreadyCurrent { date: today });
        }
        info!(
            last = ?state.last_update_date,
            %today,
            "Proceeding with update"
        );

        self.store.ensure_directory()?;
        let stored = self.store.materialize(&image)?;

        info!(path = %stored.path.display(), "Applying wallpaper");
        self.applier.apply(&stored.path)?;
        info!("Wallpaper applied");

        let state_recorded = self.record(state.last_update_date, today);

        let pruned = match self.store.prune(state.keep_history) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Pruning wallpaper history failed");
                0
            }
        };

        if self.notify {
            let body = format!("Wallpaper updated successfully to: {}", image.display_title());
            if let Err(e) = self.applier.notify(NOTIFY_TITLE, &body) {
                warn!(error = %e, "Failed to send notification");
            }
        }

        Ok(RunOutcome::Updated(UpdateReport {
            path: stored.path,
            image_date: image.date,
            title: image.display_title().to_string(),
            reused: stored.reused,
            pruned,
            state_recorded,
        }))
    }

    /// Persist `today` unless that would move the stored date backwards.
    /// Returns whether a write happened.
    fn record(&self, last: Option<NaiveDate>, today: NaiveDate) -> bool {
        if let Some(last) = last.filter(|last| *last > today) {
            warn!(%last, %today, "Stored update date is ahead of the clock, keeping it");
            return false;
        }
        match self.state.write_last_update_date(today) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to record update date; tomorrow's run may redo today's work");
                false
            }
        }
    }
}
