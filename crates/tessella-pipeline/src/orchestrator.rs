//! Pipeline orchestration: the state machine that sequences recompute
//! cycles and guards the mosaic store.
//!
//! The orchestrator waits for the external image-loading collaborator
//! to supply a [`Frame`] (pixel buffer + display region), runs the
//! scatter → tessellate → sample sequence as one synchronous cycle, and
//! commits the result to the [`MosaicStore`] as the cycle's last action.
//!
//! Cancellation is by superseding, not interruption: every
//! [`begin`](Orchestrator::begin) bumps a generation counter, and
//! [`commit`](Orchestrator::commit) installs a cycle's result only if no
//! newer cycle has started since. A superseded cycle's scratch data is
//! simply dropped — it never reaches the store. Stage failures leave the
//! previous generation in place as the last-known-good mosaic.

use std::sync::Arc;

use crate::pipeline::Scattered;
use crate::store::MosaicStore;
use crate::types::{ColoredCell, MosaicState, PipelineConfig, PipelineError, PixelBuffer, Region};

/// Orchestrator states, per the recompute lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing requested yet.
    Idle,
    /// A load was requested; waiting for the collaborator's frame.
    AwaitingImage,
    /// A cycle is running (or awaiting commit).
    Recomputing,
    /// The store holds the result of the latest cycle.
    Ready,
    /// The latest cycle failed; the store keeps the last good mosaic.
    Failed,
}

/// One decoded image and the region it is displayed in — everything a
/// recompute cycle needs from the outside world.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Decoded pixels, owned by the image-loading collaborator.
    pub buffer: PixelBuffer<'a>,
    /// Display region: sampling domain and Voronoi clip bounds.
    pub region: Region,
}

/// A finished but uncommitted recompute cycle.
///
/// Owns all of the cycle's scratch output. Dropping it (or committing it
/// after a newer cycle began) discards the cycle without touching the
/// store.
#[must_use = "an uncommitted cycle has no effect — pass it to Orchestrator::commit"]
#[derive(Debug)]
pub struct Cycle {
    generation: u64,
    region: Region,
    outcome: Result<Vec<ColoredCell>, PipelineError>,
}

/// What [`Orchestrator::commit`] did with a cycle.
#[derive(Debug)]
pub enum CommitOutcome {
    /// The cycle's cells were installed as the new generation.
    Committed {
        /// Version of the newly installed generation.
        version: u64,
    },
    /// A newer cycle had started; this cycle's results were discarded.
    Superseded,
    /// The cycle had failed; the error is surfaced and the store keeps
    /// its previous generation.
    Failed(PipelineError),
}

/// Sequences recompute cycles and owns the authoritative mosaic state.
#[derive(Debug)]
pub struct Orchestrator {
    config: PipelineConfig,
    store: MosaicStore,
    state: PipelineState,
    last_error: Option<PipelineError>,
    generation: u64,
}

impl Orchestrator {
    /// A fresh orchestrator in the [`Idle`](PipelineState::Idle) state.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            store: MosaicStore::new(),
            state: PipelineState::Idle,
            last_error: None,
            generation: 0,
        }
    }

    /// Current state-machine state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replace the configuration for subsequent cycles.
    ///
    /// Cycles already begun keep the parameters they started with.
    pub const fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }

    /// Snapshot of the last-known-good mosaic, if any cycle has
    /// committed.
    #[must_use]
    pub fn mosaic(&self) -> Option<Arc<MosaicState>> {
        self.store.snapshot()
    }

    /// The store owning the committed generations.
    #[must_use]
    pub const fn store(&self) -> &MosaicStore {
        &self.store
    }

    /// The most recent cycle failure (or image-unavailable report),
    /// cleared by the next successful commit.
    #[must_use]
    pub const fn last_error(&self) -> Option<&PipelineError> {
        self.last_error.as_ref()
    }

    /// A new image load was requested; wait for the collaborator.
    ///
    /// Any in-flight cycle is superseded immediately.
    pub fn request_image(&mut self) {
        self.generation += 1;
        self.state = PipelineState::AwaitingImage;
    }

    /// The collaborator failed to supply a frame.
    ///
    /// Records [`PipelineError::ImageUnavailable`] and stays in
    /// [`AwaitingImage`](PipelineState::AwaitingImage) until a new load
    /// request arrives — no retries are scheduled.
    pub fn image_unavailable(&mut self) {
        self.last_error = Some(PipelineError::ImageUnavailable);
        self.state = PipelineState::AwaitingImage;
    }

    /// Start a recompute cycle against the supplied frame.
    ///
    /// Runs scatter → tessellate → sample synchronously and returns the
    /// uncommitted result. Starting another cycle before committing this
    /// one supersedes it.
    pub fn begin(&mut self, frame: &Frame<'_>) -> Cycle {
        self.generation += 1;
        self.state = PipelineState::Recomputing;

        let outcome = Scattered::new(frame.region, &self.config)
            .tessellate()
            .map(|tessellated| tessellated.sample(&frame.buffer).into_cells());

        Cycle {
            generation: self.generation,
            region: frame.region,
            outcome,
        }
    }

    /// Commit a finished cycle.
    ///
    /// The store replacement is the final, indivisible action of a
    /// successful cycle. Superseded cycles are discarded without
    /// touching the store or the state machine (the newer cycle governs
    /// both).
    pub fn commit(&mut self, cycle: Cycle) -> CommitOutcome {
        if cycle.generation != self.generation {
            return CommitOutcome::Superseded;
        }
        match self.install(cycle.region, cycle.outcome) {
            Ok(version) => CommitOutcome::Committed { version },
            Err(error) => CommitOutcome::Failed(error),
        }
    }

    /// Run one full load: begin a cycle on the frame and commit it.
    ///
    /// # Errors
    ///
    /// Propagates the failing stage's error; the store keeps the last
    /// good generation and the orchestrator transitions to
    /// [`Failed`](PipelineState::Failed).
    pub fn load(&mut self, frame: &Frame<'_>) -> Result<u64, PipelineError> {
        let cycle = self.begin(frame);
        // No other cycle can start between the begin above and this
        // install, so the cycle is still current.
        self.install(cycle.region, cycle.outcome)
    }

    fn install(
        &mut self,
        region: Region,
        outcome: Result<Vec<ColoredCell>, PipelineError>,
    ) -> Result<u64, PipelineError> {
        match outcome {
            Ok(cells) => {
                let version = self.store.replace(region, cells);
                self.state = PipelineState::Ready;
                self.last_error = None;
                Ok(version)
            }
            Err(error) => {
                self.state = PipelineState::Failed;
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }
}
