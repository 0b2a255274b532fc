// ============================================================
// Layer 2 — PipelineUseCase
// ============================================================
// Runs the five stages in order and tracks where the run is:
//
//   Idle → Ingesting → Preprocessing → FeatureEngineering
//        → Training → Evaluating → Done
//
// Any stage error moves the run to Failed and stops it there.
// There are no retries; rerunning the pipeline overwrites
// whatever partial output the failed run left behind.

use crate::application::evaluate_use_case::EvaluateUseCase;
use crate::application::features_use_case::FeaturesUseCase;
use crate::application::ingest_use_case::IngestUseCase;
use crate::application::preprocess_use_case::PreprocessUseCase;
use crate::application::stage::{run_stage, Stage, StageContext};
use crate::application::train_use_case::TrainUseCase;
use crate::domain::error::PipelineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Ingesting,
    Preprocessing,
    FeatureEngineering,
    Training,
    Evaluating,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

pub struct PipelineUseCase {
    stages:  Vec<(PipelineState, Box<dyn Stage>)>,
    state:   PipelineState,
    history: Vec<PipelineState>,
}

impl PipelineUseCase {
    /// The standard five-stage pipeline
    pub fn new() -> Self {
        Self::with_stages(vec![
            (PipelineState::Ingesting,          Box::new(IngestUseCase) as Box<dyn Stage>),
            (PipelineState::Preprocessing,      Box::new(PreprocessUseCase) as Box<dyn Stage>),
            (PipelineState::FeatureEngineering, Box::new(FeaturesUseCase) as Box<dyn Stage>),
            (PipelineState::Training,           Box::new(TrainUseCase) as Box<dyn Stage>),
            (PipelineState::Evaluating,         Box::new(EvaluateUseCase) as Box<dyn Stage>),
        ])
    }

    pub fn with_stages(stages: Vec<(PipelineState, Box<dyn Stage>)>) -> Self {
        Self { stages, state: PipelineState::Idle, history: vec![PipelineState::Idle] }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state the run has passed through, starting with Idle
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Run every stage from Idle, stopping at the first failure.
    /// History from an earlier run is discarded.
    pub fn execute(&mut self, ctx: &StageContext<'_>) -> PipelineResult<()> {
        self.state   = PipelineState::Idle;
        self.history = vec![PipelineState::Idle];

        let stages = std::mem::take(&mut self.stages);
        let result = self.run_all(&stages, ctx);
        self.stages = stages;
        result
    }

    fn run_all(&mut self, stages: &[(PipelineState, Box<dyn Stage>)], ctx: &StageContext<'_>) -> PipelineResult<()> {
        for (state, stage) in stages {
            self.transition(*state);
            if let Err(e) = run_stage(stage.as_ref(), ctx) {
                self.transition(PipelineState::Failed);
                tracing::error!("Pipeline stopped at '{}': {}", stage.name(), e);
                return Err(e);
            }
        }
        self.transition(PipelineState::Done);
        tracing::info!("Pipeline finished");
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!("Pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
    }
}

impl Default for PipelineUseCase {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::error::PipelineError;
    use crate::infra::layout::ProjectLayout;
    use crate::infra::run_logger::RunLogger;

    struct Fake {
        name: &'static str,
        fail: bool,
        ran:  Rc<RefCell<Vec<&'static str>>>,
    }

    /// Fails on its first call only
    struct FlakyOnce {
        calls: RefCell<usize>,
    }

    impl Stage for FlakyOnce {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn execute(&self, _ctx: &StageContext<'_>) -> PipelineResult<()> {
            let mut calls = self.calls.borrow_mut();
            *calls += 1;
            if *calls == 1 {
                Err(PipelineError::Metric("first call".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl Stage for Fake {
        fn name(&self) -> &'static str {
            self.name
        }

        fn execute(&self, _ctx: &StageContext<'_>) -> PipelineResult<()> {
            self.ran.borrow_mut().push(self.name);
            if self.fail {
                Err(PipelineError::Metric("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn pipeline(fail_at: Option<&'static str>, ran: &Rc<RefCell<Vec<&'static str>>>) -> PipelineUseCase {
        let stage = |state, name| {
            let fake = Fake { name, fail: fail_at == Some(name), ran: Rc::clone(ran) };
            (state, Box::new(fake) as Box<dyn Stage>)
        };
        PipelineUseCase::with_stages(vec![
            stage(PipelineState::Ingesting, "a"),
            stage(PipelineState::Preprocessing, "b"),
            stage(PipelineState::Training, "c"),
        ])
    }

    #[test]
    fn test_runs_all_stages_in_order() {
        let layout = ProjectLayout::new("/nonexistent");
        let logger = RunLogger::disabled();
        let ctx = StageContext::new(&layout, &logger);
        let ran = Rc::new(RefCell::new(Vec::new()));

        let mut p = pipeline(None, &ran);
        p.execute(&ctx).unwrap();

        assert_eq!(*ran.borrow(), vec!["a", "b", "c"]);
        assert_eq!(p.state(), PipelineState::Done);
        assert_eq!(
            p.history(),
            &[
                PipelineState::Idle,
                PipelineState::Ingesting,
                PipelineState::Preprocessing,
                PipelineState::Training,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_stops_at_first_failure() {
        let layout = ProjectLayout::new("/nonexistent");
        let logger = RunLogger::disabled();
        let ctx = StageContext::new(&layout, &logger);
        let ran = Rc::new(RefCell::new(Vec::new()));

        let mut p = pipeline(Some("b"), &ran);
        assert!(p.execute(&ctx).is_err());

        assert_eq!(*ran.borrow(), vec!["a", "b"]);
        assert_eq!(p.state(), PipelineState::Failed);
        assert!(p.state().is_terminal());
        assert_eq!(p.history().last(), Some(&PipelineState::Failed));
    }

    #[test]
    fn test_rerun_after_failure_starts_from_idle() {
        let layout = ProjectLayout::new("/nonexistent");
        let logger = RunLogger::disabled();
        let ctx = StageContext::new(&layout, &logger);

        let flaky = FlakyOnce { calls: RefCell::new(0) };
        let mut p = PipelineUseCase::with_stages(vec![
            (PipelineState::Ingesting, Box::new(flaky) as Box<dyn Stage>),
        ]);

        assert!(p.execute(&ctx).is_err());
        assert_eq!(p.history(), &[PipelineState::Idle, PipelineState::Ingesting, PipelineState::Failed]);

        p.execute(&ctx).unwrap();
        assert_eq!(p.state(), PipelineState::Done);
        assert_eq!(p.history(), &[PipelineState::Idle, PipelineState::Ingesting, PipelineState::Done]);
    }
}
