// Refinement Loop
// Repeats detect -> conditional rewrite until the target score is met or
// the iteration budget runs out. Termination is structural: max_iterations
// is a hard upper bound even when rewrites never improve the score.

use crate::models::{RefinementResult, RefinementStatus, RefinementStep, Segment};
use crate::services::detector::{DetectError, Detector, LOCAL_PROVIDER};
use crate::services::rewriter::{RewriteError, Rewriter};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Per-segment score above which a segment is eligible for rewriting.
pub const REWRITE_THRESHOLD: f64 = 0.5;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_LOOP_BUDGET: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum RefineError {
    #[error("max_iterations must be at least 1")]
    InvalidIterationBudget,
    #[error("target_score must be within [0, 1]")]
    InvalidTargetScore,
    #[error("detection failed: {0}")]
    Detection(#[from] DetectError),
    #[error("rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),
    #[error("{0} call timed out")]
    CallTimeout(&'static str),
    #[error("refinement exceeded its wall-clock budget of {0:?}")]
    BudgetExceeded(Duration),
}

pub struct Refiner {
    detector: Arc<Detector>,
    rewriter: Rewriter,
    call_timeout: Duration,
    loop_budget: Duration,
}

impl Refiner {
    pub fn new(detector: Arc<Detector>, rewriter: Rewriter) -> Self {
        Self {
            detector,
            rewriter,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            loop_budget: DEFAULT_LOOP_BUDGET,
        }
    }

    pub fn with_budgets(mut self, call_timeout: Duration, loop_budget: Duration) -> Self {
        self.call_timeout = call_timeout;
        self.loop_budget = loop_budget;
        self
    }

    /// Run the refinement loop. On timeout the whole request fails; no
    /// partial history is returned.
    pub async fn refine(
        &self,
        text: &str,
        target_score: f64,
        max_iterations: u32,
    ) -> Result<RefinementResult, RefineError> {
        if max_iterations == 0 {
            return Err(RefineError::InvalidIterationBudget);
        }
        if !(0.0..=1.0).contains(&target_score) {
            return Err(RefineError::InvalidTargetScore);
        }

        match tokio::time::timeout(self.loop_budget, self.run(text, target_score, max_iterations))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(RefineError::BudgetExceeded(self.loop_budget)),
        }
    }

    async fn run(
        &self,
        text: &str,
        target_score: f64,
        max_iterations: u32,
    ) -> Result<RefinementResult, RefineError> {
        let mut current_text = text.to_string();
        let mut history: Vec<RefinementStep> = Vec::new();
        let mut final_score = 1.0;
        let mut status = RefinementStatus::Exhausted;

        for iteration in 1..=max_iterations {
            let detection =
                tokio::time::timeout(self.call_timeout, self.detector.detect(&current_text, LOCAL_PROVIDER))
                    .await
                    .map_err(|_| RefineError::CallTimeout("detector"))??;
            final_score = detection.overall_score;

            history.push(RefinementStep {
                iteration,
                text: current_text.clone(),
                score: final_score,
                segments: detection.segments.clone(),
            });

            if final_score <= target_score {
                status = RefinementStatus::Converged;
                break;
            }

            let flagged: Vec<Segment> = detection
                .segments
                .into_iter()
                .filter(|s| s.score > REWRITE_THRESHOLD)
                .collect();
            if flagged.is_empty() {
                debug!(iteration, final_score, "no segment above rewrite threshold");
                status = RefinementStatus::Stalled;
                break;
            }

            current_text =
                tokio::time::timeout(self.call_timeout, self.rewriter.rewrite(&current_text, &flagged))
                    .await
                    .map_err(|_| RefineError::CallTimeout("rewriter"))??;
        }

        let iterations_used = history.len() as u32;
        info!(iterations_used, final_score, ?status, "refinement finished");

        Ok(RefinementResult {
            original_text: text.to_string(),
            refined_text: current_text,
            final_score,
            iterations_used,
            status,
            history,
        })
    }
}
