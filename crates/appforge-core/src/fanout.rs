//! Multi-model fan-out.
//!
//! Invokes every candidate in a fixed roster against the completion
//! gateway and collects per-candidate outcomes. All calls are joined
//! before any result is inspected; nothing short-circuits on first
//! response. Selection (first success in roster order) is the caller's
//! job, and ties break on roster order alone.

use futures_util::future::join_all;
use tracing::debug;

use appforge_types::llm::{CompletionRequest, Message, ModelCandidate, ModelOutcome};

use crate::gateway::BoxCompletionGateway;

/// Fan-out over a fixed roster of model candidates.
pub struct FanOut {
    roster: Vec<ModelCandidate>,
}

impl FanOut {
    pub fn new(roster: Vec<ModelCandidate>) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &[ModelCandidate] {
        &self.roster
    }

    /// Build the invocation order for this request.
    ///
    /// The roster is fixed; the primary model is moved to the front when
    /// it is a roster member, or prepended as an extra candidate when it
    /// is not. No other reordering.
    fn invocation_order(&self, primary_model_id: Option<&str>) -> Vec<ModelCandidate> {
        let mut order = self.roster.clone();
        if let Some(primary) = primary_model_id {
            if let Some(pos) = order.iter().position(|c| c.id == primary) {
                let candidate = order.remove(pos);
                order.insert(0, candidate);
            } else {
                order.insert(0, ModelCandidate::new(primary, primary));
            }
        }
        order
    }

    /// Invoke every candidate and return outcomes in invocation order.
    ///
    /// Candidates run concurrently with no concurrency cap, no
    /// per-candidate timeout beyond what the gateway imposes, and no
    /// deduplication of identical failures.
    pub async fn run(
        &self,
        gateway: &BoxCompletionGateway,
        history: &[Message],
        primary_model_id: Option<&str>,
        max_tokens: u32,
    ) -> Vec<ModelOutcome> {
        let candidates = self.invocation_order(primary_model_id);

        let calls = candidates.into_iter().map(|candidate| async move {
            let request = CompletionRequest {
                model: candidate.id.clone(),
                messages: history.to_vec(),
                max_tokens,
                temperature: None,
                stream: false,
            };
            match gateway.complete(&request).await {
                Ok(response) => {
                    debug!(model = %candidate.id, "fan-out candidate succeeded");
                    ModelOutcome::succeeded(candidate, response.content)
                }
                Err(e) => {
                    debug!(model = %candidate.id, error = %e, "fan-out candidate failed");
                    ModelOutcome::failed(candidate, e.to_string())
                }
            }
        });

        // join_all preserves input order, which is what ties break on.
        join_all(calls).await
    }
}

/// Select the first successful outcome in invocation order.
pub fn first_success(outcomes: &[ModelOutcome]) -> Option<&ModelOutcome> {
    outcomes.iter().find(|o| o.is_success())
}

/// Non-winning successful outcomes, preserving invocation order.
pub fn alternatives<'a>(
    outcomes: &'a [ModelOutcome],
    winner: &ModelOutcome,
) -> Vec<&'a ModelOutcome> {
    outcomes
        .iter()
        .filter(|o| o.is_success() && o.candidate.id != winner.candidate.id)
        .collect()
}
