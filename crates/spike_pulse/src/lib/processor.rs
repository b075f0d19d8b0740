pub mod builder;

use crate::{
    correlation::CorrelationId,
    error::Error,
    fallback::FallbackSynthesizer,
    guard::ConstraintGuard,
    llm::anthropic::preview,
    parser::ModelReply,
    policy::InsightPolicy,
    types::{Insight, InsightResult, InsightSource, TelemetrySnapshot},
    InsightModel, LlmError, PromptBuilder,
};

/// Turns one telemetry snapshot into one coaching insight.
///
/// The model path is `prompt -> complete -> parse -> guard`. Any failure on
/// that path is answered by the [`FallbackSynthesizer`], so the only error
/// this type ever returns is [`Error::Configuration`].
#[derive(Debug)]
pub struct InsightService<M>
where
    M: InsightModel + Send + Sync + 'static,
{
    model: M,
    policy: InsightPolicy,
    prompts: PromptBuilder,
    guard: ConstraintGuard,
    fallback: FallbackSynthesizer,
}

impl<M> InsightService<M>
where
    M: InsightModel + Send + Sync + 'static,
{
    const RAW_PREVIEW_CHARS: usize = 100;

    pub fn new(model: M, policy: InsightPolicy) -> Self {
        InsightService {
            model,
            prompts: PromptBuilder::new(policy.clone()),
            guard: ConstraintGuard::new(policy.clone()),
            fallback: FallbackSynthesizer::new(policy.thresholds),
            policy,
        }
    }

    pub fn policy(&self) -> &InsightPolicy {
        &self.policy
    }

    /// # Returns
    /// * `Ok(InsightResult)` from the model or from the fallback.
    /// * `Err(Error::Configuration)` when the model credential is absent and
    ///   the policy does not allow degrading.
    #[tracing::instrument(
        skip_all,
        fields(correlation_id = tracing::field::Empty, viewer_delta = snapshot.viewer_delta)
    )]
    pub async fn generate(&self, snapshot: TelemetrySnapshot) -> Result<InsightResult, Error> {
        let correlation_id = CorrelationId::next();
        tracing::Span::current().record("correlation_id", correlation_id.as_str());

        let snapshot = snapshot.normalize();
        if !snapshot.viewer_delta_is_consistent() {
            tracing::debug!(
                viewer_count = snapshot.viewer_count,
                prev_count = snapshot.prev_count,
                "viewerDelta does not match viewerCount - prevCount"
            );
        }

        if !self.policy.degrade_without_credentials && !self.model.is_configured() {
            tracing::error!(model = M::MODEL, "Model credential is not configured");
            return Err(Error::Configuration("Model API key is not configured"));
        }

        match self.generate_with_model(&snapshot).await {
            Ok(insight) => {
                tracing::info!(
                    emotional_label = %insight.emotional_label,
                    next_move = %insight.next_move,
                    "Insight generated by model"
                );
                Ok(InsightResult::new(
                    insight,
                    InsightSource::Llm,
                    correlation_id,
                ))
            }
            Err(Error::Provider(LlmError::MissingCredential))
                if !self.policy.degrade_without_credentials =>
            {
                tracing::error!(model = M::MODEL, "Model credential is not configured");
                Err(Error::Configuration("Model API key is not configured"))
            }
            Err(e) => {
                let rate_limited = e.is_rate_limited();
                tracing::warn!(error = %e, rate_limited, "Model path failed, using fallback");
                Ok(self.fallback.result(
                    snapshot.topic.as_deref(),
                    snapshot.viewer_delta,
                    rate_limited,
                    correlation_id,
                ))
            }
        }
    }

    async fn generate_with_model(&self, snapshot: &TelemetrySnapshot) -> Result<Insight, Error> {
        let prompt = self.prompts.build(snapshot);

        let raw = self
            .model
            .complete(&prompt)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, model = M::MODEL, "Model call failed"))?;

        let reply = ModelReply::from(raw);
        let insight = reply.to_insight().inspect_err(|e| {
            tracing::warn!(
                error = %e,
                raw_preview = %preview(&reply, Self::RAW_PREVIEW_CHARS),
                "Could not extract insight from model reply"
            )
        })?;

        Ok(self.guard.enforce(insight, snapshot))
    }
}
