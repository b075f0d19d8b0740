use crate::{policy::InsightPolicy, InsightModel, InsightService};

pub struct InsightServiceBuilder<M = ()> {
    model: M,
    policy: InsightPolicy,
}

impl InsightServiceBuilder {
    pub fn new() -> Self {
        Self {
            model: (),
            policy: InsightPolicy::default(),
        }
    }
}

impl Default for InsightServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> InsightServiceBuilder<M> {
    pub fn model<M2: InsightModel + Send + Sync + 'static>(
        self,
        model: M2,
    ) -> InsightServiceBuilder<M2> {
        InsightServiceBuilder {
            model,
            policy: self.policy,
        }
    }

    pub fn policy(mut self, policy: InsightPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Answer from the fallback instead of failing when no credential is set.
    pub fn degrade_without_credentials(mut self, degrade: bool) -> Self {
        self.policy.degrade_without_credentials = degrade;
        self
    }
}

impl<M> InsightServiceBuilder<M>
where
    M: InsightModel + Send + Sync + 'static,
{
    pub fn build(self) -> InsightService<M> {
        InsightService::new(self.model, self.policy)
    }
}
