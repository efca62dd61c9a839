mod distribution;
mod insights;

pub use distribution::{summarize, FactorContribution, MatchDistribution, TOP_FACTOR_LIMIT};
pub use insights::{MatchInsights, PoolHealth};

pub(crate) use insights::generate_insights;

impl MatchDistribution {
    pub fn insights(&self) -> MatchInsights {
        generate_insights(self)
    }
}
