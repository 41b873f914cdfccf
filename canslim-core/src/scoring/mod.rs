//! The CAN SLIM scorer — criterion codes, thresholds, and the pure scoring
//! function.

pub mod criteria;
pub mod scorer;
pub mod thresholds;

pub use criteria::{Criterion, CriterionSet};
pub use scorer::score_snapshot;
pub use thresholds::ScoringThresholds;
