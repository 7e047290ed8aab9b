//! The phenoclim analysis pipeline: normalization, completeness filtering, growing-season
//! and degree-day indices, descriptive statistics and the seed-set paired comparison.

pub mod completeness;
pub mod degree_days;
pub mod error;
pub mod growing_season;
pub mod july;
pub mod normalize;
pub mod report;
pub mod seedset;
pub mod series;
pub mod statistics;

pub use error::PhenoclimError;
pub use series::{YearlySeries, YearlyTable};
