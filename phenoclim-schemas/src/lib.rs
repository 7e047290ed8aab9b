//! Plain data types shared by the phenoclim pipeline and application.

pub mod climate;
pub mod file_formats;
pub mod record;
pub mod seedset;
pub mod statistics;
pub mod thresholds;
