//! Internal testing utilities for the voxcheck validation suite.
//!
//! Provides artifact fixtures (volumes, stats tables, measures) and
//! self-contained validation environments for integration tests.

pub mod fixtures;
pub mod world;

pub use fixtures::{
    intensity_volume, measure, segmentation_volume, volume_row, write_image, write_log,
    write_stats,
};
pub use world::{store_at, ValidationWorld};
