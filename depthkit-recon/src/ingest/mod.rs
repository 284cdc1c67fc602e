//! Data ingestion module
//!
//! Provides the still-image input of the reconstruction flow: one color image
//! with its depth/disparity map and calibration, loaded once per user action.

pub mod rgbd;

pub use rgbd::RgbdStill;
