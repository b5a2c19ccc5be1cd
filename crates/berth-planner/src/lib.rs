#![forbid(unsafe_code)]
//! berth-planner: computes the destination set for one artifact.
//!
//! Planning is pure: identical inputs yield identical output, so the engine
//! may ask for an artifact's location before and after other registrations.
//! Descriptor validation happens here, before any destination is emitted; a
//! failed plan produces no partial output.

pub mod file;
pub mod image;

pub use file::{plan_file_destinations, FilePlan, FilePlanConfig};
pub use image::{plan_image_destinations, ImagePlan, ImagePlanConfig};
