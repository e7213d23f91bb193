//! Interactive lava lamp: a procedural metaball field animated per frame
//! and ray-marched on the GPU.

pub mod app;
pub mod camera;
pub mod config;
pub mod gpu;
pub mod simulation;
