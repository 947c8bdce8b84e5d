//! Utility helpers including math extensions, allocators, logging, and profiling.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;
pub mod spatial;

pub use spatial::SpatialVec2;

pub use allocator::{Arena, AtomId, BodyId, EntityId};
pub use math::*;
pub use profiling::{FrameProfile, StageTimer};
