// Include submodules
mod geometry;
mod record;

// Re-export types from submodules
pub use geometry::{Point, Stroke};
pub use record::{ClassId, PenMove, RawRecord};
