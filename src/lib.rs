//! Turns delta-encoded pen-stroke sketches into fixed-size grayscale
//! rasters, with optional class-subset filtering and contiguous
//! relabeling. The member crates do the work; this crate re-exports their
//! public APIs under one roof.

// Re-export the shared data types.
pub use sketchraster_helpers::{ClassId, PenMove, Point, RawRecord, Stroke};

// Re-export the rendering pipeline.
pub use stroke_render::{
    FIT_MARGIN, INK, NormalizeError, STROKE_WIDTH, decode_drawing, normalize_strokes,
    rasterize_strokes, render_drawing,
};

// Re-export the dataset adapter and its collaborators.
pub use sketch_dataset::{
    ClassFilter, DatasetConfig, DatasetError, DatasetItem, LoadError, OpenError, RecordSource,
    RecordStore, SketchDataset, Vocabulary,
};
