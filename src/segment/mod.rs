pub mod classify;
pub mod segmenter;
