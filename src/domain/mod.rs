//! Domain types shared across the feed pipeline.

pub mod bar;
pub mod frequency;

pub use bar::{Bar, BarSet};
pub use frequency::Frequency;
