//! Extractors whose rejections use the JSON error envelope.

mod json;

pub use json::{AppJson, AppPath, AppQuery};
