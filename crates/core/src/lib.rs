#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod model;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use generator::{ExamGenerator, TRAILING_WINDOW};
pub use time::Clock;
