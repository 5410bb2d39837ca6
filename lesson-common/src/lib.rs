//! # Lesson Common Library
//!
//! Shared code for the lesson player workspace:
//! - Event types (`LessonEvent`) and the broadcast `EventBus`
//! - Configuration loading (TOML, environment, compiled defaults)
//! - Opacity/fade easing curves
//! - Time utilities

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod time;

pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
