//! Marker animation timing

pub mod fade;

pub use fade::{
    fade_appearance, FadeCompletions, FadeHandle, FadeScheduler, ManualFadeScheduler,
    TokioFadeScheduler,
};
