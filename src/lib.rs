// Library exports for the lovenote card components

pub mod app;
pub mod config;
pub mod controller;
pub mod letters;
pub mod meta_tags;
pub mod particles;
pub mod share;
pub mod store;
pub mod timers;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use app::{AppEvent, CardApp};
pub use controller::{Command, Effect, EnvelopeController, EnvelopeState, TimerKind};
pub use letters::{LetterContent, Provenance};
pub use store::{LetterStore, MemoryStore, SupabaseStore};
