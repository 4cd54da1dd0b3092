pub mod art;
pub mod surface;

pub use surface::{CardSurface, TerminalSurface};
