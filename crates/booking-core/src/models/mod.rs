//! Domain models for the booking core.

mod appointment;
mod directory;

pub use appointment::*;
pub use directory::*;
