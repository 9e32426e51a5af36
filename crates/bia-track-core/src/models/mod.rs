//! Domain models for the BIA Track system.

mod condition;
mod measurement;
mod profile;
mod reading;

pub use condition::*;
pub use measurement::*;
pub use profile::*;
pub use reading::*;
