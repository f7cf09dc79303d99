//! Turning what the user said into what the assistant should do.

mod classification;
mod model;

pub use classification::classify;
pub use model::Intent;
