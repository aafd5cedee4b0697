pub mod error;

pub use error::{PulseError, PulseResult};
