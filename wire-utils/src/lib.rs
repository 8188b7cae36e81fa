pub mod error;
pub mod latin1;
pub mod logging;

pub use error::{Result, WireError};
