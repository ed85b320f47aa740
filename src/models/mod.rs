pub mod appointment;
pub mod enums;
pub mod lead;
pub mod timestamp;

pub use appointment::*;
pub use enums::*;
pub use lead::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}
