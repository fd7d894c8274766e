//! Domain module for the Uniqueness Checker
//!
//! Contains core entities, value objects, errors, and the pure checks
//! (structural validation and time window).

pub mod entities;
pub mod errors;
pub mod time_window;
pub mod validation;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use time_window::check_time_window;
pub use validation::validate_request;
pub use value_objects::*;
