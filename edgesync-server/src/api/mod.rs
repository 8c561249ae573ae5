//! API Routes
//!
//! The three endpoints every node exposes to its counterpart.

mod receive;
mod send;
mod token;


pub use receive::receive_data;
pub use send::send_data;
pub use token::get_token;

pub const INVALID_TABLE: &str = "Invalid table.";
pub const INVALID_DATA_FORMAT: &str = "Invalid data format. 'data' should be a list.";
pub const NO_DATA: &str = "No data received.";
pub const INVALID_RECORD: &str = "Invalid record format.";
pub const INSERT_FAILED: &str = "Failed to insert data.";
pub const SERVER_ERROR: &str = "Server error.";
pub const NO_DATA_FOUND: &str = "No data found.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";
