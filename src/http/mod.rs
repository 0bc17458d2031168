//! HTTP protocol layer module
//!
//! Response builders and query-string handling, decoupled from the editor logic.

pub mod query;
pub mod response;

// Re-export commonly used items
pub use response::{
    build_405_response, build_413_response, build_html_response, build_saved_response,
    build_text_response,
};
