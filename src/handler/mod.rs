//! Request handler module
//!
//! Method dispatch in `router`, body parsing in `params`, and the two editor
//! operations in `editor`.

pub mod editor;
pub mod params;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
