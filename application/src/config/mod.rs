//! Application-level configuration.
//!
//! - [`SessionParams`] - collaboration loop control (transition cap, context
//!   windows, tool rounds, retries)

pub mod session_params;

pub use session_params::SessionParams;
