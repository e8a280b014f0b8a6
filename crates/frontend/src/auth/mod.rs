//! Operator session

pub mod context;
pub mod error_handler;

pub use context::{SessionAction, SessionContext, SessionContextData, SessionProvider, use_session};
pub use error_handler::trigger_session_error;
