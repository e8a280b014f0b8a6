//! Custom hooks for the application

pub mod use_clock;
pub mod use_polling;
pub mod use_session_monitor;

pub use use_clock::use_clock;
pub use use_polling::use_polling;
pub use use_session_monitor::use_session_monitor;
