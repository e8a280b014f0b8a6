mod cards;
mod data_table;
mod header;
mod require_session;
mod shuttle;
mod spinner;
pub mod toast;

pub use cards::SummaryCards;
pub use data_table::DataTable;
pub use header::Header;
pub use require_session::RequireSession;
pub use shuttle::ShuttleMap;
pub use spinner::Spinner;
pub use toast::ToastProvider;
