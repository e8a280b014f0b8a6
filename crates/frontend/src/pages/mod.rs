mod camera;
mod home;
mod login;
mod logs;
mod reports;
mod slots;

pub use camera::CameraPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use logs::LogsPage;
pub use reports::ReportsPage;
pub use slots::SlotsPage;
