//! View components for the application.

mod alert;
mod home;
mod loading;
mod login;
mod settings;

pub use alert::{modal, view_alert};
pub use home::view_home;
pub use loading::view_loading;
pub use login::view_login;
pub use settings::view_settings;
