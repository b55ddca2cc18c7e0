//! Data models for the shell.

mod login_form;

pub use login_form::LoginForm;
