pub mod app_settings;
pub mod maintenance;
pub mod settings;
