pub mod auth;
pub mod dashboard;
pub mod devices;
pub mod files;
pub mod links;
pub mod settings;
