pub mod auth;
pub mod dashboard;
pub mod device;
pub mod record;
pub mod settings;
pub mod shared;
pub mod user;
