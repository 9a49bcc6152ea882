pub mod albums;
pub mod api;
pub mod bootstrap;
pub mod comments;
pub mod config;
pub mod database;
pub mod error;
pub mod likes;
pub mod mentions;
pub mod notifications;
pub mod realtime;
pub mod showcases;
pub mod telemetry;
pub mod users;
pub mod utils;
