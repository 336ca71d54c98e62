//! Route handlers organized by resource

pub mod annotation;
pub mod auth;
pub mod db;
pub mod evaluation;
pub mod health;
pub mod import;
pub mod reports;
pub mod session;
pub mod users;
