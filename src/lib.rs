pub mod client;
pub mod db;
pub mod error;
pub mod models;
pub mod scope;
pub mod services;
pub mod state;
