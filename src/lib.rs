mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod memory;
    pub mod postgres;
    pub mod repository;
    pub mod schema;
}
mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
    pub mod permissions;
}
mod commands {
    pub mod wait_for_db;
}
mod constants;

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;

pub use authentication::*;
pub use commands::*;
pub use constants::*;
pub use database::*;
