pub mod adapters;
pub mod auth;
pub mod config;
pub mod cors;
pub mod favorites;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod store;
pub mod upstream;
