// Library exports for FoodShare
// This allows integration tests and external code to use FoodShare modules

pub mod auth;
pub mod chatbot;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod graphql;
pub mod media;
pub mod notify;
pub mod routes;
pub mod state;
