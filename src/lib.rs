pub mod api_docs;
pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod extractor;
pub mod middleware;
pub mod policy;
pub mod redis_service;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod storage;
pub mod utils;
