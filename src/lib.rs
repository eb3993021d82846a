pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod id;
pub mod products;
pub mod repository;
pub mod state;
pub mod users;
