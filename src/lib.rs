pub mod backend;
pub mod call;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod realtime;
pub mod services;
pub mod web;
