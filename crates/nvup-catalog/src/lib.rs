#![doc = include_str!("../README.md")]

mod client;
mod config;
mod http;
mod models;

pub use client::DefaultCatalogClient;
pub use config::CatalogClientConfig;
