pub mod api;
pub mod config;
pub mod contact;
pub mod db;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod geo;
pub mod ranking;
pub mod rate_limit;
pub mod server;
