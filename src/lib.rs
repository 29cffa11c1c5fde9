pub mod api;
pub mod config;
pub mod db;
pub mod demo;
pub mod gateway;
pub mod policy;
pub mod view;

pub use self::config::Config;
