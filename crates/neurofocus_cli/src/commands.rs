pub mod advise;
pub mod config;
