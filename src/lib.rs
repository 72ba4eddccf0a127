// Library exports for svclogs

pub mod cli;
pub mod config;
pub mod error;
pub mod logs;
