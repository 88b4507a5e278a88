pub mod config;
pub mod logging;

pub mod catalog;
pub mod error;
pub mod naming;
pub mod retry;
pub mod scheduler;
pub mod source;
