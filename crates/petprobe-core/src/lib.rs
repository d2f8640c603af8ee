pub mod config;
pub mod logging;

pub mod client;
pub mod pet;
pub mod report;
pub mod retry;
pub mod scenario;
pub mod stability;
pub mod verify;
