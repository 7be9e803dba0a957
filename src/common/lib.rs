#[macro_use] extern crate lazy_static;
#[macro_use] extern crate prometheus;
#[macro_use] extern crate serde_derive;
#[macro_use] extern crate slog;
#[macro_use] extern crate slog_scope;

pub mod config;
pub mod kafka;
pub mod logger;
pub mod metrics;
pub mod sensor;
pub mod server;
pub mod system;
