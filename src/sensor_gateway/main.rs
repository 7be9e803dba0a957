#[macro_use] extern crate lazy_static;

use common::{config::Config, logger::Logger, system::System};
use std::env;

lazy_static! {
    pub static ref CONFIG: Config = match env::var("CONFIG") {
        Ok(config_file_location) => Config::parse(&config_file_location),
        _ => Config::parse("./config/sensor_gateway.toml"),
    };
}

fn main() {
    let logger = Logger::build("sensor_gateway");
    let _guard = slog_scope::set_global_logger(logger);

    System::start("sensor_gateway", &CONFIG);
}
