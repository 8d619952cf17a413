mod application;
mod connection;
mod loader;

/// The default HiveServer2 Thrift port.
pub const HIVE_SERVER2_PORT_DEFAULT: u16 = 10000;

pub use application::*;
pub use connection::*;
pub use loader::*;
