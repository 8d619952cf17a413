//! A driver for the HiveServer2 `TCLIService` Thrift protocol.

mod connection;
mod row_set;
mod rpc;
mod tcli;
#[cfg(test)]
mod testing;
mod transport;

pub use connection::{HiveConnection, HiveConnector};
