//! Executes statements against a Hive warehouse and returns rows as key-value maps.

mod client;
pub mod error;
pub mod materialize;

pub use client::HiveClient;
pub use error::{ClientError, ClientResult};
pub use hivelink_driver::api::Value;
pub use hivelink_sql::spec::{PartitionSpec, TableSpec};
pub use materialize::{materialize, Row};
