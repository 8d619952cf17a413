//! Statement text for partitioned Hive tables.
//!
//! The builders in [`builder`] splice names and values into statements verbatim.
//! Callers either trust their input or run it through [`validate`] first.
//! Query parameters are bound client-side by [`bind`], which does escape values.

pub mod bind;
pub mod builder;
pub mod error;
pub mod spec;
pub mod validate;
