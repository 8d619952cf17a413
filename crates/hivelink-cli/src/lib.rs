mod args;
mod output;
pub mod runner;
