pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod git;
pub mod host;

mod api;

pub use api::{Gitsteps, GitstepsBuilder};
