//! External process plumbing.

mod cli;

pub use cli::MoltCli;
