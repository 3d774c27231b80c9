pub mod commands;
pub mod formatting;
pub mod forms;
pub mod help;
pub mod io;
pub mod output;

pub use commands::{run_cli, run_with_args};
