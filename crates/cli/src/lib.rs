pub mod cli;
pub mod collaborators;
pub mod commands;
pub mod context;
pub mod error;
pub mod logging;
pub mod output;
