//! Command-line interface for the TIL server.

mod commands;

use clap::{Parser, Subcommand};

/// TIL - acronyms, their authors and categories
#[derive(Parser)]
#[command(name = "til")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    Serve,

    /// Write a default config.toml in the current directory
    #[command(alias = "--init")]
    Init,

    /// Create an account directly in the database
    CreateUser {
        name: String,

        username: String,

        email: String,

        #[arg(long)]
        password: String,

        /// Give the account the admin role
        #[arg(long)]
        admin: bool,
    },

    /// Validate the effective configuration and print it
    CheckConfig,
}

pub use commands::*;
