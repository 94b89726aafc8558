use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "credgate")]
#[command(about = "credgate - password authentication with cached verification")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML). Missing files are ignored.
    #[arg(
        short,
        long,
        global = true,
        env = "CREDGATE_CONFIG",
        default_value = "credgate.toml"
    )]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash a password for storage
    Hash(HashArgs),
    /// Authenticate a user against a JSON user file
    Authenticate(AuthenticateArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
pub struct HashArgs {
    /// Password to hash (read from stdin when omitted)
    #[arg(long, env = "CREDGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Emit a complete user record for this username instead of the bare hash
    #[arg(short, long)]
    pub username: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AuthenticateArgs {
    /// JSON file containing an array of user records
    #[arg(long)]
    pub users: PathBuf,

    /// Username to authenticate
    #[arg(short, long)]
    pub username: String,

    /// Password (read from stdin when omitted)
    #[arg(long, env = "CREDGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Number of times to run the authentication
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
}
