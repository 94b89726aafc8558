use anyhow::{Context, Result};
use credgate_auth::{User, hash_password};

use super::resolve_password;
use crate::cli::HashArgs;

/// Hashes the password and prints either the PHC string or a user record
/// ready to paste into a user file.
pub fn run(args: &HashArgs) -> Result<()> {
    let password = resolve_password(args.password.as_deref())?;
    let hashed = hash_password(&password).context("failed to hash password")?;

    match &args.username {
        Some(username) => {
            let user = User::builder(username.as_str()).password(hashed).build();
            let json = serde_json::to_string_pretty(&user).context("failed to encode user")?;
            println!("{json}");
        }
        None => println!("{}", hashed.hash),
    }

    Ok(())
}
