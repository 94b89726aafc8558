pub mod authenticate;
pub mod config;
pub mod hash;

use anyhow::{Context, Result};

/// How a command finished, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Rejected,
}

impl CommandStatus {
    /// `0` on success, `1` on rejection. Errors exit with `2`.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Rejected => 1,
        }
    }
}

/// Exit code for a command that failed with an error.
pub const ERROR_EXIT_CODE: i32 = 2;

/// Returns `provided`, or reads one line from stdin.
fn resolve_password(provided: Option<&str>) -> Result<String> {
    if let Some(password) = provided {
        return Ok(password.to_string());
    }

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        anyhow::bail!("Password is required (--password, CREDGATE_PASSWORD or stdin)");
    }
    Ok(password.to_string())
}
