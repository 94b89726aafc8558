use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use credgate_auth::{Argon2Comparator, AuthOutcome, Authenticator, VerificationCache};
use credgate_db_memory::InMemoryUserStorage;

use super::{CommandStatus, resolve_password};
use crate::cli::AuthenticateArgs;
use crate::config::AppConfig;
use crate::output::{print_cache_disabled, print_cache_stats, print_rejected, print_success};

pub async fn run(args: &AuthenticateArgs, config: &AppConfig) -> Result<CommandStatus> {
    let password = resolve_password(args.password.as_deref())?;
    let status = authenticate(args, &password, config).await?;
    Ok(status)
}

/// Line shown to the user for an outcome. Rejection reasons stay in the logs.
pub fn describe_outcome(outcome: &AuthOutcome) -> String {
    match outcome {
        AuthOutcome::Success(user) => {
            format!("{} {} ({})", outcome.public_message(), user.username, user.id)
        }
        AuthOutcome::Rejected(_) => outcome.public_message().to_string(),
    }
}

/// Loads the user file and runs `args.repeat` authentications, returning the
/// status of the last one.
///
/// Authentication errors surface only their public message; stage and cause
/// are logged by the authenticator.
pub async fn authenticate(
    args: &AuthenticateArgs,
    password: &str,
    config: &AppConfig,
) -> Result<CommandStatus> {
    let storage = InMemoryUserStorage::from_json_file(&args.users)
        .with_context(|| format!("failed to load users from {}", args.users.display()))?;

    let cache = VerificationCache::new(
        Arc::new(Argon2Comparator::new()),
        &config.auth.verification_cache,
    )
    .context("invalid verification cache configuration")?;
    let authenticator = Authenticator::new(Arc::new(storage), Arc::clone(&cache));

    let mut status = CommandStatus::Rejected;
    for attempt in 1..=args.repeat {
        let started = Instant::now();
        let outcome = authenticator
            .authenticate(&args.username, password)
            .await
            .map_err(|e| anyhow::Error::msg(e.public_message()))?;
        let elapsed = started.elapsed();

        let line = format!("[{attempt}] {} in {elapsed:.2?}", describe_outcome(&outcome));
        status = if outcome.is_success() {
            print_success(&line);
            CommandStatus::Success
        } else {
            print_rejected(&line);
            CommandStatus::Rejected
        };
    }

    if cache.is_enabled() {
        print_cache_stats(&cache.stats());
    } else {
        print_cache_disabled();
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credgate_auth::{RejectReason, User};

    #[test]
    fn test_rejections_hide_the_reason() {
        for reason in [RejectReason::UnknownCredentials, RejectReason::Inactive] {
            let line = describe_outcome(&AuthOutcome::Rejected(reason));
            assert_eq!(line, "authentication failed");
            assert!(!line.contains(reason.as_str()));
        }
    }

    #[test]
    fn test_success_names_the_user() {
        let user = User::builder("alice").id("u1").build();
        let line = describe_outcome(&AuthOutcome::Success(user));
        assert_eq!(line, "authenticated alice (u1)");
    }
}
