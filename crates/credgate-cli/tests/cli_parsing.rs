use clap::Parser;
use credgate_cli::cli::{Cli, Commands};
use credgate_cli::commands::{CommandStatus, ERROR_EXIT_CODE};

#[test]
fn test_authenticate_args() {
    let cli = Cli::try_parse_from([
        "credgate",
        "--config",
        "custom.toml",
        "authenticate",
        "--users",
        "users.json",
        "-u",
        "alice",
        "--password",
        "pw",
        "--repeat",
        "3",
    ])
    .unwrap();

    assert_eq!(cli.config, "custom.toml");
    let Commands::Authenticate(args) = cli.command else {
        panic!("expected authenticate command");
    };
    assert_eq!(args.users.to_str(), Some("users.json"));
    assert_eq!(args.username, "alice");
    assert_eq!(args.password.as_deref(), Some("pw"));
    assert_eq!(args.repeat, 3);
}

#[test]
fn test_repeat_defaults_to_one_and_rejects_zero() {
    let cli = Cli::try_parse_from([
        "credgate",
        "authenticate",
        "--users",
        "u.json",
        "--username",
        "bob",
    ])
    .unwrap();
    let Commands::Authenticate(args) = cli.command else {
        panic!("expected authenticate command");
    };
    assert_eq!(args.repeat, 1);

    let result = Cli::try_parse_from([
        "credgate",
        "authenticate",
        "--users",
        "u.json",
        "--username",
        "bob",
        "--repeat",
        "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_authenticate_requires_username() {
    let result = Cli::try_parse_from(["credgate", "authenticate", "--users", "u.json"]);
    assert!(result.is_err());
}

#[test]
fn test_hash_and_config_commands() {
    let cli = Cli::try_parse_from(["credgate", "hash", "--username", "carol"]).unwrap();
    let Commands::Hash(args) = cli.command else {
        panic!("expected hash command");
    };
    assert_eq!(args.username.as_deref(), Some("carol"));

    let cli = Cli::try_parse_from(["credgate", "config", "-c", "other.toml"]).unwrap();
    assert!(matches!(cli.command, Commands::Config));
    assert_eq!(cli.config, "other.toml");
}

#[test]
fn test_exit_codes() {
    assert_eq!(CommandStatus::Success.exit_code(), 0);
    assert_eq!(CommandStatus::Rejected.exit_code(), 1);
    assert_eq!(ERROR_EXIT_CODE, 2);
}
