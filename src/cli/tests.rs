//! Unit tests for CLI commands

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{run_in, Cli, Commands, GenerateCommand, NewCommand};
use crate::generator::Generator;
use clap::Parser;

#[test]
fn test_new_service_parses() {
    let cli = Cli::try_parse_from(["kit", "new", "service", "users"]).unwrap();
    match cli.command {
        Commands::New {
            what: NewCommand::Service { name },
        } => assert_eq!(name, "users"),
        other => panic!("Expected new service, got {other:?}"),
    }
}

#[test]
fn test_generate_service_flags() {
    let cli = Cli::try_parse_from([
        "kit", "g", "s", "users", "-t", "grpc", "-m", "Create", "-m", "Get,List", "--dmw",
        "--gorilla",
    ])
    .unwrap();
    match cli.command.into_generator() {
        Generator::Service(g) => {
            assert_eq!(g.name, "users");
            assert_eq!(g.transport, "grpc");
            assert_eq!(g.methods, vec!["Create", "Get", "List"]);
            assert!(g.service_middleware);
            assert!(g.endpoint_middleware);
            assert!(g.gorilla);
        }
        other => panic!("Expected service generator, got {other:?}"),
    }
}

#[test]
fn test_separate_middleware_flags() {
    let cli = Cli::try_parse_from(["kit", "generate", "service", "users", "--endpoint-mdw"])
        .unwrap();
    match cli.command.into_generator() {
        Generator::Service(g) => {
            assert_eq!(g.transport, "http");
            assert!(!g.service_middleware);
            assert!(g.endpoint_middleware);
        }
        other => panic!("Expected service generator, got {other:?}"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "kit",
        "generate",
        "docker",
        "--glide",
        "-f",
        "-d",
        "-b",
        "app",
        "--mod_module",
        "example.com/acme",
    ])
    .unwrap();
    assert!(cli.force);
    assert!(cli.debug);
    assert_eq!(cli.folder.as_deref(), Some("app"));
    assert_eq!(cli.module.as_deref(), Some("example.com/acme"));
    assert!(matches!(
        cli.command,
        Commands::Generate {
            what: GenerateCommand::Docker { glide: true }
        }
    ));
}

#[test]
fn test_model_and_middleware_require_service() {
    assert!(Cli::try_parse_from(["kit", "generate", "model", "account"]).is_err());
    assert!(Cli::try_parse_from(["kit", "generate", "middleware", "auth"]).is_err());

    let cli = Cli::try_parse_from(["kit", "generate", "model", "account", "-s", "users"]).unwrap();
    match cli.command.into_generator() {
        Generator::Model(g) => {
            assert_eq!(g.name, "users");
            assert_eq!(g.model, "account");
        }
        other => panic!("Expected model generator, got {other:?}"),
    }
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["kit", "new", "service", "users"],
        vec!["kit", "generate", "service", "users"],
        vec!["kit", "generate", "transport", "users", "-t", "grpc"],
        vec!["kit", "generate", "middleware", "auth", "-s", "users", "-e"],
        vec!["kit", "generate", "client", "users", "-t", "http"],
        vec!["kit", "generate", "model", "account", "-s", "users"],
        vec!["kit", "generate", "db", "users"],
        vec!["kit", "generate", "docker"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_run_in_writes_under_folder() {
    let dir = tempfile::tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "kit",
        "new",
        "service",
        "users",
        "-b",
        "app",
        "--mod_module",
        "example.com/acme",
    ])
    .unwrap();
    run_in(cli, dir.path()).unwrap();

    let svc = std::fs::read_to_string(dir.path().join("app/users/pkg/service/service.go")).unwrap();
    assert!(svc.contains("type UsersService interface {"));
}

#[test]
fn test_run_in_logs_generation_failures() {
    let dir = tempfile::tempdir().unwrap();
    let cli = Cli::try_parse_from(["kit", "generate", "service", "missing"]).unwrap();
    assert!(run_in(cli, dir.path()).is_ok());
    assert!(!dir.path().join("missing").exists());
}
