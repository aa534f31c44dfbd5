#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use walkdir::WalkDir;

fn kit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kit"))
        .current_dir(dir)
        .env("KIT_LOG_LEVEL", "info")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run kit")
}

fn snapshot(dir: &Path) -> BTreeMap<PathBuf, String> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, fs::read_to_string(e.path()).unwrap())
        })
        .collect()
}

const INTERFACE: &str = "// UsersService describes the service.
type UsersService interface {
\tCreate(ctx context.Context, name string) (id int, err error)
\tGet(ctx context.Context, id int) (name string, err error)
}
";

fn new_service(dir: &Path) {
    let out = kit(dir, &["--mod_module", "example.com/acme", "new", "service", "users"]);
    assert!(out.status.success());
    let path = dir.join("users/pkg/service/service.go");
    fs::write(
        &path,
        format!("package service\n\nimport \"context\"\n\n{INTERFACE}"),
    )
    .unwrap();
}

#[test]
fn test_cli_generate_service_creates_layout() {
    let dir = tempfile::tempdir().unwrap();
    new_service(dir.path());

    let out = kit(
        dir.path(),
        &["--mod_module", "example.com/acme", "generate", "service", "users", "--dmw"],
    );
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("✅ Generated"));

    for file in [
        "users/pkg/service/service.go",
        "users/pkg/service/middleware.go",
        "users/pkg/endpoint/endpoint.go",
        "users/pkg/endpoint/endpoint_gen.go",
        "users/pkg/endpoint/middleware.go",
        "users/pkg/http/handler.go",
        "users/pkg/http/handler_gen.go",
        "users/cmd/service/main.go",
    ] {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }
    let endpoint = fs::read_to_string(dir.path().join("users/pkg/endpoint/endpoint.go")).unwrap();
    assert!(endpoint.contains("\"example.com/acme/users/pkg/service\""));
}

#[test]
fn test_cli_second_run_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    new_service(dir.path());
    let args = ["--mod_module", "example.com/acme", "generate", "service", "users", "--dmw"];

    assert!(kit(dir.path(), &args).status.success());
    let first = snapshot(dir.path());
    let out = kit(dir.path(), &args);
    assert!(out.status.success());
    assert_eq!(first, snapshot(dir.path()));
    assert!(!String::from_utf8_lossy(&out.stdout).contains("Skipping"));
}

#[test]
fn test_cli_new_service_twice_reports_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(kit(dir.path(), &["new", "service", "users"]).status.success());
    let path = dir.path().join("users/pkg/service/service.go");
    fs::write(&path, "package service\n\n// mine\n").unwrap();

    let out = kit(dir.path(), &["new", "service", "users"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "package service\n\n// mine\n");
}

#[test]
fn test_cli_unsupported_transport_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    new_service(dir.path());
    let before = snapshot(dir.path());

    let out = kit(dir.path(), &["generate", "service", "users", "-t", "soap"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Transport `soap` not supported"));
    assert_eq!(before, snapshot(dir.path()));
}

#[test]
fn test_cli_folder_flag() {
    let dir = tempfile::tempdir().unwrap();
    let out = kit(dir.path(), &["-b", "app", "new", "service", "users"]);
    assert!(out.status.success());
    assert!(dir.path().join("app/users/pkg/service/service.go").exists());
}

#[test]
fn test_cli_rejects_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    let out = kit(dir.path(), &["generate", "nothing"]);
    assert!(!out.status.success());
}
