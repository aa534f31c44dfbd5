//! Generator configuration
//!
//! Path templates, file names and flags that decide *where* generated code
//! lands. A [`Config`] is built once per invocation (defaults, then an optional
//! `kit.toml`, then environment and CLI overrides) and is read-only afterwards.
//!
//! Path templates contain `%s`, replaced by the lower-snake service name.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::naming;

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "kit.toml";

/// Environment variable overriding the protocol compiler binary
pub const PROTOC_ENV: &str = "KIT_PROTOC_BIN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub service_path_format: String,
    pub cmd_path_format: String,
    pub endpoint_path_format: String,
    pub http_path_format: String,
    pub grpc_path_format: String,
    pub grpc_pb_path_format: String,
    pub http_client_path_format: String,
    pub grpc_client_path_format: String,
    pub client_cmd_path_format: String,
    pub db_path_format: String,
    pub model_path_format: String,

    pub service_file_name: String,
    pub service_middleware_file_name: String,
    pub endpoint_file_name: String,
    pub endpoint_gen_file_name: String,
    pub endpoint_middleware_file_name: String,
    pub http_file_name: String,
    pub http_gen_file_name: String,
    pub grpc_file_name: String,
    pub grpc_gen_file_name: String,
    /// `%s` is replaced by the lower-snake service name
    pub grpc_pb_file_name: String,
    pub http_client_file_name: String,
    pub grpc_client_file_name: String,
    pub db_file_name: String,
    pub cmd_file_name: String,

    /// Prefix of the generated service struct (`basic` -> `basicFooService`)
    pub service_struct_prefix: String,
    /// Protocol compiler checked before gRPC generation
    pub protoc_bin: String,
    /// Go module path; when unset the project path is derived from `$GOPATH`
    pub module: Option<String>,
    /// Project folder, relative to the working directory
    pub folder: Option<String>,
    /// Overwrite whole-file artifacts without asking
    pub force: bool,

    /// Import path of the project root, resolved by [`Config::finalize`]
    #[serde(skip)]
    pub project: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_path_format: "%s/pkg/service".into(),
            cmd_path_format: "%s/cmd/service".into(),
            endpoint_path_format: "%s/pkg/endpoint".into(),
            http_path_format: "%s/pkg/http".into(),
            grpc_path_format: "%s/pkg/grpc".into(),
            grpc_pb_path_format: "%s/pkg/grpc/pb".into(),
            http_client_path_format: "%s/client/http".into(),
            grpc_client_path_format: "%s/client/grpc".into(),
            client_cmd_path_format: "%s/cmd/client".into(),
            db_path_format: "%s/pkg/db".into(),
            model_path_format: "%s/pkg/db/model".into(),

            service_file_name: "service.go".into(),
            service_middleware_file_name: "middleware.go".into(),
            endpoint_file_name: "endpoint.go".into(),
            endpoint_gen_file_name: "endpoint_gen.go".into(),
            endpoint_middleware_file_name: "middleware.go".into(),
            http_file_name: "handler.go".into(),
            http_gen_file_name: "handler_gen.go".into(),
            grpc_file_name: "handler.go".into(),
            grpc_gen_file_name: "handler_gen.go".into(),
            grpc_pb_file_name: "%s.proto".into(),
            http_client_file_name: "http.go".into(),
            grpc_client_file_name: "grpc.go".into(),
            db_file_name: "db.go".into(),
            cmd_file_name: "main.go".into(),

            service_struct_prefix: "basic".into(),
            protoc_bin: "protoc".into(),
            module: None,
            folder: None,
            force: false,
            project: String::new(),
        }
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub force: bool,
    pub folder: Option<String>,
    pub module: Option<String>,
}

impl Config {
    /// Resolve the full configuration for one invocation
    ///
    /// Priority: CLI flags, then environment, then the config file, then
    /// defaults.
    ///
    /// # Errors
    ///
    /// Fails when a config file exists but cannot be read or parsed.
    pub fn resolve(
        explicit: Option<&Path>,
        cwd: &Path,
        overrides: &Overrides,
    ) -> anyhow::Result<Config> {
        let config = match resolve_config_path(explicit, cwd) {
            Some(path) => load_config(&path)?.unwrap_or_default(),
            None => Config::default(),
        };
        let config = config.apply_env(
            std::env::var(PROTOC_ENV).ok(),
        );
        Ok(config
            .apply(overrides)
            .finalize(cwd, std::env::var("GOPATH").ok().as_deref()))
    }

    fn apply_env(mut self, protoc: Option<String>) -> Self {
        if let Some(bin) = protoc.filter(|b| !b.is_empty()) {
            self.protoc_bin = bin;
        }
        self
    }

    /// Layer CLI flags over the loaded values
    pub fn apply(mut self, overrides: &Overrides) -> Self {
        self.force |= overrides.force;
        if let Some(folder) = &overrides.folder {
            self.folder = Some(folder.clone());
        }
        if let Some(module) = &overrides.module {
            self.module = Some(module.clone());
        }
        self
    }

    /// Compute the project import path
    pub fn finalize(mut self, cwd: &Path, gopath: Option<&str>) -> Self {
        self.project = naming::project_import_path(
            self.module.as_deref(),
            gopath,
            cwd,
            self.folder.as_deref(),
        );
        self
    }

    /// Directory for `template` and `service`, relative to the project folder
    pub fn dir(&self, template: &str, service: &str) -> PathBuf {
        PathBuf::from(naming::fill_template(template, service))
    }

    /// Go import path of the package laid out by `template`
    pub fn import_path(&self, template: &str, service: &str) -> String {
        naming::import_path(&self.project, template, service)
    }

    pub fn service_file(&self, service: &str) -> PathBuf {
        self.dir(&self.service_path_format, service)
            .join(&self.service_file_name)
    }

    pub fn service_middleware_file(&self, service: &str) -> PathBuf {
        self.dir(&self.service_path_format, service)
            .join(&self.service_middleware_file_name)
    }

    pub fn endpoint_file(&self, service: &str) -> PathBuf {
        self.dir(&self.endpoint_path_format, service)
            .join(&self.endpoint_file_name)
    }

    pub fn endpoint_gen_file(&self, service: &str) -> PathBuf {
        self.dir(&self.endpoint_path_format, service)
            .join(&self.endpoint_gen_file_name)
    }

    pub fn endpoint_middleware_file(&self, service: &str) -> PathBuf {
        self.dir(&self.endpoint_path_format, service)
            .join(&self.endpoint_middleware_file_name)
    }

    pub fn http_file(&self, service: &str) -> PathBuf {
        self.dir(&self.http_path_format, service)
            .join(&self.http_file_name)
    }

    pub fn http_gen_file(&self, service: &str) -> PathBuf {
        self.dir(&self.http_path_format, service)
            .join(&self.http_gen_file_name)
    }

    pub fn grpc_file(&self, service: &str) -> PathBuf {
        self.dir(&self.grpc_path_format, service)
            .join(&self.grpc_file_name)
    }

    pub fn grpc_gen_file(&self, service: &str) -> PathBuf {
        self.dir(&self.grpc_path_format, service)
            .join(&self.grpc_gen_file_name)
    }

    pub fn proto_file(&self, service: &str) -> PathBuf {
        self.dir(&self.grpc_pb_path_format, service)
            .join(naming::fill_template(&self.grpc_pb_file_name, service))
    }

    pub fn http_client_file(&self, service: &str) -> PathBuf {
        self.dir(&self.http_client_path_format, service)
            .join(&self.http_client_file_name)
    }

    pub fn grpc_client_file(&self, service: &str) -> PathBuf {
        self.dir(&self.grpc_client_path_format, service)
            .join(&self.grpc_client_file_name)
    }

    pub fn cmd_file(&self, service: &str) -> PathBuf {
        self.dir(&self.cmd_path_format, service)
            .join(&self.cmd_file_name)
    }

    pub fn db_file(&self, service: &str) -> PathBuf {
        self.dir(&self.db_path_format, service)
            .join(&self.db_file_name)
    }

    pub fn model_dir(&self, service: &str) -> PathBuf {
        self.dir(&self.model_path_format, service)
    }
}

/// Load a configuration file
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but fails
/// to read or parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<Config>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read kit config: {}", config_path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse kit config: {}", config_path.display()))?;
    Ok(Some(config))
}

/// Resolve the config file path
///
/// Priority:
/// 1. Explicitly provided path (via CLI)
/// 2. `kit.toml` in the working directory
/// 3. None (defaults only)
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }
    let detected = cwd.join(CONFIG_FILE_NAME);
    detected.exists().then_some(detected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_default_layout() {
        let config = Config::default();
        assert_eq!(
            config.service_file("UserAccount"),
            PathBuf::from("user_account/pkg/service/service.go")
        );
        assert_eq!(
            config.proto_file("foo"),
            PathBuf::from("foo/pkg/grpc/pb/foo.proto")
        );
        assert_eq!(
            config.endpoint_gen_file("foo"),
            PathBuf::from("foo/pkg/endpoint/endpoint_gen.go")
        );
        assert_eq!(
            config.http_gen_file("foo"),
            PathBuf::from("foo/pkg/http/handler_gen.go")
        );
        assert_eq!(config.service_struct_prefix, "basic");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "service_struct_prefix = \"simple\"\nmodule = \"example.com/acme\"\n",
        )
        .unwrap();

        let loaded = load_config(&path).unwrap().unwrap();
        assert_eq!(loaded.service_struct_prefix, "simple");
        assert_eq!(loaded.service_file_name, "service.go");
        assert_eq!(resolve_config_path(None, dir.path()), Some(path));
    }

    #[test]
    fn test_missing_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.toml")).unwrap().is_none());
        assert!(resolve_config_path(None, dir.path()).is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "force = \"not a bool\"").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse kit config"));
    }

    #[test]
    fn test_overrides_and_project_path() {
        let config = Config::default()
            .apply(&Overrides {
                force: true,
                folder: Some("app".into()),
                module: None,
            })
            .finalize(Path::new("/go/src/github.com/me/proj"), Some("/go"));
        assert!(config.force);
        assert_eq!(config.project, "github.com/me/proj/app");
        assert_eq!(
            config.import_path(&config.endpoint_path_format, "foo"),
            "github.com/me/proj/app/foo/pkg/endpoint"
        );

        let with_module = Config::default()
            .apply(&Overrides {
                module: Some("example.com/acme".into()),
                ..Overrides::default()
            })
            .finalize(Path::new("/anywhere"), None);
        assert_eq!(with_module.project, "example.com/acme");
    }

    #[test]
    fn test_protoc_env_override() {
        let config = Config::default().apply_env(Some("/opt/protoc".into()));
        assert_eq!(config.protoc_bin, "/opt/protoc");
        let config = Config::default().apply_env(Some(String::new()));
        assert_eq!(config.protoc_bin, "protoc");
    }
}
