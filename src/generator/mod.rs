//! # Generator Module
//!
//! Turns a service interface declaration into go-kit scaffolding.
//!
//! ## Overview
//!
//! Every artifact kind has one generator, and all of them share one contract,
//! [`Generate`]. The [`Generator`] enum is what the CLI builds and dispatches:
//!
//! | Generator | Output |
//! |---|---|
//! | [`NewService`] | `service.go` skeleton with an empty `<Name>Service` interface |
//! | [`ServiceGenerator`] | service stub, middleware, endpoints, transport and `main.go` |
//! | [`TransportGenerator`] | HTTP handlers or gRPC proto + handlers |
//! | [`MiddlewareGenerator`] | a named service or endpoint middleware |
//! | [`ClientGenerator`] | HTTP client package |
//! | [`ModelGenerator`] | database model and controller |
//! | [`DbGenerator`] | database session helper |
//! | [`DockerGenerator`] | `Dockerfile` per service and `docker-compose.yml` |
//!
//! ## Architecture
//!
//! ```text
//! service.go → parser → method filter → synthesizers → merge engine → FileSystem
//! ```
//!
//! Synthesizers are pure functions from a [`ServiceContract`] to a list of
//! [`Fragment`]s. They never touch files. The [`Workspace`] owns the
//! configuration and the filesystem and feeds fragments through the
//! [`MergeEngine`], which appends only what is missing. Whole-file artifacts
//! (`main.go`, `handler_gen.go`, `endpoint_gen.go`, the client package,
//! Dockerfiles) are rendered completely and written through the overwrite
//! policy instead.

mod client;
mod cmd;
mod contract;
mod db;
mod docker;
mod endpoint;
mod middleware;
mod model;
mod new_service;
mod service;
mod templates;
mod transport;

pub use client::ClientGenerator;
pub use contract::ServiceContract;
pub use db::DbGenerator;
pub use docker::{DockerCompose, DockerGenerator, DockerService};
pub use middleware::{DefaultMiddleware, MiddlewareGenerator};
pub use model::ModelGenerator;
pub use new_service::NewService;
pub use service::ServiceGenerator;
pub use transport::{render_proto, Transport, TransportGenerator};

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::emit::{render_file, Decl};
use crate::fs::{FileSystem, WriteOutcome};
use crate::imports::ImportSet;
use crate::merge::{Fragment, MergeEngine, MergeOutcome};
use crate::parser::ParseError;

/// Failures a generator reports to its caller
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("could not parse `{path}`: {source}")]
    Parse { path: String, source: ParseError },

    #[error("could not re-parse the code generated for `{path}`, nothing was written: {source}")]
    ImportReconciliation { path: String, source: ParseError },

    #[error("Service {0} was not found")]
    ServiceNotFound(String),

    #[error("Could not find the service interface in `{0}`")]
    InterfaceNotFound(String),

    #[error("The service has no suitable methods please implement the interface methods")]
    NoMethods,

    #[error("Transport `{0}` not supported")]
    UnsupportedTransport(String),

    #[error("`{bin}` is not available, it is required to generate the gRPC transport: {reason}")]
    ProtocUnavailable { bin: String, reason: String },

    #[error("Service `{0}` already exists")]
    AlreadyExists(String),
}

/// One generation step
pub trait Generate {
    /// Run the step against `ws`
    ///
    /// # Errors
    ///
    /// Returns the first failure; files written before it stay written.
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()>;
}

/// Every generator the CLI can run
#[derive(Debug, Clone)]
pub enum Generator {
    NewService(NewService),
    Service(ServiceGenerator),
    Transport(TransportGenerator),
    Middleware(MiddlewareGenerator),
    Client(ClientGenerator),
    Model(ModelGenerator),
    Db(DbGenerator),
    Docker(DockerGenerator),
}

impl Generate for Generator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        match self {
            Generator::NewService(g) => g.generate(ws),
            Generator::Service(g) => g.generate(ws),
            Generator::Transport(g) => g.generate(ws),
            Generator::Middleware(g) => g.generate(ws),
            Generator::Client(g) => g.generate(ws),
            Generator::Model(g) => g.generate(ws),
            Generator::Db(g) => g.generate(ws),
            Generator::Docker(g) => g.generate(ws),
        }
    }
}

/// Configuration plus storage for one invocation
pub struct Workspace<'a> {
    pub config: &'a Config,
    pub fs: &'a dyn FileSystem,
}

impl<'a> Workspace<'a> {
    pub fn new(config: &'a Config, fs: &'a dyn FileSystem) -> Self {
        Self { config, fs }
    }

    /// Create `dir` and its parents if missing
    pub fn ensure_dir(&self, dir: &Path) -> anyhow::Result<()> {
        if !self.fs.exists(dir)? {
            debug!("Creating missing folder structure : {}", dir.display());
            self.fs.mkdir_all(dir)?;
        }
        Ok(())
    }

    /// Merge fragments into a Go file, reporting what happened
    pub fn merge(
        &self,
        path: &Path,
        fragments: Vec<Fragment>,
    ) -> anyhow::Result<MergeOutcome> {
        if let Some(dir) = path.parent() {
            self.ensure_dir(dir)?;
        }
        let package = package_name(path);
        let outcome = MergeEngine::new(self.fs).merge(path, &package, fragments)?;
        if outcome.created {
            println!("✅ Generated {}", path.display());
        } else if outcome.changed() {
            println!("✅ Updated {} (+{} declarations)", path.display(), outcome.added.len());
        }
        Ok(outcome)
    }

    /// Write a whole file through the overwrite policy
    pub fn write(&self, path: &Path, content: &str, force: bool) -> anyhow::Result<WriteOutcome> {
        if let Some(dir) = path.parent() {
            self.ensure_dir(dir)?;
        }
        let outcome = self.fs.write_file(path, content, force || self.config.force)?;
        match outcome {
            WriteOutcome::Written => println!("✅ Generated {}", path.display()),
            WriteOutcome::Skipped => println!("⚠️  Skipping existing file: {}", path.display()),
            WriteOutcome::Unchanged => debug!(path = %path.display(), "file already up to date"),
        }
        Ok(outcome)
    }

    /// Render declarations as a complete Go file and write it
    pub fn write_decls(
        &self,
        path: &Path,
        header: Option<&str>,
        imports: &ImportSet,
        decls: &[Decl],
        force: bool,
    ) -> anyhow::Result<WriteOutcome> {
        let body = render_file(&package_name(path), imports, decls);
        let content = match header {
            Some(header) => format!("// {header}\n{body}"),
            None => body,
        };
        self.write(path, &crate::merge::normalize(&content), force)
    }
}

/// Go package name for a file: its directory's last segment, reduced to an
/// identifier
pub fn package_name(path: &Path) -> String {
    let dir = path
        .parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ident: String = dir
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();
    match ident.chars().next() {
        None => "main".to_string(),
        Some(c) if c.is_ascii_digit() => format!("p{ident}"),
        Some(_) => ident,
    }
}
