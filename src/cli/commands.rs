use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, error};

use crate::config::{Config, Overrides};
use crate::fs::{OsFs, StdinPrompt};
use crate::generator::{
    ClientGenerator, DbGenerator, DockerGenerator, Generate, Generator, MiddlewareGenerator,
    ModelGenerator, NewService, ServiceGenerator, TransportGenerator, Workspace,
};

/// Command-line interface for kit
///
/// Scaffolds go-kit services and keeps their generated files in sync with
/// the service interface.
#[derive(Debug, Parser)]
#[command(name = "kit")]
#[command(about = "Go-kit service generator", long_about = None, version)]
pub struct Cli {
    /// Debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Overwrite existing files without prompting
    #[arg(short, long, global = true, default_value_t = false)]
    pub force: bool,

    /// Project folder, relative to the working directory
    #[arg(short = 'b', long, global = true)]
    pub folder: Option<String>,

    /// Go module path of the project (skips the GOPATH lookup)
    #[arg(long = "mod_module", global = true)]
    pub module: Option<String>,

    /// Configuration file (default: kit.toml in the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create new artifacts
    #[command(visible_alias = "n")]
    New {
        #[command(subcommand)]
        what: NewCommand,
    },
    /// Generate or extend scaffolding from a service interface
    #[command(visible_alias = "g")]
    Generate {
        #[command(subcommand)]
        what: GenerateCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum NewCommand {
    /// Create a service.go holding an empty service interface
    #[command(visible_alias = "s")]
    Service {
        /// Service name
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum GenerateCommand {
    /// Service stub, middleware, endpoints, transport and main.go
    #[command(visible_alias = "s")]
    Service {
        /// Service name
        name: String,

        /// Transport: http, grpc or thrift
        #[arg(short, long, default_value = "http")]
        transport: String,

        /// Only generate these methods (repeat or comma-separate)
        #[arg(short, long, value_delimiter = ',')]
        methods: Vec<String>,

        /// Default service and endpoint middleware
        #[arg(long, default_value_t = false)]
        dmw: bool,

        /// Default logging service middleware
        #[arg(long, default_value_t = false)]
        svc_mdw: bool,

        /// Default logging and instrumenting endpoint middleware
        #[arg(long, default_value_t = false)]
        endpoint_mdw: bool,

        /// Route with gorilla/mux instead of net/http
        #[arg(long, default_value_t = false)]
        gorilla: bool,
    },
    /// Transport layer for an existing service
    #[command(visible_alias = "t")]
    Transport {
        /// Service name
        name: String,

        /// Transport: http, grpc or thrift
        #[arg(short, long, default_value = "http")]
        transport: String,

        /// Only generate these methods (repeat or comma-separate)
        #[arg(short, long, value_delimiter = ',')]
        methods: Vec<String>,

        /// Route with gorilla/mux instead of net/http
        #[arg(long, default_value_t = false)]
        gorilla: bool,
    },
    /// A named service or endpoint middleware
    #[command(visible_alias = "m")]
    Middleware {
        /// Middleware name
        name: String,

        /// Service the middleware belongs to
        #[arg(short, long)]
        service: String,

        /// Endpoint middleware instead of service middleware
        #[arg(short, long, default_value_t = false)]
        endpoint: bool,
    },
    /// Client package for a service
    #[command(visible_alias = "c")]
    Client {
        /// Service name
        name: String,

        /// Transport: http, grpc or thrift
        #[arg(short, long, default_value = "http")]
        transport: String,
    },
    /// Database model and controller
    Model {
        /// Model name
        model: String,

        /// Service the model belongs to
        #[arg(short, long)]
        service: String,
    },
    /// Database session helper
    Db {
        /// Service name
        name: String,
    },
    /// Dockerfiles and docker-compose.yml for every service
    #[command(visible_alias = "d")]
    Docker {
        /// Use the glide Dockerfile variant
        #[arg(long, default_value_t = false)]
        glide: bool,
    },
}

impl Commands {
    /// The generator this command runs
    pub fn into_generator(self) -> Generator {
        match self {
            Commands::New {
                what: NewCommand::Service { name },
            } => Generator::NewService(NewService { name }),
            Commands::Generate { what } => what.into_generator(),
        }
    }
}

impl GenerateCommand {
    fn into_generator(self) -> Generator {
        match self {
            GenerateCommand::Service {
                name,
                transport,
                methods,
                dmw,
                svc_mdw,
                endpoint_mdw,
                gorilla,
            } => Generator::Service(ServiceGenerator {
                name,
                transport,
                methods,
                service_middleware: dmw || svc_mdw,
                endpoint_middleware: dmw || endpoint_mdw,
                gorilla,
            }),
            GenerateCommand::Transport {
                name,
                transport,
                methods,
                gorilla,
            } => Generator::Transport(TransportGenerator {
                name,
                transport,
                methods,
                gorilla,
            }),
            GenerateCommand::Middleware {
                name,
                service,
                endpoint,
            } => Generator::Middleware(MiddlewareGenerator {
                name,
                service,
                endpoint,
            }),
            GenerateCommand::Client { name, transport } => {
                Generator::Client(ClientGenerator { name, transport })
            }
            GenerateCommand::Model { model, service } => Generator::Model(ModelGenerator {
                name: service,
                model,
            }),
            GenerateCommand::Db { name } => Generator::Db(DbGenerator { name }),
            GenerateCommand::Docker { glide } => Generator::Docker(DockerGenerator { glide }),
        }
    }
}

/// Execute the CLI command in the current working directory
///
/// Generation failures are logged and do not fail the process.
///
/// # Errors
///
/// Returns an error if the working directory or the configuration file
/// cannot be read.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    run_in(cli, &cwd)
}

/// Execute the CLI command with `cwd` as the working directory
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or parsed.
pub fn run_in(cli: Cli, cwd: &Path) -> anyhow::Result<()> {
    let overrides = Overrides {
        force: cli.force,
        folder: cli.folder.clone(),
        module: cli.module.clone(),
    };
    let config = Config::resolve(cli.config.as_deref(), cwd, &overrides)?;
    let root = match config.folder.as_deref() {
        Some(folder) if !folder.is_empty() => cwd.join(folder),
        _ => cwd.to_path_buf(),
    };
    debug!(root = %root.display(), project = %config.project, "resolved project");

    let fs = OsFs::new(root, config.force, Box::new(StdinPrompt));
    let ws = Workspace::new(&config, &fs);
    if let Err(e) = cli.command.into_generator().generate(&ws) {
        error!("{e:#}");
    }
    Ok(())
}
