//! # CLI Module
//!
//! Command-line surface of the `kit` binary.
//!
//! ## Commands
//!
//! ### `new service`
//!
//! Create `<name>/pkg/service/service.go` with an empty interface:
//!
//! ```bash
//! kit new service users
//! ```
//!
//! ### `generate`
//!
//! Generate or extend scaffolding from the service interface:
//!
//! ```bash
//! kit generate service users -t http --dmw
//! kit generate transport users -t grpc -m Create -m Get
//! kit generate middleware auth -s users -e
//! kit generate client users -t http
//! kit generate model account -s users
//! kit generate db users
//! kit generate docker
//! ```
//!
//! Every command can be re-run; generated files only ever gain what is
//! missing.
//!
//! ## Global flags
//!
//! - `-d, --debug` - debug logging
//! - `-f, --force` - overwrite whole-file artifacts without asking
//! - `-b, --folder <DIR>` - project folder relative to the working directory
//! - `--mod_module <PATH>` - Go module path of the project
//! - `--config <FILE>` - configuration file (default `kit.toml`)
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use kitgen::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, run_in, Cli, Commands, GenerateCommand, NewCommand};
