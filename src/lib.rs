//! # kitgen
//!
//! **kitgen** scaffolds [go-kit](https://gokit.io) microservices from a Go
//! service interface and keeps the generated code in step with it.
//!
//! ## Overview
//!
//! A user declares `type FooService interface { ... }` in
//! `foo/pkg/service/service.go`. kitgen reads that declaration and produces the
//! service stub, middleware, endpoint layer, HTTP or gRPC transport, client,
//! database helpers and the command's `main.go`. Running it again after the
//! interface grows adds only what is missing: hand-written code is never
//! touched and a repeated run changes nothing.
//!
//! ## Architecture
//!
//! - **[`parser`]** - structural Go parser producing the declaration model
//! - **[`filter`]** - which interface methods are eligible for generation
//! - **[`naming`]** - identifier and path conventions
//! - **[`emit`]** - Go declaration builders and their canonical printing
//! - **[`imports`]** - import specs and the rendered import block
//! - **[`merge`]** - the incremental, idempotent merge engine
//! - **[`fs`]** - filesystem collaborator with the overwrite policy
//! - **[`config`]** - layout and flags, loaded from `kit.toml`
//! - **[`generator`]** - one generator per artifact kind
//! - **[`cli`]** - the `kit` command line
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(kit)
//!     participant Contract as ServiceContract
//!     participant Synth as Synthesizers
//!     participant Merge as MergeEngine
//!     participant FS as FileSystem
//!
//!     User->>CLI: kit generate service foo -t http
//!     CLI->>Contract: load("foo")
//!     Contract->>FS: read service.go
//!     Contract->>Contract: parse + filter methods
//!     CLI->>Synth: fragments(contract)
//!     Synth-->>CLI: Vec<Fragment>
//!     CLI->>Merge: merge(path, fragments)
//!     Merge->>FS: read existing file
//!     Merge->>Merge: drop duplicates,<br/>reconcile imports
//!     Merge->>FS: write file
//!     CLI-->>User: ✅ Generated / Updated
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use kitgen::config::Config;
//! use kitgen::fs::{FixedAnswer, OsFs};
//! use kitgen::generator::{Generate, ServiceGenerator, Workspace};
//! use std::path::Path;
//!
//! let config = Config {
//!     module: Some("example.com/acme".into()),
//!     ..Config::default()
//! }
//! .finalize(Path::new("."), None);
//! let fs = OsFs::new(".", false, Box::new(FixedAnswer(false)));
//! let ws = Workspace::new(&config, &fs);
//! ServiceGenerator {
//!     name: "users".into(),
//!     transport: "http".into(),
//!     methods: vec![],
//!     service_middleware: true,
//!     endpoint_middleware: true,
//!     gorilla: false,
//! }
//! .generate(&ws)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod emit;
pub mod filter;
pub mod fs;
pub mod generator;
pub mod imports;
pub mod logging;
pub mod merge;
pub mod naming;
pub mod parser;

pub use config::Config;
pub use generator::{Generate, GenerateError, Generator, Workspace};
pub use merge::{Fragment, MergeEngine, MergeOutcome};
pub use parser::{parse, ParseError};
