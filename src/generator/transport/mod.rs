//! Transport layer generation
//!
//! HTTP merges handler constructors into `pkg/http/handler.go` and rewrites
//! `handler_gen.go`; gRPC maintains the `.proto` definition and the same pair
//! of Go files under `pkg/grpc`. Thrift is recognised but not generated.

mod grpc;
mod http;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::warn;

use super::contract::ServiceContract;
use super::{Generate, GenerateError, Workspace};
use crate::parser;

pub use grpc::render_proto;
#[cfg(test)]
pub(crate) use grpc::write_artifacts as write_grpc_artifacts;

/// Header of files rewritten on every run
pub(crate) const GENERATED_NOTICE: &str = "THIS FILE IS AUTO GENERATED BY THE KIT TOOL DO NOT EDIT!!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Http,
    Grpc,
    Thrift,
}

impl FromStr for Transport {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Transport::Http),
            "grpc" => Ok(Transport::Grpc),
            "thrift" => Ok(Transport::Thrift),
            other => Err(GenerateError::UnsupportedTransport(other.to_string())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transport::Http => "http",
            Transport::Grpc => "grpc",
            Transport::Thrift => "thrift",
        };
        f.write_str(name)
    }
}

/// `generate transport <name> -t <transport>`
#[derive(Debug, Clone)]
pub struct TransportGenerator {
    pub name: String,
    pub transport: String,
    pub methods: Vec<String>,
    /// Route with `gorilla/mux` instead of `http.ServeMux`
    pub gorilla: bool,
}

impl Generate for TransportGenerator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let transport: Transport = self.transport.parse()?;
        let contract = ServiceContract::load(ws, &self.name, &self.methods)?;
        self.generate_for(ws, &contract, transport)
    }
}

impl TransportGenerator {
    /// Generate `transport` for an already loaded contract
    pub(crate) fn generate_for(
        &self,
        ws: &Workspace<'_>,
        contract: &ServiceContract,
        transport: Transport,
    ) -> anyhow::Result<()> {
        match transport {
            Transport::Http => http::generate(ws, contract, self.gorilla),
            Transport::Grpc => grpc::generate(ws, contract),
            Transport::Thrift => {
                warn!("This transport type is not yet implemented");
                Ok(())
            }
        }
    }
}

/// Methods whose `make<M>Handler` exists in the handler file, in file order
///
/// The generated wiring file is rebuilt from this list so handlers added by
/// earlier runs with a narrower method list stay wired.
pub(crate) fn handled_methods(path: &Path, handler_src: &str) -> anyhow::Result<Vec<String>> {
    let file = parser::parse(handler_src).map_err(|source| GenerateError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(file
        .methods
        .iter()
        .filter(|m| m.receiver.is_none())
        .filter_map(|m| {
            m.name
                .strip_prefix("make")
                .and_then(|rest| rest.strip_suffix("Handler"))
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
        })
        .collect())
}
