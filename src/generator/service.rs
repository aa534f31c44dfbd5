use tracing::warn;

use super::contract::{call_arg, ServiceContract};
use super::endpoint;
use super::middleware::{self, DefaultMiddleware};
use super::transport::{Transport, TransportGenerator};
use super::{cmd, Generate, Workspace};
use crate::emit::{Func, Stmt, StructDecl};
use crate::imports::Import;
use crate::merge::Fragment;
use crate::naming;
use crate::parser::Method;

/// `generate service <name>`: the full pipeline for one service
#[derive(Debug, Clone)]
pub struct ServiceGenerator {
    pub name: String,
    pub transport: String,
    /// Explicit method allow-list; empty keeps every eligible method
    pub methods: Vec<String>,
    /// Default logging middleware on the service
    pub service_middleware: bool,
    /// Default logging and instrumenting middleware on the endpoints
    pub endpoint_middleware: bool,
    pub gorilla: bool,
}

impl Generate for ServiceGenerator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let transport: Transport = self.transport.parse()?;
        let contract = ServiceContract::load(ws, &self.name, &self.methods)?;

        ws.merge(&ws.config.service_file(&self.name), service_fragments(&contract))?;
        ws.merge(
            &ws.config.service_middleware_file(&self.name),
            middleware::service_fragments(&contract, self.service_middleware),
        )?;
        endpoint::generate(ws, &contract)?;
        if self.endpoint_middleware {
            ws.merge(
                &ws.config.endpoint_middleware_file(&self.name),
                middleware::endpoint_defaults(),
            )?;
        }

        if transport == Transport::Thrift {
            warn!("This transport type is not yet implemented");
        } else {
            TransportGenerator {
                name: self.name.clone(),
                transport: self.transport.clone(),
                methods: self.methods.clone(),
                gorilla: self.gorilla,
            }
            .generate_for(ws, &contract, transport)?;
        }

        let defaults = DefaultMiddleware {
            service: self.service_middleware,
            endpoint: self.endpoint_middleware,
        };
        cmd::write_main(ws, &contract, transport, defaults)
    }
}

/// Service struct, stub methods and the two constructors
pub fn service_fragments(contract: &ServiceContract) -> Vec<Fragment> {
    let iface = &contract.interface_name;
    let strukt = &contract.struct_name;
    let recv = contract.receiver_name(strukt);
    let basic_ctor = format!("New{}", naming::to_camel_case(strukt));

    let mut fragments = vec![Fragment::new(StructDecl::new(strukt.as_str()))];
    for m in &contract.methods {
        let returns: Vec<&str> = m.results.iter().map(|r| r.name.as_str()).collect();
        let func = Func::new(m.name.as_str())
            .receiver(recv.as_str(), format!("*{strukt}"))
            .params(&m.parameters)
            .named_results(&m.results)
            .body(vec![
                Stmt::comment(format!("TODO implement the business logic of {}", m.name)),
                Stmt::line(format!("return {}", returns.join(", "))),
            ]);
        fragments.push(Fragment::new(func).imports(signature_imports(contract, m)));
    }

    fragments.push(Fragment::new(
        Func::new(basic_ctor.as_str())
            .doc(format!(
                "{basic_ctor} returns a naive, stateless implementation of {iface}."
            ))
            .result(iface.as_str())
            .body(vec![Stmt::line(format!("return &{strukt}{{}}"))]),
    ));
    fragments.push(Fragment::new(
        Func::new("New")
            .doc(format!(
                "New returns a {iface} with all of the expected middleware wired in."
            ))
            .param("middleware", "[]Middleware")
            .result(iface.as_str())
            .body(vec![
                Stmt::line(format!("var svc {iface} = {basic_ctor}()")),
                Stmt::block(
                    "for _, m := range middleware",
                    vec![Stmt::line("svc = m(svc)")],
                ),
                Stmt::line("return svc"),
            ]),
    ));
    fragments
}

/// Imports the signature of `m` needs inside the service package
pub(crate) fn signature_imports(contract: &ServiceContract, m: &Method) -> Vec<Import> {
    m.parameters
        .iter()
        .chain(&m.results)
        .flat_map(|p| contract.imports_for(&p.ty))
        .collect()
}

/// `next.M(ctx, a, b...)` for a delegating method
pub(crate) fn delegate_call(target: &str, m: &Method) -> String {
    let args: Vec<String> = m.parameters.iter().map(|p| call_arg(p, &p.name)).collect();
    format!("{target}.{}({})", m.name, args.join(", "))
}
