use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::{handled_methods, GENERATED_NOTICE};
use crate::emit::{Decl, Func, Stmt, StructDecl};
use crate::generator::contract::ServiceContract;
use crate::generator::{GenerateError, Workspace};
use crate::imports::{Import, ImportSet};
use crate::merge::{normalize, Fragment};
use crate::naming;
use crate::parser::Method;

const KIT_GRPC: &str = "github.com/go-kit/kit/transport/grpc";

#[allow(clippy::expect_used)]
static SERVICE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*service\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{").expect("valid regex"));

#[allow(clippy::expect_used)]
static MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*message\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{").expect("valid regex"));

#[allow(clippy::expect_used)]
static RPC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\brpc\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid regex"));

pub(super) fn generate(ws: &Workspace<'_>, contract: &ServiceContract) -> anyhow::Result<()> {
    check_protoc(&ws.config.protoc_bin)?;
    write_artifacts(ws, contract)
}

/// Fail early when the protocol compiler cannot be executed
fn check_protoc(bin: &str) -> Result<(), GenerateError> {
    let unavailable = |reason: String| GenerateError::ProtocUnavailable {
        bin: bin.to_string(),
        reason,
    };
    let output = Command::new(bin)
        .arg("--version")
        .output()
        .map_err(|e| unavailable(e.to_string()))?;
    if !output.status.success() {
        return Err(unavailable(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    debug!(
        version = %String::from_utf8_lossy(&output.stdout).trim(),
        "protocol compiler found"
    );
    Ok(())
}

/// `.proto`, `handler.go` and `handler_gen.go`, without the compiler check
pub(crate) fn write_artifacts(ws: &Workspace<'_>, contract: &ServiceContract) -> anyhow::Result<()> {
    let proto_path = ws.config.proto_file(&contract.name);
    let existing = if ws.fs.exists(&proto_path)? {
        Some(ws.fs.read_file(&proto_path)?)
    } else {
        None
    };
    let names: Vec<String> = contract.methods.iter().map(|m| m.name.clone()).collect();
    let proto = render_proto(existing.as_deref(), &contract.name, &names);
    if existing.as_deref() == Some(proto.as_str()) {
        info!("{} is up to date", proto_path.display());
    } else {
        ws.write(&proto_path, &proto, true)?;
    }

    let endpoint = Import::new(ws.config.import_path(&ws.config.endpoint_path_format, &contract.name));
    let pb = Import::new(ws.config.import_path(&ws.config.grpc_pb_path_format, &contract.name));
    let handler = ws.config.grpc_file(&contract.name);
    ws.merge(&handler, handler_fragments(contract, &endpoint, &pb))?;

    let src = ws.fs.read_file(&handler)?;
    let methods = handled_methods(&handler, &src)?;
    let mut imports = ImportSet::new();
    imports.insert(Import::new(KIT_GRPC));
    imports.insert(endpoint);
    imports.insert(pb);
    ws.write_decls(
        &ws.config.grpc_gen_file(&contract.name),
        Some(GENERATED_NOTICE),
        &imports,
        &grpc_server(&contract.name, &methods),
        true,
    )?;
    Ok(())
}

/// Create or extend a proto definition for `service`
///
/// Adds the service block, one `rpc` per method and empty request/reply
/// messages, each only when absent. Everything already in `existing` is kept
/// as written.
pub fn render_proto(existing: Option<&str>, service: &str, methods: &[String]) -> String {
    let service = naming::to_camel_case(service);
    let mut src = match existing {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => "syntax = \"proto3\";\n\npackage pb;\n".to_string(),
    };

    let body = match service_body(&src, &service) {
        Some(range) => range,
        None => {
            src = format!(
                "{}\n\n// The {service} service definition.\nservice {service} {{\n}}\n",
                src.trim_end()
            );
            match service_body(&src, &service) {
                Some(range) => range,
                None => return src,
            }
        }
    };

    let present: Vec<String> = src
        .get(body.clone())
        .map(|text| {
            RPC.captures_iter(text)
                .map(|c| c[1].to_string())
                .collect()
        })
        .unwrap_or_default();
    let rpcs: String = methods
        .iter()
        .filter(|m| !present.contains(m))
        .map(|m| format!(" rpc {m} ({m}Request) returns ({m}Reply);\n"))
        .collect();
    if !rpcs.is_empty() {
        let close = body.end;
        let before = src.get(..close).unwrap_or_default().trim_end();
        let after = src.get(close..).unwrap_or_default();
        src = format!("{before}\n{rpcs}{after}");
    }

    let messages: Vec<String> = MESSAGE
        .captures_iter(&src)
        .map(|c| c[1].to_string())
        .collect();
    for m in methods {
        for suffix in ["Request", "Reply"] {
            let name = format!("{m}{suffix}");
            if !messages.contains(&name) {
                src = format!("{}\n\nmessage {name} {{}}\n", src.trim_end());
            }
        }
    }
    normalize(&src)
}

/// Byte range between the braces of `service <name> { ... }`
fn service_body(src: &str, name: &str) -> Option<std::ops::Range<usize>> {
    let open = SERVICE_OPEN
        .captures_iter(src)
        .find(|c| &c[1] == name)?
        .get(0)?
        .end();
    let mut depth = 1usize;
    let mut in_comment = false;
    let bytes = src.as_bytes();
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => in_comment = false,
            b'/' if !in_comment && bytes.get(i + 1) == Some(&b'/') => in_comment = true,
            b'{' if !in_comment => depth += 1,
            b'}' if !in_comment => {
                depth -= 1;
                if depth == 0 {
                    return Some(open..i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Handler constructors, codec stubs and `grpcServer` adapters for `handler.go`
pub fn handler_fragments(contract: &ServiceContract, endpoint: &Import, pb: &Import) -> Vec<Fragment> {
    let mut out = Vec::new();
    for m in &contract.methods {
        out.push(make_handler(m, endpoint));
        out.push(codec_stub(m, "decode", "Request", "DecodeRequestFunc", "a user-domain request", "Decoder"));
        out.push(codec_stub(m, "encode", "Response", "EncodeResponseFunc", "a gRPC reply", "Encoder"));
        out.push(server_method(m, pb));
    }
    out
}

fn make_handler(m: &Method, endpoint: &Import) -> Fragment {
    let name = format!("make{}Handler", m.name);
    let func = Func::new(name.as_str())
        .doc(format!("{name} creates the handler logic"))
        .param("endpoints", "endpoint.Endpoints")
        .param("options", "[]grpc.ServerOption")
        .result("grpc.Handler")
        .body(vec![Stmt::line(format!(
            "return grpc.NewServer(endpoints.{0}Endpoint, decode{0}Request, encode{0}Response, options...)",
            m.name
        ))]);
    Fragment::new(func)
        .import(KIT_GRPC)
        .imports([endpoint.clone()])
}

fn codec_stub(m: &Method, verb: &str, suffix: &str, kind: &str, target: &str, label: &str) -> Fragment {
    let name = format!("{verb}{}{suffix}", m.name);
    let func = Func::new(name.as_str())
        .doc(format!("{name} is a transport/grpc.{kind} that converts"))
        .doc(format!("the message to {target}."))
        .doc(format!("TODO implement the {}", label.to_lowercase()))
        .param("_", "context.Context")
        .param("r", "interface{}")
        .result("interface{}")
        .result("error")
        .body(vec![Stmt::line(format!(
            "return nil, errors.New(\"'{}' {label} is not implemented\")",
            m.name
        ))]);
    Fragment::new(func).import("context").import("errors")
}

fn server_method(m: &Method, pb: &Import) -> Fragment {
    let field = naming::to_lower_first(&m.name);
    let reply = format!("*pb.{}Reply", m.name);
    let func = Func::new(m.name.as_str())
        .receiver("g", "*grpcServer")
        .param("ctx", "context.Context")
        .param("req", format!("*pb.{}Request", m.name))
        .result(reply.as_str())
        .result("error")
        .body(vec![
            Stmt::line(format!("_, rep, err := g.{field}.ServeGRPC(ctx, req)")),
            Stmt::block("if err != nil", vec![Stmt::line("return nil, err")]),
            Stmt::line(format!("return rep.({reply}), nil")),
        ]);
    Fragment::new(func).import("context").imports([pb.clone()])
}

/// `grpcServer` and `NewGRPCServer` for the handlers listed in `methods`
fn grpc_server(service: &str, methods: &[String]) -> Vec<Decl> {
    let mut strukt = StructDecl::new("grpcServer");
    let mut fields = Vec::new();
    for m in methods {
        let field = naming::to_lower_first(m);
        strukt = strukt.field(field.as_str(), "grpc.Handler");
        fields.push((field, format!("make{m}Handler(endpoints, options[\"{m}\"])")));
    }
    let ctor = Func::new("NewGRPCServer")
        .doc("NewGRPCServer makes a set of endpoints available as a gRPC AddServer")
        .param("endpoints", "endpoint.Endpoints")
        .param("options", "map[string][]grpc.ServerOption")
        .result(format!("pb.{}Server", naming::to_camel_case(service)))
        .body(vec![Stmt::wrapped(
            "return &grpcServer{",
            vec![Stmt::KeyValues(fields)],
            "}",
        )]);
    vec![Decl::from(strukt), Decl::from(ctor)]
}
