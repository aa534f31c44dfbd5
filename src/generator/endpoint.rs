//! Endpoint layer synthesis
//!
//! One request/response pair and one `Make<M>Endpoint` constructor per
//! method are merged into `endpoint.go`, together with client-side
//! pass-through methods so `Endpoints` itself satisfies the service
//! interface. The `Endpoints` collection and its `New` wiring function live
//! in `endpoint_gen.go`, rebuilt on every run from the constructors present.

use tracing::{debug, warn};

use super::contract::{call_arg, context_param, field_type, ServiceContract};
use super::transport::GENERATED_NOTICE;
use super::{GenerateError, Workspace};
use crate::emit::{Decl, Func, Stmt, StructDecl};
use crate::imports::{Import, ImportSet};
use crate::merge::Fragment;
use crate::naming;
use crate::parser::{self, File, Method, NamedTypeValue};

pub(crate) const KIT_ENDPOINT: &str = "github.com/go-kit/kit/endpoint";

/// Merge `endpoint.go`, then rewrite `endpoint_gen.go` to wire every
/// `Make<M>Endpoint` the file now declares
pub(super) fn generate(ws: &Workspace<'_>, contract: &ServiceContract) -> anyhow::Result<()> {
    let path = ws.config.endpoint_file(&contract.name);
    ws.merge(&path, fragments(contract))?;

    let src = ws.fs.read_file(&path)?;
    let file = parser::parse(&src).map_err(|source| GenerateError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    let methods = endpoint_methods(&file);
    debug!(service = %contract.name, endpoints = methods.len(), "wiring endpoints");

    if let Some(existing) = file.structures.iter().find(|s| s.name == "Endpoints") {
        let missing: Vec<String> = methods
            .iter()
            .map(|m| format!("{m}Endpoint"))
            .filter(|f| !existing.fields.iter().any(|e| e.name == *f))
            .collect();
        if !missing.is_empty() {
            warn!(
                "{} declares `Endpoints` itself, add the fields {} and their wiring in `New`",
                path.display(),
                missing.join(", ")
            );
        }
        return Ok(());
    }

    let mut imports = ImportSet::new();
    imports.insert(Import::new(KIT_ENDPOINT));
    imports.insert(contract.service_import.clone());
    ws.write_decls(
        &ws.config.endpoint_gen_file(&contract.name),
        Some(GENERATED_NOTICE),
        &imports,
        &wiring(contract, &methods),
        true,
    )?;
    Ok(())
}

/// Methods whose `Make<M>Endpoint` is declared in `file`, in file order
fn endpoint_methods(file: &File) -> Vec<String> {
    file.methods
        .iter()
        .filter(|m| m.receiver.is_none())
        .filter_map(|m| {
            m.name
                .strip_prefix("Make")
                .and_then(|rest| rest.strip_suffix("Endpoint"))
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// The `Endpoints` struct and `New` for `methods`
fn wiring(contract: &ServiceContract, methods: &[String]) -> Vec<Decl> {
    let service_iface = service_iface(contract);
    let mut endpoints = StructDecl::new("Endpoints")
        .doc("Endpoints collects all of the endpoints that compose a profile service. It's")
        .doc("meant to be used as a helper struct, to collect all of the endpoints into a")
        .doc("single parameter.");
    let mut fields = Vec::new();
    let mut wraps = Vec::new();
    for m in methods {
        let field = format!("{m}Endpoint");
        endpoints = endpoints.field(field.as_str(), "endpoint.Endpoint");
        fields.push((field.clone(), format!("Make{field}(s)")));
        wraps.push(Stmt::block(
            format!("for _, m := range mdw[\"{m}\"]"),
            vec![Stmt::line(format!("eps.{field} = m(eps.{field})"))],
        ));
    }

    let mut new_body = vec![Stmt::wrapped(
        "eps := Endpoints{",
        vec![Stmt::KeyValues(fields)],
        "}",
    )];
    new_body.extend(wraps);
    new_body.push(Stmt::line("return eps"));

    vec![
        Decl::from(endpoints),
        Decl::from(
            Func::new("New")
                .doc("New returns a Endpoints struct that wraps the provided service, and wires in all of the")
                .doc("expected endpoint middlewares")
                .param("s", service_iface.as_str())
                .param("mdw", "map[string][]endpoint.Middleware")
                .result("Endpoints")
                .body(new_body),
        ),
    ]
}

fn service_iface(contract: &ServiceContract) -> String {
    format!(
        "{}.{}",
        contract.service_import.name(),
        contract.interface_name
    )
}

/// Everything `pkg/endpoint/endpoint.go` should declare for `contract`
pub fn fragments(contract: &ServiceContract) -> Vec<Fragment> {
    let service_iface = service_iface(contract);
    let mut out = Vec::new();
    for m in &contract.methods {
        out.extend(method_fragments(contract, m, &service_iface));
    }

    if contract.any_returns_error() {
        out.push(Fragment::new(Decl::Interface {
            doc: vec![
                "Failure is an interface that should be implemented by response types.".into(),
                "Response encoders can check if responses are Failer, because then they".into(),
                "don't have to implement the error encoding themselves.".into(),
            ],
            name: "Failure".into(),
            methods: vec![Func::new("Failed").result("error")],
        }));
    }
    out
}

/// `BarEndpoint`
pub(crate) fn endpoint_field(m: &Method) -> String {
    format!("{}Endpoint", m.name)
}

/// Struct field name for a parameter or result
pub(crate) fn field_name(value: &NamedTypeValue) -> String {
    naming::to_camel_case(&value.name)
}

/// Request fields: every parameter except the context
fn request_fields(m: &Method) -> impl Iterator<Item = &NamedTypeValue> {
    m.parameters.iter().filter(|p| p.ty != "context.Context")
}

fn method_fragments(contract: &ServiceContract, m: &Method, service_iface: &str) -> Vec<Fragment> {
    let request = format!("{}Request", m.name);
    let response = format!("{}Response", m.name);
    let mut imports: Vec<Import> = Vec::new();

    let mut req_struct = StructDecl::new(request.as_str())
        .doc(format!("{request} collects the request parameters for the {} method.", m.name));
    for p in request_fields(m) {
        let (ty, extra) = contract.foreign_type(&field_type(&p.ty));
        imports.extend(extra);
        req_struct = req_struct.tagged(
            field_name(p),
            ty,
            format!("json:\"{}\"", naming::to_lower_snake_case(&p.name)),
        );
    }

    let mut resp_struct = StructDecl::new(response.as_str())
        .doc(format!("{response} collects the response parameters for the {} method.", m.name));
    for r in &m.results {
        let (ty, extra) = contract.foreign_type(&r.ty);
        imports.extend(extra);
        resp_struct = resp_struct.tagged(
            field_name(r),
            ty,
            format!("json:\"{}\"", naming::to_lower_snake_case(&r.name)),
        );
    }

    let mut out = vec![
        Fragment::new(req_struct).imports(imports.clone()),
        Fragment::new(resp_struct).imports(imports),
        make_endpoint(contract, m, &request, &response, service_iface),
    ];

    if let Some(err) = m.results.iter().find(|r| r.ty == "error") {
        out.push(Fragment::new(
            Func::new("Failed")
                .doc("Failed implements Failer.")
                .receiver("r", response.as_str())
                .result("error")
                .body(vec![Stmt::line(format!("return r.{}", field_name(err)))]),
        ));
    }
    out.push(client_method(contract, m, &request, &response));
    out
}

fn make_endpoint(
    contract: &ServiceContract,
    m: &Method,
    request: &str,
    response: &str,
    service_iface: &str,
) -> Fragment {
    let ctx = context_param(m);
    let args: Vec<String> = m
        .parameters
        .iter()
        .map(|p| {
            if Some(p.name.as_str()) == ctx {
                "ctx".to_string()
            } else {
                call_arg(p, &format!("req.{}", field_name(p)))
            }
        })
        .collect();
    let call = format!("s.{}({})", m.name, args.join(", "));
    let results: Vec<&str> = m.results.iter().map(|r| r.name.as_str()).collect();

    let mut inner = Vec::new();
    if request_fields(m).next().is_some() {
        inner.push(Stmt::line(format!("req := request.({request})")));
    }
    inner.push(Stmt::line(format!("{} := {call}", results.join(", "))));
    inner.push(Stmt::wrapped(
        format!("return {response}{{"),
        vec![Stmt::KeyValues(
            m.results
                .iter()
                .map(|r| (field_name(r), r.name.clone()))
                .collect(),
        )],
        "}, nil",
    ));

    let name = format!("Make{}", endpoint_field(m));
    let func = Func::new(name.as_str())
        .doc(format!("{name} returns an endpoint that invokes {} on the service.", m.name))
        .param("s", service_iface)
        .result("endpoint.Endpoint")
        .body(vec![Stmt::wrapped(
            "return func(ctx context.Context, request interface{}) (interface{}, error) {",
            inner,
            "}",
        )]);
    Fragment::new(func)
        .import("context")
        .import(KIT_ENDPOINT)
        .imports([contract.service_import.clone()])
}

/// `Endpoints.<M>`: calls the endpoint and unpacks the response
fn client_method(contract: &ServiceContract, m: &Method, request: &str, response: &str) -> Fragment {
    let recv = contract.receiver_name("Endpoints");
    let mut imports = Vec::new();
    let mut retype = |values: &[NamedTypeValue]| -> Vec<NamedTypeValue> {
        values
            .iter()
            .map(|v| {
                let (ty, extra) = contract.foreign_type(&v.ty);
                imports.extend(extra);
                NamedTypeValue::new(v.name.as_str(), ty)
            })
            .collect()
    };
    let params = retype(&m.parameters);
    let results = retype(&m.results);
    let ctx = context_param(m).unwrap_or("ctx");

    let pairs: Vec<(String, String)> = request_fields(m)
        .map(|p| (field_name(p), p.name.clone()))
        .collect();
    let build = if pairs.is_empty() {
        Stmt::line(format!("request := {request}{{}}"))
    } else {
        Stmt::wrapped(
            format!("request := {request}{{"),
            vec![Stmt::KeyValues(pairs)],
            "}",
        )
    };
    let unpacked: Vec<String> = m
        .results
        .iter()
        .map(|r| format!("response.({response}).{}", field_name(r)))
        .collect();

    let func = Func::new(m.name.as_str())
        .doc(format!("{} implements Service. Primarily useful in a client.", m.name))
        .receiver(recv.as_str(), "Endpoints")
        .params(&params)
        .named_results(&results)
        .body(vec![
            build,
            Stmt::line(format!(
                "response, err := {recv}.{}({ctx}, request)",
                endpoint_field(m)
            )),
            Stmt::block("if err != nil", vec![Stmt::line("return")]),
            Stmt::line(format!("return {}", unpacked.join(", "))),
        ]);
    Fragment::new(func).import("context").imports(imports)
}
