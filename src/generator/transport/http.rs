use tracing::debug;

use super::{handled_methods, GENERATED_NOTICE};
use crate::emit::{Decl, Func, Stmt, StructDecl};
use crate::generator::contract::ServiceContract;
use crate::generator::Workspace;
use crate::imports::{Import, ImportSet};
use crate::merge::Fragment;
use crate::naming;
use crate::parser::{Method, NamedTypeValue};

pub(crate) const KIT_HTTP: &str = "github.com/go-kit/kit/transport/http";
const GORILLA_MUX: &str = "github.com/gorilla/mux";

pub(super) fn generate(
    ws: &Workspace<'_>,
    contract: &ServiceContract,
    gorilla: bool,
) -> anyhow::Result<()> {
    let endpoint = Import::new(ws.config.import_path(&ws.config.endpoint_path_format, &contract.name));
    let handler = ws.config.http_file(&contract.name);
    ws.merge(&handler, handler_fragments(contract, &endpoint, gorilla))?;

    let src = ws.fs.read_file(&handler)?;
    let methods = handled_methods(&handler, &src)?;
    debug!(service = %contract.name, handlers = methods.len(), "wiring http handlers");

    let mut imports = ImportSet::new();
    imports.insert(Import::new("net/http"));
    imports.insert(Import::aliased("kithttp", KIT_HTTP));
    imports.insert(endpoint);
    if gorilla {
        imports.insert(Import::new(GORILLA_MUX));
    }
    ws.write_decls(
        &ws.config.http_gen_file(&contract.name),
        Some(GENERATED_NOTICE),
        &imports,
        &[Decl::from(new_http_handler(&methods, gorilla))],
        true,
    )?;
    Ok(())
}

/// Handler constructors, codecs and the shared error helpers for `handler.go`
pub fn handler_fragments(
    contract: &ServiceContract,
    endpoint: &Import,
    gorilla: bool,
) -> Vec<Fragment> {
    let mut out = Vec::new();
    for m in &contract.methods {
        out.push(make_handler(m, endpoint, gorilla));
        out.push(decode_request(m, endpoint));
        out.push(encode_response(m, endpoint));
    }
    if contract.any_returns_error() {
        out.extend(error_helpers());
    }
    out
}

fn make_handler(m: &Method, endpoint: &Import, gorilla: bool) -> Fragment {
    let name = format!("make{}Handler", m.name);
    let server = format!(
        "kithttp.NewServer(endpoints.{0}Endpoint, decode{0}Request, encode{0}Response, options...)",
        m.name
    );
    let route = naming::url_path(&m.name);
    let (mux, stmt) = if gorilla {
        (
            "*mux.Router",
            format!("m.Methods(\"POST\").Path(\"{route}\").Handler({server})"),
        )
    } else {
        ("*http.ServeMux", format!("m.Handle(\"{route}\", {server})"))
    };
    let func = Func::new(name.as_str())
        .doc(format!("{name} creates the handler logic"))
        .param("m", mux)
        .param("endpoints", "endpoint.Endpoints")
        .param("options", "[]kithttp.ServerOption")
        .body(vec![Stmt::line(stmt)]);
    let fragment = Fragment::new(func)
        .aliased_import("kithttp", KIT_HTTP)
        .imports([endpoint.clone()]);
    if gorilla {
        fragment.import(GORILLA_MUX)
    } else {
        fragment.import("net/http")
    }
}

fn decode_request(m: &Method, endpoint: &Import) -> Fragment {
    let name = format!("decode{}Request", m.name);
    let func = Func::new(name.as_str())
        .doc(format!("{name} is a transport/http.DecodeRequestFunc that decodes a"))
        .doc("JSON-encoded request from the HTTP request body.")
        .param("_", "context.Context")
        .param("r", "*http.Request")
        .result("interface{}")
        .result("error")
        .body(vec![
            Stmt::line(format!("req := endpoint.{}Request{{}}", m.name)),
            Stmt::line("err := json.NewDecoder(r.Body).Decode(&req)"),
            Stmt::line("return req, err"),
        ]);
    Fragment::new(func)
        .import("context")
        .import("encoding/json")
        .import("net/http")
        .imports([endpoint.clone()])
}

fn encode_response(m: &Method, endpoint: &Import) -> Fragment {
    let name = format!("encode{}Response", m.name);
    let mut body = Vec::new();
    if m.returns_error() {
        body.push(Stmt::block(
            "if f, ok := response.(endpoint.Failure); ok && f.Failed() != nil",
            vec![
                Stmt::line("ErrorEncoder(ctx, f.Failed(), w)"),
                Stmt::line("return nil"),
            ],
        ));
    }
    body.push(Stmt::line(
        "w.Header().Set(\"Content-Type\", \"application/json; charset=utf-8\")",
    ));
    body.push(Stmt::line("err = json.NewEncoder(w).Encode(response)"));
    body.push(Stmt::line("return"));

    let func = Func::new(name.as_str())
        .doc(format!("{name} is a transport/http.EncodeResponseFunc that encodes"))
        .doc("the response as JSON to the response writer")
        .param("ctx", "context.Context")
        .param("w", "http.ResponseWriter")
        .param("response", "interface{}")
        .named_results(&[NamedTypeValue::new("err", "error")])
        .body(body);
    let fragment = Fragment::new(func)
        .import("context")
        .import("encoding/json")
        .import("net/http");
    if m.returns_error() {
        fragment.imports([endpoint.clone()])
    } else {
        fragment
    }
}

fn error_helpers() -> Vec<Fragment> {
    vec![
        Fragment::new(
            Func::new("ErrorEncoder")
                .param("_", "context.Context")
                .param("err", "error")
                .param("w", "http.ResponseWriter")
                .body(vec![
                    Stmt::line("w.WriteHeader(err2code(err))"),
                    Stmt::line("json.NewEncoder(w).Encode(errorWrapper{Error: err.Error()})"),
                ]),
        )
        .import("context")
        .import("encoding/json")
        .import("net/http"),
        Fragment::new(
            Func::new("ErrorDecoder")
                .param("r", "*http.Response")
                .result("error")
                .body(vec![
                    Stmt::line("var w errorWrapper"),
                    Stmt::block(
                        "if err := json.NewDecoder(r.Body).Decode(&w); err != nil",
                        vec![Stmt::line("return err")],
                    ),
                    Stmt::line("return errors.New(w.Error)"),
                ]),
        )
        .import("encoding/json")
        .import("errors")
        .import("net/http"),
        Fragment::new(
            Func::new("err2code")
                .doc("This is used to set the http status, see an example here :")
                .doc("https://github.com/go-kit/kit/blob/master/examples/addsvc/pkg/addtransport/http.go#L133")
                .param("err", "error")
                .result("int")
                .body(vec![Stmt::line("return http.StatusInternalServerError")]),
        )
        .import("net/http"),
        Fragment::new(StructDecl::new("errorWrapper").tagged("Error", "string", "json:\"error\"")),
    ]
}

/// `NewHTTPHandler` wiring every handler listed in `methods`
fn new_http_handler(methods: &[String], gorilla: bool) -> Func {
    let mut body = vec![Stmt::line(if gorilla {
        "m := mux.NewRouter()"
    } else {
        "m := http.NewServeMux()"
    })];
    for m in methods {
        body.push(Stmt::line(format!(
            "make{m}Handler(m, endpoints, options[\"{m}\"])"
        )));
    }
    body.push(Stmt::line("return m"));
    Func::new("NewHTTPHandler")
        .doc("NewHTTPHandler returns a handler that makes a set of endpoints available on")
        .doc("predefined paths.")
        .param("endpoints", "endpoint.Endpoints")
        .param("options", "map[string][]kithttp.ServerOption")
        .result("http.Handler")
        .body(body)
}
