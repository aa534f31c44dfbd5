use tracing::warn;

use super::contract::ServiceContract;
use super::endpoint::{endpoint_field, KIT_ENDPOINT};
use super::transport::Transport;
use super::{Generate, Workspace};
use crate::emit::{Decl, Func, Stmt};
use crate::imports::{Import, ImportSet};
use crate::naming;
use crate::parser::NamedTypeValue;

const KIT_HTTP: &str = "github.com/go-kit/kit/transport/http";

/// `generate client <name> -t <transport>`
#[derive(Debug, Clone)]
pub struct ClientGenerator {
    pub name: String,
    pub transport: String,
}

impl Generate for ClientGenerator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let transport: Transport = self.transport.parse()?;
        let contract = ServiceContract::load(ws, &self.name, &[])?;
        if transport != Transport::Http {
            warn!("This transport type is not yet implemented");
            return Ok(());
        }
        let (imports, decls) = http_client(ws, &contract);
        ws.write_decls(
            &ws.config.http_client_file(&self.name),
            None,
            &imports,
            &decls,
            false,
        )?;
        Ok(())
    }
}

/// Import set and declarations of the HTTP client package
pub fn http_client(ws: &Workspace<'_>, contract: &ServiceContract) -> (ImportSet, Vec<Decl>) {
    let endpoint = Import::new(ws.config.import_path(&ws.config.endpoint_path_format, &contract.name));
    let transport = Import::aliased(
        "httptransport",
        ws.config.import_path(&ws.config.http_path_format, &contract.name),
    );
    let with_errors = contract.any_returns_error();

    let mut imports = ImportSet::new();
    for path in ["bytes", "context", "encoding/json", "io", "net/http", "net/url", "strings"] {
        imports.insert(Import::new(path));
    }
    imports.insert(Import::aliased("kitendpoint", KIT_ENDPOINT));
    imports.insert(Import::aliased("kithttp", KIT_HTTP));
    imports.insert(endpoint);
    imports.insert(contract.service_import.clone());
    if with_errors {
        imports.insert(transport);
    } else {
        imports.insert(Import::new("errors"));
    }

    let mut decls = vec![Decl::from(constructor(contract))];
    decls.push(Decl::from(
        Func::new("encodeHTTPGenericRequest")
            .doc("EncodeHTTPGenericRequest is a transport/http.EncodeRequestFunc that")
            .doc("JSON-encodes any request to the request body. Primarily useful in a client.")
            .param("_", "context.Context")
            .param("r", "*http.Request")
            .param("request", "interface{}")
            .result("error")
            .body(vec![
                Stmt::line("var buf bytes.Buffer"),
                Stmt::block(
                    "if err := json.NewEncoder(&buf).Encode(request); err != nil",
                    vec![Stmt::line("return err")],
                ),
                Stmt::line("r.Body = io.NopCloser(&buf)"),
                Stmt::line("return nil"),
            ]),
    ));
    for m in &contract.methods {
        let name = format!("decode{}Response", m.name);
        let failure = if with_errors {
            "return nil, httptransport.ErrorDecoder(r)"
        } else {
            "return nil, errors.New(r.Status)"
        };
        decls.push(Decl::from(
            Func::new(name.as_str())
                .doc(format!("{name} is a transport/http.DecodeResponseFunc that decodes"))
                .doc("a JSON-encoded response from the HTTP response body. If the response")
                .doc("has a non-200 status code, we will interpret that as an error and attempt to")
                .doc("decode the specific error message from the response body.")
                .param("_", "context.Context")
                .param("r", "*http.Response")
                .result("interface{}")
                .result("error")
                .body(vec![
                    Stmt::block("if r.StatusCode != http.StatusOK", vec![Stmt::line(failure)]),
                    Stmt::line(format!("var resp endpoint.{}Response", m.name)),
                    Stmt::line("err := json.NewDecoder(r.Body).Decode(&resp)"),
                    Stmt::line("return resp, err"),
                ]),
        ));
    }
    decls.push(Decl::from(
        Func::new("copyURL")
            .param("base", "*url.URL")
            .param("path", "string")
            .named_results(&[NamedTypeValue::new("next", "*url.URL")])
            .body(vec![
                Stmt::line("n := *base"),
                Stmt::line("n.Path = path"),
                Stmt::line("next = &n"),
                Stmt::line("return"),
            ]),
    ));
    (imports, decls)
}

fn constructor(contract: &ServiceContract) -> Func {
    let mut body = vec![
        Stmt::block(
            "if !strings.HasPrefix(instance, \"http\")",
            vec![Stmt::line("instance = \"http://\" + instance")],
        ),
        Stmt::line("u, err := url.Parse(instance)"),
        Stmt::block("if err != nil", vec![Stmt::line("return nil, err")]),
    ];
    let mut fields = Vec::new();
    for m in &contract.methods {
        let var = format!("{}Endpoint", naming::to_lower_first_camel_case(&m.name));
        body.push(Stmt::line(format!("var {var} kitendpoint.Endpoint")));
        body.push(Stmt::wrapped(
            "{",
            vec![Stmt::line(format!(
                "{var} = kithttp.NewClient(\"POST\", copyURL(u, \"{}\"), encodeHTTPGenericRequest, decode{}Response, options[\"{}\"]...).Endpoint()",
                naming::url_path(&m.name),
                m.name,
                m.name
            ))],
            "}",
        ));
        fields.push((endpoint_field(m), var));
    }
    body.push(Stmt::wrapped(
        "return endpoint.Endpoints{",
        vec![Stmt::KeyValues(fields)],
        "}, nil",
    ));

    Func::new("New")
        .doc(format!(
            "New returns a {} backed by an HTTP server living at the remote",
            contract.interface_name
        ))
        .doc("instance. We expect instance to come from a service discovery system, so")
        .doc("likely of the form \"host:port\".")
        .param("instance", "string")
        .param("options", "map[string][]kithttp.ClientOption")
        .result(format!(
            "{}.{}",
            contract.service_import.name(),
            contract.interface_name
        ))
        .result("error")
        .body(body)
}
