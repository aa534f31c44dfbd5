use anyhow::Context;
use askama::Template;

use super::contract::ServiceContract;
use super::endpoint::KIT_ENDPOINT;
use super::middleware::DefaultMiddleware;
use super::templates::MainGoTemplate;
use super::transport::Transport;
use super::Workspace;
use crate::imports::{Import, ImportSet};
use crate::merge::normalize;
use crate::naming;

const OPENTRACING: &str = "github.com/opentracing/opentracing-go";
const KIT_OPENTRACING: &str = "github.com/go-kit/kit/tracing/opentracing";
const APPDASH: &str = "sourcegraph.com/sourcegraph/appdash";
const APPDASH_OPENTRACING: &str = "sourcegraph.com/sourcegraph/appdash/opentracing";

/// Render and write the service command `main.go`
///
/// The file is written whole through the overwrite policy, so an existing
/// command is only replaced when forced or confirmed. The command picks an
/// Appdash tracer when `-appdash-addr` is set and the global tracer otherwise,
/// and every server option list extracts spans through it.
pub fn write_main(
    ws: &Workspace<'_>,
    contract: &ServiceContract,
    transport: Transport,
    defaults: DefaultMiddleware,
) -> anyhow::Result<()> {
    let http = transport == Transport::Http;
    let grpc = transport == Transport::Grpc;
    let name = contract.name.as_str();
    let config = ws.config;

    let mut imports = ImportSet::new();
    for path in ["flag", "fmt", "net", "os", "os/signal", "syscall"] {
        imports.insert(Import::new(path));
    }
    imports.insert(Import::aliased("nethttp", "net/http"));
    imports.insert(Import::new("github.com/go-kit/kit/log"));
    imports.insert(Import::aliased("kitendpoint", KIT_ENDPOINT));
    imports.insert(Import::new("github.com/oklog/oklog/pkg/group"));
    imports.insert(Import::new("github.com/prometheus/client_golang/prometheus/promhttp"));
    imports.insert(Import::aliased("stdopentracing", OPENTRACING));
    imports.insert(Import::new(APPDASH));
    imports.insert(Import::aliased("appdashot", APPDASH_OPENTRACING));
    if http || grpc {
        imports.insert(Import::new(KIT_OPENTRACING));
    }
    imports.insert(contract.service_import.clone());
    imports.insert(Import::new(config.import_path(&config.endpoint_path_format, name)));
    if defaults.endpoint {
        imports.insert(Import::aliased(
            "kitprometheus",
            "github.com/go-kit/kit/metrics/prometheus",
        ));
        imports.insert(Import::aliased(
            "stdprometheus",
            "github.com/prometheus/client_golang/prometheus",
        ));
    }
    if http {
        imports.insert(Import::aliased("kithttp", "github.com/go-kit/kit/transport/http"));
        imports.insert(Import::new(config.import_path(&config.http_path_format, name)));
    }
    if grpc {
        imports.insert(Import::aliased("kitgrpc", "github.com/go-kit/kit/transport/grpc"));
        imports.insert(Import::aliased("googlegrpc", "google.golang.org/grpc"));
        imports.insert(Import::new(config.import_path(&config.grpc_path_format, name)));
        imports.insert(Import::new(config.import_path(&config.grpc_pb_path_format, name)));
    }

    let rendered = MainGoTemplate {
        imports: imports.render_block(),
        name: naming::to_lower_snake_case(name),
        camel: naming::to_camel_case(name),
        methods: contract.methods.iter().map(|m| m.name.clone()).collect(),
        http,
        grpc,
        with_errors: contract.any_returns_error(),
        service_mdw: defaults.service,
        endpoint_mdw: defaults.endpoint,
    }
    .render()
    .with_context(|| format!("failed to render main.go for `{name}`"))?;

    ws.write(&config.cmd_file(name), &normalize(&rendered), false)?;
    Ok(())
}
