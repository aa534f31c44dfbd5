use super::contract::ServiceContract;
use super::service::{delegate_call, signature_imports};
use super::{Generate, Workspace};
use crate::emit::{Decl, Func, Stmt, StructDecl};
use crate::merge::Fragment;
use crate::naming;
use crate::parser::NamedTypeValue;

const KIT_LOG: &str = "github.com/go-kit/kit/log";
const KIT_ENDPOINT: &str = "github.com/go-kit/kit/endpoint";
const KIT_METRICS: &str = "github.com/go-kit/kit/metrics";

/// Which default middleware a service run generates and wires into `main.go`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultMiddleware {
    pub service: bool,
    pub endpoint: bool,
}

/// `generate middleware <name> -s <service> [-e]`
#[derive(Debug, Clone)]
pub struct MiddlewareGenerator {
    pub name: String,
    pub service: String,
    /// Endpoint middleware instead of service middleware
    pub endpoint: bool,
}

impl Generate for MiddlewareGenerator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let contract = ServiceContract::load(ws, &self.service, &[])?;
        if self.endpoint {
            ws.merge(
                &ws.config.endpoint_middleware_file(&self.service),
                named_endpoint_middleware(&self.name),
            )?;
        } else {
            let mut fragments = service_fragments(&contract, false);
            fragments.extend(named_service_middleware(&contract, &self.name));
            ws.merge(&ws.config.service_middleware_file(&self.service), fragments)?;
        }
        Ok(())
    }
}

/// The `Middleware` type and, with `defaults`, the logging middleware
pub fn service_fragments(contract: &ServiceContract, defaults: bool) -> Vec<Fragment> {
    let iface = contract.interface_name.as_str();
    let mut fragments = vec![Fragment::new(Decl::FuncType {
        doc: vec!["Middleware describes a service middleware.".into()],
        name: "Middleware".into(),
        params: vec![NamedTypeValue::new("", iface)],
        results: vec![NamedTypeValue::new("", iface)],
    })];
    if !defaults {
        return fragments;
    }

    fragments.push(
        Fragment::new(
            StructDecl::new("loggingMiddleware")
                .field("logger", "log.Logger")
                .field("next", iface),
        )
        .import(KIT_LOG),
    );
    fragments.push(
        Fragment::new(
            Func::new("LoggingMiddleware")
                .doc("LoggingMiddleware takes a logger as a dependency")
                .doc(format!("and returns a {iface} Middleware."))
                .param("logger", "log.Logger")
                .result("Middleware")
                .body(vec![middleware_closure(
                    iface,
                    "&loggingMiddleware{logger, next}",
                )]),
        )
        .import(KIT_LOG),
    );
    fragments.extend(wrapper_methods(contract, "loggingMiddleware", true));
    fragments
}

/// A named pass-through service middleware
pub fn named_service_middleware(contract: &ServiceContract, name: &str) -> Vec<Fragment> {
    let iface = contract.interface_name.as_str();
    let strukt = format!("{}Middleware", naming::to_lower_first_camel_case(name));
    let ctor = format!("{}Middleware", naming::to_camel_case(name));

    let mut fragments = vec![
        Fragment::new(StructDecl::new(strukt.as_str()).field("next", iface)),
        Fragment::new(
            Func::new(ctor.as_str())
                .doc(format!("{ctor} returns a {iface} Middleware."))
                .result("Middleware")
                .body(vec![middleware_closure(iface, &format!("&{strukt}{{next}}"))]),
        ),
    ];
    fragments.extend(wrapper_methods(contract, &strukt, false));
    fragments
}

fn middleware_closure(iface: &str, value: &str) -> Stmt {
    Stmt::wrapped(
        format!("return func(next {iface}) {iface} {{"),
        vec![Stmt::line(format!("return {value}"))],
        "}",
    )
}

/// One method per service method on `strukt`, delegating to `next`
fn wrapper_methods(contract: &ServiceContract, strukt: &str, logging: bool) -> Vec<Fragment> {
    let recv = contract.receiver_name(strukt);
    contract
        .methods
        .iter()
        .map(|m| {
            let mut body = Vec::new();
            if logging {
                let mut fields = vec![format!("\"method\", \"{}\"", m.name)];
                for p in &m.parameters {
                    if p.ty != "context.Context" {
                        fields.push(format!("\"{0}\", {0}", p.name));
                    }
                }
                for r in &m.results {
                    fields.push(format!("\"{0}\", {0}", r.name));
                }
                body.push(Stmt::wrapped(
                    "defer func() {",
                    vec![Stmt::line(format!(
                        "{recv}.logger.Log({})",
                        fields.join(", ")
                    ))],
                    "}()",
                ));
            }
            body.push(Stmt::line(format!(
                "return {}",
                delegate_call(&format!("{recv}.next"), m)
            )));
            let func = Func::new(m.name.as_str())
                .receiver(recv.as_str(), strukt)
                .params(&m.parameters)
                .named_results(&m.results)
                .body(body);
            Fragment::new(func).imports(signature_imports(contract, m))
        })
        .collect()
}

/// `InstrumentingMiddleware` and `LoggingMiddleware` for endpoints
pub fn endpoint_defaults() -> Vec<Fragment> {
    let instrumenting = Func::new("InstrumentingMiddleware")
        .doc("InstrumentingMiddleware returns an endpoint middleware that records")
        .doc("the duration of each invocation to the passed histogram. The middleware adds")
        .doc("a single field: \"success\", which is \"true\" if no error is returned, and")
        .doc("\"false\" otherwise.")
        .param("duration", "metrics.Histogram")
        .result("endpoint.Middleware")
        .body(vec![endpoint_closure(vec![
            Stmt::wrapped(
                "defer func(begin time.Time) {",
                vec![Stmt::line(
                    "duration.With(\"success\", fmt.Sprint(err == nil)).Observe(time.Since(begin).Seconds())",
                )],
                "}(time.Now())",
            ),
            Stmt::line("return next(ctx, request)"),
        ])]);
    let logging = Func::new("LoggingMiddleware")
        .doc("LoggingMiddleware returns an endpoint middleware that logs the")
        .doc("duration of each invocation, and the resulting error, if any.")
        .param("logger", "log.Logger")
        .result("endpoint.Middleware")
        .body(vec![endpoint_closure(vec![
            Stmt::wrapped(
                "defer func(begin time.Time) {",
                vec![Stmt::line(
                    "logger.Log(\"transport_error\", err, \"took\", time.Since(begin))",
                )],
                "}(time.Now())",
            ),
            Stmt::line("return next(ctx, request)"),
        ])]);
    vec![
        Fragment::new(instrumenting)
            .import("context")
            .import("fmt")
            .import("time")
            .import(KIT_ENDPOINT)
            .import(KIT_METRICS),
        Fragment::new(logging)
            .import("context")
            .import("time")
            .import(KIT_ENDPOINT)
            .import(KIT_LOG),
    ]
}

/// A named endpoint middleware with an empty hook
pub fn named_endpoint_middleware(name: &str) -> Vec<Fragment> {
    let ctor = format!("{}Middleware", naming::to_camel_case(name));
    let func = Func::new(ctor.as_str())
        .doc(format!("{ctor} returns an endpoint middleware"))
        .result("endpoint.Middleware")
        .body(vec![endpoint_closure(vec![
            Stmt::comment("Add your middleware logic here"),
            Stmt::line("return next(ctx, request)"),
        ])]);
    vec![Fragment::new(func).import("context").import(KIT_ENDPOINT)]
}

fn endpoint_closure(inner: Vec<Stmt>) -> Stmt {
    Stmt::wrapped(
        "return func(next endpoint.Endpoint) endpoint.Endpoint {",
        vec![Stmt::wrapped(
            "return func(ctx context.Context, request interface{}) (response interface{}, err error) {",
            inner,
            "}",
        )],
        "}",
    )
}
