#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use kitgen::config::Config;
use kitgen::fs::MemFs;
use kitgen::generator::{
    DockerCompose, DockerGenerator, Generate, MiddlewareGenerator, ServiceGenerator,
    TransportGenerator, Workspace,
};

const SERVICE: &str = "package service

import (
\t\"context\"

\t\"github.com/me/proj/orders/pkg/model\"
)

// OrdersService describes the service.
type OrdersService interface {
\tPlace(ctx context.Context, items []model.Item, note string) (id string, err error)
\tCancel(ctx context.Context, id string) (err error)
}
";

fn config() -> Config {
    Config {
        module: Some("github.com/me/proj".into()),
        ..Config::default()
    }
    .finalize(Path::new("/work"), None)
}

fn seeded() -> MemFs {
    let fs = MemFs::new();
    fs.insert("orders/pkg/service/service.go", SERVICE);
    fs
}

fn transport(methods: &[&str], gorilla: bool) -> TransportGenerator {
    TransportGenerator {
        name: "orders".into(),
        transport: "http".into(),
        methods: methods.iter().map(|m| m.to_string()).collect(),
        gorilla,
    }
}

#[test]
fn test_foreign_types_are_imported_in_every_layer() {
    let cfg = config();
    let fs = seeded();
    let ws = Workspace::new(&cfg, &fs);
    ServiceGenerator {
        name: "orders".into(),
        transport: "http".into(),
        methods: vec![],
        service_middleware: true,
        endpoint_middleware: false,
        gorilla: false,
    }
    .generate(&ws)
    .unwrap();

    let svc = fs.get("orders/pkg/service/service.go").unwrap();
    assert!(svc.contains("Place(ctx context.Context, items []model.Item, note string) (id string, err error) {"));

    let ep = fs.get("orders/pkg/endpoint/endpoint.go").unwrap();
    assert!(ep.contains("\"github.com/me/proj/orders/pkg/model\""));
    assert!(ep.contains("Items []model.Item"));
    assert!(ep.contains("s.Place(ctx, req.Items, req.Note)"));

    let mw = fs.get("orders/pkg/service/middleware.go").unwrap();
    assert!(mw.contains("\"github.com/me/proj/orders/pkg/model\""));
    assert!(mw.contains("\"github.com/go-kit/kit/log\""));
}

#[test]
fn test_conflicting_import_alias_is_renumbered() {
    let cfg = config();
    let fs = seeded();
    fs.insert(
        "orders/pkg/service/middleware.go",
        "package service

import log \"github.com/sirupsen/logrus\"

func audit(msg string) {
\tlog.Info(msg)
}
",
    );
    let ws = Workspace::new(&cfg, &fs);
    let gen = ServiceGenerator {
        name: "orders".into(),
        transport: "http".into(),
        methods: vec![],
        service_middleware: true,
        endpoint_middleware: false,
        gorilla: false,
    };
    gen.generate(&ws).unwrap();

    let mw = fs.get("orders/pkg/service/middleware.go").unwrap();
    assert!(mw.contains("log \"github.com/sirupsen/logrus\""));
    assert!(mw.contains("log1 \"github.com/go-kit/kit/log\""));
    assert!(mw.contains("\tlog.Info(msg)"));
    assert!(mw.contains("func LoggingMiddleware(logger log1.Logger) Middleware {"));

    gen.generate(&ws).unwrap();
    assert_eq!(fs.get("orders/pkg/service/middleware.go").unwrap(), mw);
}

#[test]
fn test_transport_grows_with_the_method_list() {
    let cfg = config();
    let fs = seeded();
    let ws = Workspace::new(&cfg, &fs);

    transport(&["Cancel"], false).generate(&ws).unwrap();
    let handler = fs.get("orders/pkg/http/handler.go").unwrap();
    assert!(handler.contains("func makeCancelHandler("));
    assert!(!handler.contains("func makePlaceHandler("));
    let gen = fs.get("orders/pkg/http/handler_gen.go").unwrap();
    assert!(gen.contains("makeCancelHandler(m, endpoints, options[\"Cancel\"])"));
    assert!(!gen.contains("makePlaceHandler"));

    transport(&[], false).generate(&ws).unwrap();
    let handler = fs.get("orders/pkg/http/handler.go").unwrap();
    assert_eq!(handler.matches("func makeCancelHandler(").count(), 1);
    assert!(handler.contains("func makePlaceHandler("));
    let gen = fs.get("orders/pkg/http/handler_gen.go").unwrap();
    assert!(gen.contains("makeCancelHandler(m, endpoints, options[\"Cancel\"])"));
    assert!(gen.contains("makePlaceHandler(m, endpoints, options[\"Place\"])"));
}

#[test]
fn test_gorilla_routing() {
    let cfg = config();
    let fs = seeded();
    let ws = Workspace::new(&cfg, &fs);
    transport(&[], true).generate(&ws).unwrap();

    let handler = fs.get("orders/pkg/http/handler.go").unwrap();
    assert!(handler.contains("\"github.com/gorilla/mux\""));
    assert!(handler.contains("func makePlaceHandler(m *mux.Router,"));
    assert!(handler.contains("m.Methods(\"POST\").Path(\"/place\")"));
    let gen = fs.get("orders/pkg/http/handler_gen.go").unwrap();
    assert!(gen.contains("m := mux.NewRouter()"));
}

#[test]
fn test_endpoint_middleware_requires_known_service() {
    let cfg = config();
    let fs = MemFs::new();
    let ws = Workspace::new(&cfg, &fs);
    let err = MiddlewareGenerator {
        name: "auth".into(),
        service: "orders".into(),
        endpoint: true,
    }
    .generate(&ws)
    .unwrap_err();
    assert!(err.to_string().contains("Service orders was not found"));
    assert!(fs.paths().is_empty());
}

#[test]
fn test_docker_compose_with_numeric_version() {
    let cfg = config();
    let fs = seeded();
    fs.insert("orders/pkg/http/handler.go", "package http\n");
    fs.insert("docker-compose.yml", "version: 3\nservices: {}\n");
    let ws = Workspace::new(&cfg, &fs);
    DockerGenerator { glide: true }.generate(&ws).unwrap();

    let dockerfile = fs.get("orders/Dockerfile").unwrap();
    assert!(dockerfile.contains("glide"));
    let compose: DockerCompose =
        serde_yaml::from_str(&fs.get("docker-compose.yml").unwrap()).unwrap();
    assert_eq!(compose.version, serde_yaml::Value::from(3));
    assert_eq!(compose.used_ports(), vec![8800]);
}
