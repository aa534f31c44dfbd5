use askama::Template;

/// `cmd/service/main.go`
#[derive(Template)]
#[template(path = "main.go.txt", escape = "none")]
pub struct MainGoTemplate {
    /// Rendered import block
    pub imports: String,
    /// Lower-snake service name
    pub name: String,
    /// Camel-case service name, as used by the generated gRPC registration
    pub camel: String,
    pub methods: Vec<String>,
    pub http: bool,
    pub grpc: bool,
    pub with_errors: bool,
    pub service_mdw: bool,
    pub endpoint_mdw: bool,
}

/// `pkg/db/db.go`
#[derive(Template)]
#[template(path = "db.go.txt", escape = "none")]
pub struct DbGoTemplate {
    pub package: String,
    pub name: String,
}

/// Skeleton `service.go` for `new service`
#[derive(Template)]
#[template(path = "service.go.txt", escape = "none")]
pub struct ServiceGoTemplate {
    pub package: String,
    pub interface_name: String,
}

/// Per-service `Dockerfile`
#[derive(Template)]
#[template(path = "Dockerfile.txt", escape = "none")]
pub struct DockerfileTemplate {
    /// `/go/src/<project>`
    pub project_path: String,
    pub project: String,
    pub service_dir: String,
}

/// Per-service `Dockerfile` for glide-managed projects
#[derive(Template)]
#[template(path = "Dockerfile.glide.txt", escape = "none")]
pub struct DockerfileGlideTemplate {
    pub project_path: String,
    pub project: String,
    pub service_dir: String,
}
