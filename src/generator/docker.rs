//! Docker scaffolding
//!
//! Every top-level folder holding a service gets a `Dockerfile` and an entry
//! in the shared `docker-compose.yml`. Entries already present in the compose
//! file are kept untouched; new ones take the first free host ports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use askama::Template;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::templates::{DockerfileGlideTemplate, DockerfileTemplate};
use super::{Generate, Workspace};

pub const COMPOSE_FILE: &str = "docker-compose.yml";
const FIRST_HOST_PORT: u16 = 8800;
const HTTP_CONTAINER_PORT: u16 = 8081;
const GRPC_CONTAINER_PORT: u16 = 8082;

/// `docker-compose.yml`
///
/// Services are kept as raw YAML so entries written by hand survive a
/// round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerCompose {
    /// Kept as written; `version: 3` and `version: "3"` are both common
    pub version: serde_yaml::Value,
    #[serde(default)]
    pub services: BTreeMap<String, serde_yaml::Value>,
}

impl Default for DockerCompose {
    fn default() -> Self {
        Self {
            version: serde_yaml::Value::String("2".to_string()),
            services: BTreeMap::new(),
        }
    }
}

impl DockerCompose {
    /// Host ports published by any service
    pub fn used_ports(&self) -> Vec<u16> {
        self.services
            .values()
            .filter_map(|svc| svc.get("ports").and_then(serde_yaml::Value::as_sequence))
            .flatten()
            .filter_map(|p| match p {
                serde_yaml::Value::String(s) => s.split(':').next().and_then(|h| h.parse().ok()),
                serde_yaml::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildService {
    pub context: String,
    pub dockerfile: String,
}

/// One generated compose service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerService {
    pub build: BuildService,
    pub restart: String,
    pub volumes: Vec<String>,
    pub container_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}

/// `generate docker [--glide]`
#[derive(Debug, Clone, Default)]
pub struct DockerGenerator {
    pub glide: bool,
}

impl Generate for DockerGenerator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let compose_path = Path::new(COMPOSE_FILE);
        let mut compose = if ws.fs.exists(compose_path)? {
            let text = ws.fs.read_file(compose_path)?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("Failed to parse {COMPOSE_FILE}"))?
        } else {
            DockerCompose::default()
        };

        for dir in ws.fs.list_dirs(Path::new("."))? {
            if let Err(e) = self.generate_folder(ws, &dir, &mut compose) {
                error!("could not generate docker files for `{dir}`: {e:#}");
            }
        }

        let yaml = serde_yaml::to_string(&compose)
            .with_context(|| format!("Failed to serialize {COMPOSE_FILE}"))?;
        ws.write(compose_path, &yaml, true)?;
        Ok(())
    }
}

impl DockerGenerator {
    fn generate_folder(
        &self,
        ws: &Workspace<'_>,
        dir: &str,
        compose: &mut DockerCompose,
    ) -> anyhow::Result<()> {
        if !ws.fs.exists(&ws.config.service_file(dir))? {
            debug!(folder = %dir, "no service file, skipping");
            return Ok(());
        }
        let project = ws.config.project.clone();
        let project_path = format!("/go/src/{project}");

        let dockerfile = PathBuf::from(dir).join("Dockerfile");
        if !ws.fs.exists(&dockerfile)? {
            let rendered = (if self.glide {
                DockerfileGlideTemplate {
                    project_path: project_path.clone(),
                    project,
                    service_dir: dir.to_string(),
                }
                .render()
            } else {
                DockerfileTemplate {
                    project_path: project_path.clone(),
                    project,
                    service_dir: dir.to_string(),
                }
                .render()
            })
            .with_context(|| format!("failed to render Dockerfile for `{dir}`"))?;
            ws.write(&dockerfile, &rendered, true)?;
        }

        if compose.services.contains_key(dir) {
            debug!(folder = %dir, "compose entry already present");
            return Ok(());
        }
        let http = ws.fs.exists(&ws.config.http_file(dir))?;
        let grpc = ws.fs.exists(&ws.config.grpc_file(dir))?;
        let service = DockerService {
            build: BuildService {
                context: ".".to_string(),
                dockerfile: format!("{dir}/Dockerfile"),
            },
            restart: "always".to_string(),
            volumes: vec![format!(".:{project_path}")],
            container_name: dir.to_string(),
            ports: assign_ports(&compose.used_ports(), http, grpc),
        };
        compose
            .services
            .insert(dir.to_string(), serde_yaml::to_value(&service)?);
        Ok(())
    }
}

/// Host port mappings for a new service: HTTP first, then gRPC, each on the
/// lowest port from 8800 not yet taken
pub fn assign_ports(used: &[u16], http: bool, grpc: bool) -> Vec<String> {
    let mut taken = used.to_vec();
    let mut ports = Vec::new();
    for (wanted, container) in [(http, HTTP_CONTAINER_PORT), (grpc, GRPC_CONTAINER_PORT)] {
        if !wanted {
            continue;
        }
        let mut host = FIRST_HOST_PORT;
        while taken.contains(&host) {
            host += 1;
        }
        taken.push(host);
        ports.push(format!("{host}:{container}"));
    }
    ports
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_assign_ports_skips_used() {
        assert_eq!(assign_ports(&[], true, false), vec!["8800:8081"]);
        assert_eq!(
            assign_ports(&[8800, 8802], true, true),
            vec!["8801:8081", "8803:8082"]
        );
        assert_eq!(assign_ports(&[8800], false, true), vec!["8801:8082"]);
        assert!(assign_ports(&[], false, false).is_empty());
    }

    #[test]
    fn test_used_ports_reads_hand_written_entries() {
        let compose: DockerCompose = serde_yaml::from_str(
            "version: \"2\"\nservices:\n  db:\n    image: mysql\n    ports:\n      - \"3306:3306\"\n  web:\n    ports:\n      - 8800\n",
        )
        .unwrap();
        let mut ports = compose.used_ports();
        ports.sort_unstable();
        assert_eq!(ports, vec![3306, 8800]);
    }
}
