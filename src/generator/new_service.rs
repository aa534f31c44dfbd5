use anyhow::Context;
use askama::Template;

use super::templates::ServiceGoTemplate;
use super::{package_name, Generate, GenerateError, Workspace};
use crate::naming;

/// `new service <name>`: a `service.go` declaring an empty interface
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
}

impl Generate for NewService {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let path = ws.config.service_file(&self.name);
        if ws.fs.exists(&path)? {
            return Err(GenerateError::AlreadyExists(self.name.clone()).into());
        }
        let rendered = ServiceGoTemplate {
            package: package_name(&path),
            interface_name: naming::interface_name(&self.name),
        }
        .render()
        .with_context(|| format!("failed to render service.go for `{}`", self.name))?;
        ws.write(&path, &rendered, true)?;
        Ok(())
    }
}
