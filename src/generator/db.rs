use anyhow::Context;
use askama::Template;
use tracing::info;

use super::templates::DbGoTemplate;
use super::{package_name, Generate, Workspace};
use crate::naming;

/// `generate db <name>`: the shared database session helper
#[derive(Debug, Clone)]
pub struct DbGenerator {
    pub name: String,
}

impl Generate for DbGenerator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let path = ws.config.db_file(&self.name);
        if ws.fs.exists(&path)? {
            info!("{} already exists, skipping", path.display());
            return Ok(());
        }
        let rendered = DbGoTemplate {
            package: package_name(&path),
            name: naming::to_lower_snake_case(&self.name),
        }
        .render()
        .with_context(|| format!("failed to render db.go for `{}`", self.name))?;
        ws.write(&path, &rendered, true)?;
        Ok(())
    }
}
