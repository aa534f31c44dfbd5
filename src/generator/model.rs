use tracing::info;

use super::{Generate, Workspace};
use crate::emit::{Decl, Func, Stmt, StructDecl};
use crate::imports::{Import, ImportSet};
use crate::naming;

/// `generate model <model> -s <service>`: a gorm model and its controller
#[derive(Debug, Clone)]
pub struct ModelGenerator {
    /// Owning service
    pub name: String,
    pub model: String,
}

impl Generate for ModelGenerator {
    fn generate(&self, ws: &Workspace<'_>) -> anyhow::Result<()> {
        let path = ws
            .config
            .model_dir(&self.name)
            .join(format!("{}.go", naming::to_lower_first_camel_case(&self.model)));
        if ws.fs.exists(&path)? {
            info!("{} already exists, skipping", path.display());
            return Ok(());
        }
        let db = Import::new(ws.config.import_path(&ws.config.db_path_format, &self.name));
        let mut imports = ImportSet::new();
        imports.insert(Import::new("fmt"));
        imports.insert(db.clone());
        ws.write_decls(&path, None, &imports, &model_decls(&self.model, &db.name()), true)?;
        Ok(())
    }
}

/// Model struct, controller struct and the four persistence methods
pub fn model_decls(model: &str, db: &str) -> Vec<Decl> {
    let ty = naming::to_upper_first(&naming::to_camel_case(model));
    let controller = format!("{ty}Controller");
    let field = naming::to_lower_first_camel_case(model);
    let recv: String = field.chars().take(1).collect();
    let recv_ty = format!("*{controller}");

    let op = |call: &str, failure: &str| -> Stmt {
        Stmt::block(
            format!("if err := {db}.Session().{call}.Error; err != nil"),
            vec![Stmt::line(format!("return fmt.Errorf(\"{failure}: %w\", err)"))],
        )
    };

    let mut decls = vec![
        Decl::from(StructDecl::new(ty.as_str()).embed(format!("{db}.BaseModel"))),
        Decl::from(StructDecl::new(controller.as_str()).field(field.as_str(), format!("*{ty}"))),
    ];
    decls.push(Decl::from(
        Func::new("Insert")
            .receiver(recv.as_str(), recv_ty.as_str())
            .result("error")
            .body(vec![
                op(&format!("Create({recv}.{field})"), &format!("could not create {ty}")),
                Stmt::line("return nil"),
            ]),
    ));
    decls.push(Decl::from(
        Func::new("GetById")
            .receiver(recv.as_str(), recv_ty.as_str())
            .param("id", "uint")
            .result("error")
            .body(vec![
                Stmt::block(
                    format!("if err := {db}.Session().First({recv}.{field}, id).Error; err != nil"),
                    vec![Stmt::line(format!(
                        "return fmt.Errorf(\"could not get {ty} with id %d: %w\", id, err)"
                    ))],
                ),
                Stmt::line("return nil"),
            ]),
    ));
    decls.push(Decl::from(
        Func::new("Save")
            .doc("THIS WILL CHANGE ALL COLUMNS BE CAREFUL")
            .receiver(recv.as_str(), recv_ty.as_str())
            .result("error")
            .body(vec![
                op(&format!("Save({recv}.{field})"), &format!("could not update {ty}")),
                Stmt::line("return nil"),
            ]),
    ));
    decls.push(Decl::from(
        Func::new("Delete")
            .receiver(recv.as_str(), recv_ty.as_str())
            .result("error")
            .body(vec![
                op(&format!("Delete({recv}.{field})"), &format!("could not delete {ty}")),
                Stmt::line("return nil"),
            ]),
    ));
    decls
}
