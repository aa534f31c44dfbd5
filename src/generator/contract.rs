use anyhow::Context;
use tracing::debug;

use super::{GenerateError, Workspace};
use crate::filter::filter_methods;
use crate::imports::{Import, ImportSet};
use crate::naming;
use crate::parser::{self, File, Method, NamedTypeValue};

/// The service interface every synthesizer works from
///
/// Loaded from the service file, located by its `<Camel>Service` name and
/// narrowed by the method filter. The same contract is handed to every
/// synthesizer of one run so all artifacts agree on the method set.
#[derive(Debug, Clone)]
pub struct ServiceContract {
    /// Service name as given on the command line
    pub name: String,
    pub interface_name: String,
    /// Implementation struct, e.g. `basicFooService`
    pub struct_name: String,
    /// The parsed service file
    pub file: File,
    /// Methods that passed the filter, in declaration order
    pub methods: Vec<Method>,
    /// Import of the service package from sibling packages
    pub service_import: Import,
}

impl ServiceContract {
    /// Read, parse and filter the service file of `name`
    ///
    /// # Errors
    ///
    /// [`GenerateError::ServiceNotFound`] when the file is missing,
    /// [`GenerateError::Parse`] when it does not parse,
    /// [`GenerateError::InterfaceNotFound`] when no `<Camel>Service` interface is
    /// declared and [`GenerateError::NoMethods`] when the filter leaves nothing.
    pub fn load(ws: &Workspace<'_>, name: &str, allow: &[String]) -> anyhow::Result<Self> {
        let path = ws.config.service_file(name);
        if !ws.fs.exists(&path)? {
            return Err(GenerateError::ServiceNotFound(name.to_string()).into());
        }
        let src = ws
            .fs
            .read_file(&path)
            .with_context(|| format!("failed to read service file for `{name}`"))?;
        let file = parser::parse(&src).map_err(|source| GenerateError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        let interface_name = naming::interface_name(name);
        let interface = file
            .interface(&interface_name)
            .ok_or_else(|| GenerateError::InterfaceNotFound(name.to_string()))?;
        let methods: Vec<Method> = filter_methods(&interface.methods, allow)
            .into_iter()
            .map(name_blanks)
            .collect();
        if methods.is_empty() {
            return Err(GenerateError::NoMethods.into());
        }
        debug!(service = %name, methods = methods.len(), "loaded service contract");

        Ok(Self {
            name: name.to_string(),
            struct_name: naming::service_struct_name(name, &ws.config.service_struct_prefix),
            service_import: Import::new(
                ws.config.import_path(&ws.config.service_path_format, name),
            ),
            interface_name,
            file,
            methods,
        })
    }

    /// Every parameter and result of every method, for receiver-name sampling
    pub fn all_names(&self) -> Vec<NamedTypeValue> {
        self.methods
            .iter()
            .flat_map(|m| m.parameters.iter().chain(&m.results))
            .cloned()
            .collect()
    }

    /// Receiver name for methods on `owner` that clashes with no parameter
    pub fn receiver_name(&self, owner: &str) -> String {
        naming::generate_name_by_sample(owner, &self.all_names())
    }

    /// Imports a type needs inside the service package itself
    pub fn imports_for(&self, ty: &str) -> Vec<Import> {
        naming::qualifier_imports(ty, &self.file.imports)
    }

    /// A type as spelled from a sibling package, plus the imports it needs
    ///
    /// Types declared next to the interface get the `service.` qualifier.
    pub fn foreign_type(&self, ty: &str) -> (String, Vec<Import>) {
        let qualified = naming::qualify_local_types(ty, &self.service_import.name());
        let mut imports = self.imports_for(ty);
        if qualified != ty {
            imports.push(self.service_import.clone());
        }
        (qualified, imports)
    }

    /// Import set of every type the filtered methods reference
    pub fn method_imports(&self, foreign: bool) -> ImportSet {
        let mut set = ImportSet::new();
        for m in &self.methods {
            for p in m.parameters.iter().chain(&m.results) {
                let imports = if foreign {
                    self.foreign_type(&p.ty).1
                } else {
                    self.imports_for(&p.ty)
                };
                for import in imports {
                    set.insert(import);
                }
            }
        }
        set
    }

    pub fn any_returns_error(&self) -> bool {
        self.methods.iter().any(Method::returns_error)
    }
}

/// Give blank (`_`) parameters and results a usable name
///
/// The name is the one an anonymous value at the same position gets, with
/// `_` appended until it is unique within the signature.
fn name_blanks(mut method: Method) -> Method {
    let mut taken: Vec<String> = method
        .parameters
        .iter()
        .chain(&method.results)
        .map(|v| v.name.clone())
        .filter(|n| n != "_")
        .collect();
    for list in [&mut method.parameters, &mut method.results] {
        for (i, value) in list.iter_mut().enumerate() {
            if value.name != "_" {
                continue;
            }
            let mut name = parser::synthetic_name(&value.ty, i);
            while taken.contains(&name) {
                name.push('_');
            }
            taken.push(name.clone());
            value.name = name;
        }
    }
    method
}

/// Name of the `context.Context` parameter, if any
pub(crate) fn context_param(method: &Method) -> Option<&str> {
    method
        .parameters
        .iter()
        .find(|p| p.ty == "context.Context")
        .map(|p| p.name.as_str())
}

/// Call argument for a parameter, spreading variadics
pub(crate) fn call_arg(param: &NamedTypeValue, expr: &str) -> String {
    if param.ty.starts_with("...") {
        format!("{expr}...")
    } else {
        expr.to_string()
    }
}

/// Type usable as a struct field: variadics become slices
pub(crate) fn field_type(ty: &str) -> String {
    match ty.strip_prefix("...") {
        Some(elem) => format!("[]{elem}"),
        None => ty.to_string(),
    }
}
