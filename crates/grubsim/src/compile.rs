use crate::builder::ModuleBuilder;
use crate::emit::{EmitOptions, Emitter};
use crate::error::CompileError;
use crate::netlist::{Defaults, Netlist, NetlistModule};
use crate::target::Dialect;

/// The outcome of compiling one module of a document.
#[derive(Debug)]
pub struct CompiledModule {
    pub name: String,
    pub script: Result<String, CompileError>,
}

/// Build and emit a single module.
pub fn compile_module(
    name: &str,
    source: &NetlistModule,
    defaults: &Defaults,
    dialect: &dyn Dialect,
    options: &EmitOptions,
) -> Result<String, CompileError> {
    let module = ModuleBuilder::new(name, source).defaults(defaults).build()?;
    Emitter::new(dialect, options).emit(&module)
}

/// Compile every module of `netlist` in document order. Modules share no
/// names or state, so a failure is confined to its own entry.
pub fn compile_document(
    netlist: &Netlist,
    defaults: &Defaults,
    dialect: &dyn Dialect,
    options: &EmitOptions,
) -> Vec<CompiledModule> {
    netlist
        .modules
        .iter()
        .map(|(name, source)| CompiledModule {
            name: name.clone(),
            script: compile_module(name, source, defaults, dialect, options),
        })
        .collect()
}
