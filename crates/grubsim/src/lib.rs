//! Compiles gate-level netlists into simulator scripts for constrained
//! scripting runtimes such as the GRUB 2 shell.
//!
//! The pipeline is single pass: a [`Netlist`] module is turned into a
//! [`Module`] by the [`ModuleBuilder`], which the [`Emitter`] renders
//! through a [`Dialect`].

mod builder;
mod compile;
mod emit;
mod error;
mod gate;
mod module;
mod netlist;
mod target;

pub(crate) use fxhash::FxHashSet as HashSet;

pub use builder::ModuleBuilder;
pub use compile::{CompiledModule, compile_document, compile_module};
pub use emit::{EmitOptions, Emitter, state_var, wire_var};
pub use error::CompileError;
pub use gate::{GateKind, RoleShape};
pub use module::{Bit, Gate, Module, StateSlot, TraceSignal, WireGroup};
pub use netlist::{
    BitRef, CellDef, Defaults, InitValue, NetAttributes, Netlist, NetlistModule, NetnameDef,
};
pub use target::{Dialect, Grub, Target};
