//! In-memory circuit model of one netlist module, as consumed by the
//! script emitter.

use std::fmt;

use crate::gate::GateKind;

/// A single wire strand, identified by its netlist bit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bit(pub u64);

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Private state of one stateful gate. The id is the owning gate's position
/// in the module's gate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateSlot(pub usize);

impl fmt::Display for StateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A gate instance with every role bound. `inputs` and `outputs` follow the
/// order of the kind's [`RoleShape`](crate::gate::RoleShape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub cell: String,
    pub kind: GateKind,
    pub inputs: Vec<Bit>,
    pub state: Option<StateSlot>,
    pub outputs: Vec<Bit>,
}

/// The resolved initial values of one named signal, in bit-vector order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireGroup {
    pub name: String,
    pub bindings: Vec<(Bit, u8)>,
}

/// A visible signal and the bits printed for it each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSignal {
    pub name: String,
    pub bits: Vec<Bit>,
}

/// One compiled module. Built once by [`ModuleBuilder`](crate::ModuleBuilder)
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub(crate) name: String,
    pub(crate) gates: Vec<Gate>,
    pub(crate) constants: Vec<(Bit, u8)>,
    pub(crate) wires: Vec<WireGroup>,
    pub(crate) unnamed: Vec<Bit>,
    pub(crate) traces: Vec<TraceSignal>,
    pub(crate) clock: Option<Bit>,
}

impl Module {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gates in evaluation order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Constant driver wires referenced by the netlist.
    pub fn constants(&self) -> &[(Bit, u8)] {
        &self.constants
    }

    /// Named signal initial values, in declaration order.
    pub fn wires(&self) -> &[WireGroup] {
        &self.wires
    }

    /// Gate bits not covered by any named signal; they start at 0.
    pub fn unnamed_wires(&self) -> &[Bit] {
        &self.unnamed
    }

    pub fn traces(&self) -> &[TraceSignal] {
        &self.traces
    }

    pub fn trace(&self, name: &str) -> Option<&TraceSignal> {
        self.traces.iter().find(|t| t.name == name)
    }

    pub fn clock(&self) -> Option<Bit> {
        self.clock
    }

    /// State slots in gate order.
    pub fn states(&self) -> impl Iterator<Item = StateSlot> + '_ {
        self.gates.iter().filter_map(|g| g.state)
    }
}
