use std::collections::BTreeSet;

use crate::HashSet;
use crate::error::CompileError;
use crate::gate::GateKind;
use crate::module::{Bit, Gate, Module, StateSlot, TraceSignal, WireGroup};
use crate::netlist::{BitRef, CellDef, Defaults, NetlistModule, NetnameDef};

/// The signal whose first bit drives the clock toggle.
const CLOCK_SIGNAL: &str = "clk";

/// Builds a [`Module`] from one netlist module and an optional override
/// table.
///
/// ```
/// use grubsim::{Defaults, ModuleBuilder, Netlist};
///
/// let netlist = Netlist::from_json(r#"{"modules": {"top": {"netnames": {
///     "clk": {"hide_name": 0, "bits": [2]}
/// }}}}"#).unwrap();
/// let defaults = Defaults::empty();
/// let module = ModuleBuilder::new("top", &netlist.modules["top"])
///     .defaults(&defaults)
///     .build()
///     .unwrap();
/// assert_eq!(module.clock(), Some(grubsim::Bit(2)));
/// ```
pub struct ModuleBuilder<'a> {
    name: &'a str,
    source: &'a NetlistModule,
    defaults: Option<&'a Defaults>,
}

/// A resolved bit, remembering whether it came from a constant literal.
#[derive(Clone, Copy)]
struct Resolved {
    bit: Bit,
    constant: bool,
}

impl<'a> ModuleBuilder<'a> {
    pub fn new(name: &'a str, source: &'a NetlistModule) -> Self {
        Self {
            name,
            source,
            defaults: None,
        }
    }

    /// Apply a default-value override table. Overrides take precedence over
    /// the netlist's own `init` values.
    pub fn defaults(mut self, defaults: &'a Defaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn build(self) -> Result<Module, CompileError> {
        let mut constants = BTreeSet::new();

        let mut gates = Vec::with_capacity(self.source.cells.len());
        for (index, (cell, def)) in self.source.cells.iter().enumerate() {
            gates.push(self.bind_gate(index, cell, def, &mut constants)?);
        }

        let mut clock = None;
        let mut wires = Vec::with_capacity(self.source.netnames.len());
        let mut traces = Vec::new();
        let mut covered = HashSet::default();
        for (name, net) in &self.source.netnames {
            let bits = net
                .bits
                .iter()
                .map(|raw| {
                    self.resolve_bit(raw, &mut constants)
                        .map_err(|detail| CompileError::MalformedSignal {
                            module: self.name.to_string(),
                            signal: name.clone(),
                            detail,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if name == CLOCK_SIGNAL {
                // A clock tied to a constant is never toggled.
                clock = bits.first().filter(|r| !r.constant).map(|r| r.bit);
            }

            let values = self.initial_values(name, net, bits.len())?;
            let bindings = bits
                .iter()
                .zip(values)
                .filter(|(r, _)| !r.constant)
                .map(|(r, v)| (r.bit, v))
                .collect();
            covered.extend(bits.iter().filter(|r| !r.constant).map(|r| r.bit));
            wires.push(WireGroup {
                name: name.clone(),
                bindings,
            });

            if !net.is_hidden() {
                traces.push(TraceSignal {
                    name: name.clone(),
                    bits: bits.iter().map(|r| r.bit).collect(),
                });
            }
        }

        let constants: Vec<(Bit, u8)> = constants
            .into_iter()
            .map(|v| (Bit(u64::from(v)), v))
            .collect();
        covered.extend(constants.iter().map(|(bit, _)| *bit));

        let mut unnamed = Vec::new();
        for gate in &gates {
            for &bit in gate.inputs.iter().chain(&gate.outputs) {
                if covered.insert(bit) {
                    unnamed.push(bit);
                }
            }
        }

        let module = Module {
            name: self.name.to_string(),
            gates,
            constants,
            wires,
            unnamed,
            traces,
            clock,
        };
        log::debug!(
            "built module `{}`: {} gates, {} state slots, {} signals ({} traced), {} unnamed wires",
            module.name,
            module.gates.len(),
            module.states().count(),
            module.wires.len(),
            module.traces.len(),
            module.unnamed.len(),
        );
        Ok(module)
    }

    fn bind_gate(
        &self,
        index: usize,
        cell: &str,
        def: &CellDef,
        constants: &mut BTreeSet<u8>,
    ) -> Result<Gate, CompileError> {
        let kind =
            GateKind::from_label(&def.kind).ok_or_else(|| CompileError::UnsupportedGateKind {
                module: self.name.to_string(),
                cell: cell.to_string(),
                kind: def.kind.clone(),
            })?;
        let roles = kind.roles();

        let mut bind = |role: &str, driven: bool| -> Result<Bit, CompileError> {
            let malformed = |detail: String| CompileError::MalformedConnection {
                module: self.name.to_string(),
                cell: cell.to_string(),
                role: role.to_string(),
                detail,
            };
            let conn = def
                .connections
                .get(role)
                .ok_or_else(|| malformed("connection is missing".to_string()))?;
            match conn.as_slice() {
                // Constant wires are shared by every reader and must never be driven.
                [BitRef::Const(value)] if driven => {
                    Err(malformed(format!("output is tied to constant `{value}`")))
                }
                [raw] => self
                    .resolve_bit(raw, constants)
                    .map(|r| r.bit)
                    .map_err(malformed),
                other => Err(malformed(format!(
                    "expected exactly one bit, found {}",
                    other.len()
                ))),
            }
        };

        let inputs = roles
            .inputs
            .iter()
            .map(|&role| bind(role, false))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = roles
            .outputs
            .iter()
            .map(|&role| bind(role, true))
            .collect::<Result<Vec<_>, _>>()?;

        // Slots are numbered by gate position, not by a separate DFF count.
        let state = roles.state.map(|_| StateSlot(index));

        Ok(Gate {
            cell: cell.to_string(),
            kind,
            inputs,
            state,
            outputs,
        })
    }

    fn resolve_bit(&self, raw: &BitRef, constants: &mut BTreeSet<u8>) -> Result<Resolved, String> {
        let value = match raw {
            BitRef::Net(id) => {
                return Ok(Resolved {
                    bit: Bit(*id),
                    constant: false,
                });
            }
            BitRef::Const(s) => match s.as_str() {
                "0" => 0,
                "1" => 1,
                "x" | "z" => {
                    log::warn!(
                        "module `{}`: undefined constant `{}` tied to 0",
                        self.name,
                        s
                    );
                    0
                }
                other => return Err(format!("`{other}` is not a bit id or constant")),
            },
        };
        constants.insert(value);
        Ok(Resolved {
            bit: Bit(u64::from(value)),
            constant: true,
        })
    }

    /// Resolve a signal's initial vector: override, else netlist `init`,
    /// else zeros, padded with zeros to `width`. Never truncates.
    fn initial_values(
        &self,
        name: &str,
        net: &NetnameDef,
        width: usize,
    ) -> Result<Vec<u8>, CompileError> {
        let mut values = match self.defaults.and_then(|d| d.get(name)) {
            Some(values) => {
                let invalid = |detail: String| CompileError::InvalidDefaultOverride {
                    module: self.name.to_string(),
                    signal: name.to_string(),
                    detail,
                };
                if values.len() > width {
                    return Err(invalid(format!(
                        "{} values for a {}-bit signal",
                        values.len(),
                        width
                    )));
                }
                values
                    .iter()
                    .map(|&v| match v {
                        0 | 1 => Ok(v as u8),
                        other => Err(invalid(format!("value {other} is not 0 or 1"))),
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => match net.initial() {
                Some(resolved) => {
                    let invalid = |detail: String| CompileError::InvalidInitialValue {
                        module: self.name.to_string(),
                        signal: name.to_string(),
                        detail,
                    };
                    let values = resolved
                        .map_err(|bad| invalid(format!("value {bad} is not 0, 1, x or z")))?;
                    if values.len() > width {
                        return Err(invalid(format!(
                            "{} values for a {}-bit signal",
                            values.len(),
                            width
                        )));
                    }
                    values
                }
                None => Vec::new(),
            },
        };
        values.resize(width, 0);
        Ok(values)
    }
}
