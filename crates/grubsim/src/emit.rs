use itertools::Itertools;

use crate::error::CompileError;
use crate::gate::GateKind;
use crate::module::{Bit, Gate, Module, StateSlot, TraceSignal};
use crate::target::Dialect;

/// Runtime variable holding a wire bit.
pub fn wire_var(module: &str, bit: Bit) -> String {
    format!("{module}_{bit}")
}

/// Runtime variable holding a flip-flop's private state.
pub fn state_var(module: &str, slot: StateSlot) -> String {
    format!("{module}_state_{slot}")
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Invert the clock bit at the end of every loop iteration.
    pub cycle_clock: bool,
    /// Signals to print, in order. `None` prints every visible signal in
    /// declaration order.
    pub trace_selection: Option<Vec<String>>,
    pub blank_line_before_trace: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            cycle_clock: true,
            trace_selection: None,
            blank_line_before_trace: false,
        }
    }
}

/// Renders a [`Module`] into a self-running simulator script.
pub struct Emitter<'a> {
    dialect: &'a dyn Dialect,
    options: &'a EmitOptions,
}

impl<'a> Emitter<'a> {
    pub fn new(dialect: &'a dyn Dialect, options: &'a EmitOptions) -> Self {
        Self { dialect, options }
    }

    pub fn emit(&self, module: &Module) -> Result<String, CompileError> {
        // Everything that can fail is resolved before any text is produced.
        let calls = module
            .gates()
            .iter()
            .map(|gate| self.gate_call(module, gate))
            .collect::<Result<Vec<_>, _>>()?;
        let traces = self.trace_signals(module)?;
        let toggle = match module.clock() {
            Some(clock) if self.options.cycle_clock => Some(self.clock_toggle(module, clock)?),
            _ => None,
        };

        let d = self.dialect;
        let name = module.name();
        let step = format!("step_{name}");
        let mut out = vec![d.preamble().to_string()];

        out.push(d.comment("Initializing wires"));
        if !module.constants().is_empty() {
            out.push(d.comment("constants"));
            for &(bit, value) in module.constants() {
                out.push(d.assign(&wire_var(name, bit), value));
            }
        }
        for wire in module.wires() {
            out.push(d.comment(&wire.name));
            for &(bit, value) in &wire.bindings {
                out.push(d.assign(&wire_var(name, bit), value));
            }
        }
        if !module.unnamed_wires().is_empty() {
            out.push(d.comment("unnamed wires"));
            for &bit in module.unnamed_wires() {
                out.push(d.assign(&wire_var(name, bit), 0));
            }
        }

        out.push(d.comment("flip flop states"));
        for slot in module.states() {
            out.push(d.assign(&state_var(name, slot), 0));
        }

        out.push(d.define(&step, &calls));
        // Settle the circuit from its initial values before the first cycle.
        out.push(d.call(&step, &[]));

        let traced = traces.len();
        let mut body = vec![d.call(&step, &[])];
        if self.options.blank_line_before_trace {
            body.push(d.blank_line());
        }
        for trace in traces {
            let line = std::iter::once(format!("{}:", trace.name))
                .chain(trace.bits.iter().map(|&bit| d.value_of(&wire_var(name, bit))))
                .join(" ");
            body.push(d.print(&line));
        }
        body.extend(toggle);
        body.push(d.delay());
        out.push(d.forever(&body));

        log::debug!(
            "emitted `{}` for {}: {} calls, {} traced signals",
            step,
            d.name(),
            calls.len(),
            traced
        );

        let mut script = out.join("\n");
        script.push('\n');
        Ok(script)
    }

    fn gate_call(&self, module: &Module, gate: &Gate) -> Result<String, CompileError> {
        let d = self.dialect;
        let name = module.name();
        let primitive = d
            .primitive(gate.kind)
            .ok_or_else(|| CompileError::UnsupportedTarget {
                module: name.to_string(),
                cell: gate.cell.clone(),
                kind: gate.kind.label().to_string(),
                target: d.name(),
            })?;

        let args: Vec<String> = gate
            .inputs
            .iter()
            .map(|&bit| d.value_of(&wire_var(name, bit)))
            .chain(gate.state.map(|slot| state_var(name, slot)))
            .chain(gate.outputs.iter().map(|&bit| wire_var(name, bit)))
            .collect();
        Ok(d.call(primitive, &args))
    }

    fn trace_signals<'m>(&self, module: &'m Module) -> Result<Vec<&'m TraceSignal>, CompileError> {
        match &self.options.trace_selection {
            None => Ok(module.traces().iter().collect()),
            Some(selection) => selection
                .iter()
                .map(|signal| {
                    module
                        .trace(signal)
                        .ok_or_else(|| CompileError::UnknownTraceSignal {
                            module: module.name().to_string(),
                            signal: signal.clone(),
                        })
                })
                .collect(),
        }
    }

    /// Inverts the clock in place with the runtime's NOT primitive.
    fn clock_toggle(&self, module: &Module, clock: Bit) -> Result<String, CompileError> {
        let d = self.dialect;
        let not = d
            .primitive(GateKind::Not)
            .ok_or_else(|| CompileError::UnsupportedTarget {
                module: module.name().to_string(),
                cell: "clk".to_string(),
                kind: GateKind::Not.label().to_string(),
                target: d.name(),
            })?;
        let var = wire_var(module.name(), clock);
        Ok(d.call(not, &[d.value_of(&var), var]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModuleBuilder;
    use crate::netlist::Netlist;
    use crate::target::Grub;
    use insta::assert_snapshot;

    fn build(json: &str) -> Module {
        let netlist = Netlist::from_json(json).unwrap();
        let (name, source) = netlist.modules.first().unwrap();
        ModuleBuilder::new(name, source).build().unwrap()
    }

    fn grub() -> Grub {
        Grub::with_preamble("# primitives")
    }

    const TOGGLE: &str = r#"{"modules": {"counter": {
        "cells": {"inv": {"type": "NOT", "connections": {"A": [5], "Y": [5]}}},
        "netnames": {"clk": {"hide_name": 0, "bits": [5]}}
    }}}"#;

    #[test]
    fn free_running_toggle_without_clock_cycling() {
        let module = build(TOGGLE);
        let options = EmitOptions {
            cycle_clock: false,
            ..Default::default()
        };
        let dialect = grub();
        let script = Emitter::new(&dialect, &options).emit(&module).unwrap();
        assert_snapshot!(script, @r###"
# primitives
# Initializing wires
# clk
set counter_5=0
# flip flop states
function step_counter {
    NOT $counter_5 counter_5
}
step_counter
while [ 1 = 1 ] ; do
    step_counter
    echo clk: $counter_5
    sleep 1
done
"###);
    }

    #[test]
    fn clock_cycling_and_blank_line() {
        let module = build(TOGGLE);
        let options = EmitOptions {
            cycle_clock: true,
            trace_selection: None,
            blank_line_before_trace: true,
        };
        let dialect = grub();
        let script = Emitter::new(&dialect, &options).emit(&module).unwrap();
        assert!(script.ends_with(
            "    step_counter\n    echo\n    echo clk: $counter_5\n    NOT $counter_5 counter_5\n    sleep 1\ndone\n"
        ));
    }

    #[test]
    fn flip_flop_register() {
        let module = build(
            r#"{"modules": {"reg": {
                "cells": {
                    "inv": {"type": "NOT", "connections": {"A": [3], "Y": [4]}},
                    "ff": {"type": "DFF", "connections": {"CLK": [2], "D": [4], "IQ": [3]}}
                },
                "netnames": {
                    "clk": {"hide_name": 0, "bits": [2]},
                    "q": {"hide_name": 0, "bits": [3], "init": [1]},
                    "$n": {"hide_name": 1, "bits": [4]}
                }
            }}}"#,
        );
        let dialect = grub();
        let options = EmitOptions::default();
        let script = Emitter::new(&dialect, &options).emit(&module).unwrap();
        assert_snapshot!(script, @r###"
# primitives
# Initializing wires
# clk
set reg_2=0
# q
set reg_3=1
# $n
set reg_4=0
# flip flop states
set reg_state_1=0
function step_reg {
    NOT $reg_3 reg_4
    DFF $reg_2 $reg_4 reg_state_1 reg_3
}
step_reg
while [ 1 = 1 ] ; do
    step_reg
    echo clk: $reg_2
    echo q: $reg_3
    NOT $reg_2 reg_2
    sleep 1
done
"###);
    }

    #[test]
    fn trace_selection_orders_output() {
        let module = build(
            r#"{"modules": {"top": {"netnames": {
                "a": {"hide_name": 0, "bits": [2]},
                "b": {"hide_name": 0, "bits": [3, 4]},
                "c": {"hide_name": 0, "bits": [5]}
            }}}}"#,
        );
        let dialect = grub();
        let options = EmitOptions {
            trace_selection: Some(vec!["c".into(), "b".into()]),
            ..Default::default()
        };
        let script = Emitter::new(&dialect, &options).emit(&module).unwrap();
        let echoes: Vec<_> = script
            .lines()
            .filter(|l| l.trim_start().starts_with("echo"))
            .map(str::trim)
            .collect();
        assert_eq!(echoes, ["echo c: $top_5", "echo b: $top_3 $top_4"]);
    }

    #[test]
    fn unknown_or_hidden_trace_selection_fails() {
        let module = build(
            r#"{"modules": {"top": {"netnames": {
                "a": {"hide_name": 0, "bits": [2]},
                "h": {"hide_name": 1, "bits": [3]}
            }}}}"#,
        );
        let dialect = grub();
        for missing in ["h", "nope"] {
            let options = EmitOptions {
                trace_selection: Some(vec!["a".into(), missing.into()]),
                ..Default::default()
            };
            let err = Emitter::new(&dialect, &options).emit(&module).unwrap_err();
            assert!(
                matches!(&err, CompileError::UnknownTraceSignal { module, signal }
                    if module == "top" && signal == missing),
                "{err:?}"
            );
        }
    }

    /// A runtime that only knows how to buffer.
    struct BufOnly(Grub);

    impl Dialect for BufOnly {
        fn name(&self) -> &'static str {
            "buf-only"
        }
        fn preamble(&self) -> &str {
            self.0.preamble()
        }
        fn primitive(&self, kind: GateKind) -> Option<&'static str> {
            (kind == GateKind::Buf).then_some("BUF")
        }
        fn comment(&self, text: &str) -> String {
            self.0.comment(text)
        }
        fn assign(&self, var: &str, value: u8) -> String {
            self.0.assign(var, value)
        }
        fn value_of(&self, var: &str) -> String {
            self.0.value_of(var)
        }
        fn call(&self, routine: &str, args: &[String]) -> String {
            self.0.call(routine, args)
        }
        fn define(&self, routine: &str, body: &[String]) -> String {
            self.0.define(routine, body)
        }
        fn print(&self, text: &str) -> String {
            self.0.print(text)
        }
        fn blank_line(&self) -> String {
            self.0.blank_line()
        }
        fn forever(&self, body: &[String]) -> String {
            self.0.forever(body)
        }
        fn delay(&self) -> String {
            self.0.delay()
        }
    }

    #[test]
    fn unsupported_primitive_is_rejected() {
        let module = build(
            r#"{"modules": {"top": {"cells": {
                "b0": {"type": "BUF", "connections": {"A": [2], "Y": [3]}},
                "o0": {"type": "OR2", "connections": {"A": [2], "B": [3], "Y": [4]}}
            }}}}"#,
        );
        let dialect = BufOnly(grub());
        let options = EmitOptions::default();
        let err = Emitter::new(&dialect, &options).emit(&module).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Target `buf-only` has no primitive for `OR2` (cell `o0` in module `top`)"
        );
    }

    #[test]
    fn constants_and_unnamed_wires_are_initialized() {
        let module = build(
            r#"{"modules": {"top": {
                "cells": {"a0": {"type": "AND2", "connections": {"A": [2], "B": ["1"], "Y": [9]}}},
                "netnames": {"a": {"hide_name": 0, "bits": [2]}}
            }}}"#,
        );
        let dialect = grub();
        let options = EmitOptions::default();
        let script = Emitter::new(&dialect, &options).emit(&module).unwrap();
        assert!(script.contains(
            "# Initializing wires\n# constants\nset top_1=1\n# a\nset top_2=0\n# unnamed wires\nset top_9=0\n"
        ));
        assert!(script.contains("    AND $top_2 $top_1 top_9\n"));
    }
}
