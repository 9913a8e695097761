//! Runtime dialects the emitter can render into.
//!
//! A [`Dialect`] owns the statement grammar of one scripting runtime and the
//! table of primitives its preamble provides. The emitter decides *what* to
//! say; the dialect decides how it is spelled.

use std::borrow::Cow;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::CompileError;
use crate::gate::GateKind;

const INDENT: &str = "    ";

pub trait Dialect {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Primitive library text placed verbatim at the top of every script.
    fn preamble(&self) -> &str;

    /// The subroutine implementing `kind`, if this runtime has one.
    fn primitive(&self, kind: GateKind) -> Option<&'static str>;

    fn comment(&self, text: &str) -> String;

    fn assign(&self, var: &str, value: u8) -> String;

    /// A variable used as a value rather than as an assignment target.
    fn value_of(&self, var: &str) -> String;

    fn call(&self, routine: &str, args: &[String]) -> String;

    fn define(&self, routine: &str, body: &[String]) -> String;

    fn print(&self, text: &str) -> String;

    fn blank_line(&self) -> String;

    fn forever(&self, body: &[String]) -> String;

    fn delay(&self) -> String;
}

/// The GRUB 2 configuration script language.
#[derive(Debug, Clone)]
pub struct Grub {
    preamble: Cow<'static, str>,
}

impl Grub {
    pub const SETUP: &'static str = include_str!("../templates/setup.gcfg");

    /// A GRUB dialect using the bundled primitive library.
    pub fn new() -> Self {
        Self {
            preamble: Cow::Borrowed(Self::SETUP),
        }
    }

    pub fn with_preamble(preamble: impl Into<String>) -> Self {
        Self {
            preamble: Cow::Owned(preamble.into()),
        }
    }
}

impl Default for Grub {
    fn default() -> Self {
        Self::new()
    }
}

fn indented(body: &[String]) -> String {
    body.iter()
        .flat_map(|stmt| stmt.lines())
        .map(|line| format!("{INDENT}{line}"))
        .join("\n")
}

impl Dialect for Grub {
    fn name(&self) -> &'static str {
        "grub"
    }

    fn preamble(&self) -> &str {
        &self.preamble
    }

    fn primitive(&self, kind: GateKind) -> Option<&'static str> {
        Some(match kind {
            GateKind::Not => "NOT",
            GateKind::And2 => "AND",
            GateKind::Or2 => "OR",
            GateKind::Buf => "BUF",
            GateKind::Dff => "DFF",
        })
    }

    fn comment(&self, text: &str) -> String {
        format!("# {text}")
    }

    fn assign(&self, var: &str, value: u8) -> String {
        format!("set {var}={value}")
    }

    fn value_of(&self, var: &str) -> String {
        format!("${var}")
    }

    fn call(&self, routine: &str, args: &[String]) -> String {
        std::iter::once(routine).chain(args.iter().map(String::as_str)).join(" ")
    }

    fn define(&self, routine: &str, body: &[String]) -> String {
        // GRUB rejects an empty function body.
        let body = if body.is_empty() {
            format!("{INDENT}true")
        } else {
            indented(body)
        };
        format!("function {routine} {{\n{body}\n}}")
    }

    fn print(&self, text: &str) -> String {
        format!("echo {text}")
    }

    fn blank_line(&self) -> String {
        "echo".to_string()
    }

    fn forever(&self, body: &[String]) -> String {
        format!("while [ 1 = 1 ] ; do\n{}\ndone", indented(body))
    }

    fn delay(&self) -> String {
        "sleep 1".to_string()
    }
}

/// Runtimes selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Grub,
}

impl Target {
    /// Build the dialect for this target, replacing its bundled preamble
    /// when one is given.
    pub fn dialect(self, preamble: Option<String>) -> Box<dyn Dialect> {
        match self {
            Target::Grub => Box::new(preamble.map_or_else(Grub::new, Grub::with_preamble)),
        }
    }
}

impl FromStr for Target {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grub" => Ok(Target::Grub),
            other => Err(CompileError::UnknownTarget(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grub_statements() {
        let grub = Grub::new();
        assert_eq!(grub.assign("top_3", 1), "set top_3=1");
        assert_eq!(grub.value_of("top_3"), "$top_3");
        assert_eq!(grub.comment("clk"), "# clk");
        assert_eq!(
            grub.call("AND", &["$top_2".into(), "$top_3".into(), "top_4".into()]),
            "AND $top_2 $top_3 top_4"
        );
        assert_eq!(grub.call("step_top", &[]), "step_top");
        assert_eq!(grub.print("q: $top_4"), "echo q: $top_4");
        assert_eq!(grub.blank_line(), "echo");
        assert_eq!(grub.delay(), "sleep 1");
    }

    #[test]
    fn grub_blocks_are_indented() {
        let grub = Grub::new();
        assert_eq!(
            grub.define("step_top", &["NOT $top_2 top_3".into()]),
            "function step_top {\n    NOT $top_2 top_3\n}"
        );
        assert_eq!(grub.define("step_top", &[]), "function step_top {\n    true\n}");
        assert_eq!(
            grub.forever(&["step_top".into(), "sleep 1".into()]),
            "while [ 1 = 1 ] ; do\n    step_top\n    sleep 1\ndone"
        );
    }

    #[test]
    fn every_gate_kind_has_a_grub_primitive() {
        let grub = Grub::new();
        for kind in GateKind::ALL {
            assert!(grub.primitive(kind).is_some(), "{kind}");
        }
        assert_eq!(grub.primitive(GateKind::And2), Some("AND"));
        assert_eq!(grub.primitive(GateKind::Or2), Some("OR"));
    }

    #[test]
    fn bundled_preamble_defines_every_primitive() {
        let grub = Grub::new();
        for kind in GateKind::ALL {
            let name = grub.primitive(kind).unwrap();
            assert!(
                grub.preamble().contains(&format!("function {name} {{")),
                "missing {name}"
            );
        }
    }

    #[test]
    fn target_names() {
        assert_eq!("grub".parse::<Target>().unwrap(), Target::Grub);
        let err = "bash".parse::<Target>().unwrap_err();
        assert!(matches!(err, CompileError::UnknownTarget(ref t) if t == "bash"));
        let custom = Target::Grub.dialect(Some("# mine".into()));
        assert_eq!(custom.preamble(), "# mine");
        assert_eq!(custom.name(), "grub");
    }
}
