//! Serde model of the input documents: a Yosys-style JSON netlist and the
//! default-value override table.
//!
//! Every name-keyed table is an [`IndexMap`] so that document order survives
//! decoding. Cell order is the evaluation order of the generated simulator
//! and netname order is the declaration order of its trace output.

use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Netlist {
    #[serde(default)]
    pub modules: IndexMap<String, NetlistModule>,
}

impl Netlist {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetlistModule {
    #[serde(default)]
    pub cells: IndexMap<String, CellDef>,
    #[serde(default)]
    pub netnames: IndexMap<String, NetnameDef>,
}

/// One gate instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CellDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub connections: IndexMap<String, Vec<BitRef>>,
}

/// One named signal.
#[derive(Debug, Clone, Deserialize)]
pub struct NetnameDef {
    pub bits: Vec<BitRef>,
    #[serde(default)]
    pub hide_name: u8,
    #[serde(default)]
    pub init: Option<InitValue>,
    #[serde(default)]
    pub attributes: NetAttributes,
}

impl NetnameDef {
    pub fn is_hidden(&self) -> bool {
        self.hide_name != 0
    }

    /// The initial value in `bits` order, from the netname's own `init`
    /// or, failing that, its `init` attribute. Attribute constants are
    /// written most significant bit first and are reversed here. The error
    /// carries the first offending element.
    pub fn initial(&self) -> Option<Result<Vec<u8>, String>> {
        if let Some(init) = &self.init {
            return Some(init.resolve());
        }
        let init = self.attributes.init.as_ref()?;
        Some(init.resolve().map(|mut values| {
            if let InitValue::Digits(_) = init {
                values.reverse();
            }
            values
        }))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetAttributes {
    #[serde(default)]
    pub init: Option<InitValue>,
}

/// A bit as written in the netlist: a net id, or a constant string
/// (`"0"`, `"1"`, `"x"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BitRef {
    Net(u64),
    Const(String),
}

/// An initial-value vector, either as integers or as a digit string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InitValue {
    Values(Vec<u64>),
    Digits(String),
}

impl InitValue {
    /// Decode into 0/1 values in the order written. `x` and `z` digits read
    /// as 0. The error carries the first offending element.
    pub fn resolve(&self) -> Result<Vec<u8>, String> {
        match self {
            InitValue::Values(values) => values
                .iter()
                .map(|&v| match v {
                    0 | 1 => Ok(v as u8),
                    other => Err(other.to_string()),
                })
                .collect(),
            InitValue::Digits(digits) => digits
                .chars()
                .map(|c| match c {
                    '0' | 'x' | 'X' | 'z' | 'Z' => Ok(0),
                    '1' => Ok(1),
                    other => Err(format!("'{other}'")),
                })
                .collect(),
        }
    }
}

/// The `default_values` override table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub default_values: IndexMap<String, Vec<u64>>,
}

impl Defaults {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, signal: &str) -> Option<&[u64]> {
        self.default_values.get(signal).map(Vec::as_slice)
    }
}
