use std::fmt;

/// The fixed catalog of gate kinds a netlist may instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GateKind {
    Not,
    And2,
    Or2,
    Buf,
    Dff,
}

/// Argument roles of a gate kind, in call order: inputs, then the state
/// slot (stateful kinds only), then outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleShape {
    pub inputs: &'static [&'static str],
    pub state: Option<&'static str>,
    pub outputs: &'static [&'static str],
}

const UNARY: RoleShape = RoleShape {
    inputs: &["A"],
    state: None,
    outputs: &["Y"],
};

const BINARY: RoleShape = RoleShape {
    inputs: &["A", "B"],
    state: None,
    outputs: &["Y"],
};

const FLIP_FLOP: RoleShape = RoleShape {
    inputs: &["CLK", "D"],
    state: Some("STATE"),
    outputs: &["IQ"],
};

impl GateKind {
    pub const ALL: [GateKind; 5] = [
        GateKind::Not,
        GateKind::And2,
        GateKind::Or2,
        GateKind::Buf,
        GateKind::Dff,
    ];

    /// Resolve a netlist cell type label. Returns `None` for anything
    /// outside the catalog.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "NOT" => Some(GateKind::Not),
            "AND2" => Some(GateKind::And2),
            "OR2" => Some(GateKind::Or2),
            "BUF" => Some(GateKind::Buf),
            "DFF" => Some(GateKind::Dff),
            _ => None,
        }
    }

    /// The netlist label of this kind.
    pub fn label(self) -> &'static str {
        match self {
            GateKind::Not => "NOT",
            GateKind::And2 => "AND2",
            GateKind::Or2 => "OR2",
            GateKind::Buf => "BUF",
            GateKind::Dff => "DFF",
        }
    }

    pub fn roles(self) -> &'static RoleShape {
        match self {
            GateKind::Not | GateKind::Buf => &UNARY,
            GateKind::And2 | GateKind::Or2 => &BINARY,
            GateKind::Dff => &FLIP_FLOP,
        }
    }

    pub fn is_stateful(self) -> bool {
        self.roles().state.is_some()
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
