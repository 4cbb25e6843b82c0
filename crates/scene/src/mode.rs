use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a context writes on top of the shared per-frame uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Lighting perturbed by the normal map (`uNormalMapOn = 1`).
    NormalMapped,
    /// Lighting from the geometric normal only (`uNormalMapOn = 0`).
    Flat,
    /// Time-driven variant (`uTime` = elapsed seconds).
    Animated,
}

impl RenderMode {
    /// Value for `uNormalMapOn`; `None` when this mode leaves it untouched.
    pub fn normal_map_flag(self) -> Option<bool> {
        match self {
            Self::NormalMapped => Some(true),
            Self::Flat => Some(false),
            Self::Animated => None,
        }
    }

    pub fn uses_time(self) -> bool {
        matches!(self, Self::Animated)
    }
}

/// One output surface and the mode it renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub id: &'static str,
    pub mode: RenderMode,
}

const SIDE_BY_SIDE: &[Canvas] = &[
    Canvas {
        id: "normal-mapping",
        mode: RenderMode::NormalMapped,
    },
    Canvas {
        id: "basic",
        mode: RenderMode::Flat,
    },
];

const SINGLE: &[Canvas] = &[Canvas {
    id: "game",
    mode: RenderMode::Animated,
}];

/// Which set of canvases the host opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Normal-mapped and flat renders compared next to each other.
    #[default]
    SideBySide,
    /// One animated canvas.
    Single,
}

impl Layout {
    pub fn canvases(self) -> &'static [Canvas] {
        match self {
            Self::SideBySide => SIDE_BY_SIDE,
            Self::Single => SINGLE,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SideBySide => f.write_str("side-by-side"),
            Self::Single => f.write_str("single"),
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "side-by-side" => Ok(Self::SideBySide),
            "single" => Ok(Self::Single),
            other => Err(format!(
                "unknown layout `{other}` (expected `side-by-side` or `single`)"
            )),
        }
    }
}
