//! Enumeration types for the Mitosis Lab simulation.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// A labeled stage within one biological cell cycle.
///
/// Not every phase appears in every mode: the mitosis presets never use the
/// meiosis-specific stages, and the simple preset folds G1/S/G2 into a single
/// [`Phase::Interphase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    // --- Interphase ---
    /// Interphase as a single stage (growth and DNA replication).
    Interphase,
    /// Gap 1: cell growth.
    G1,
    /// Synthesis: DNA replication.
    S,
    /// Gap 2: preparation for mitosis.
    G2,

    // --- Mitosis ---
    /// Chromosomes condense, spindle forms.
    Prophase,
    /// Nuclear envelope breaks down, kinetochores attach.
    Prometaphase,
    /// Chromosomes align on the metaphase plate.
    Metaphase,
    /// Sister chromatids separate.
    Anaphase,
    /// Nuclei re-form at each pole.
    Telophase,

    // --- Meiosis I ---
    /// Homologous chromosomes pair and cross over.
    ProphaseI,
    /// Homologous pairs align on the plate.
    MetaphaseI,
    /// Homologous chromosomes separate.
    AnaphaseI,
    /// First division completes.
    TelophaseI,

    // --- Meiosis II ---
    /// Chromosomes condense again in each haploid cell.
    ProphaseII,
    /// Chromosomes align in each haploid cell.
    MetaphaseII,
    /// Sister chromatids separate.
    AnaphaseII,
    /// Four haploid nuclei form.
    TelophaseII,

    // --- Terminal ---
    /// The cytoplasm splits. Leaving this phase completes a cycle.
    Cytokinesis,
}

impl Phase {
    /// Stable snake-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interphase => "interphase",
            Self::G1 => "g1",
            Self::S => "s",
            Self::G2 => "g2",
            Self::Prophase => "prophase",
            Self::Prometaphase => "prometaphase",
            Self::Metaphase => "metaphase",
            Self::Anaphase => "anaphase",
            Self::Telophase => "telophase",
            Self::ProphaseI => "prophase_i",
            Self::MetaphaseI => "metaphase_i",
            Self::AnaphaseI => "anaphase_i",
            Self::TelophaseI => "telophase_i",
            Self::ProphaseII => "prophase_ii",
            Self::MetaphaseII => "metaphase_ii",
            Self::AnaphaseII => "anaphase_ii",
            Self::TelophaseII => "telophase_ii",
            Self::Cytokinesis => "cytokinesis",
        }
    }

    /// Whether this phase belongs to interphase (no visible division activity).
    pub const fn is_interphase(self) -> bool {
        matches!(self, Self::Interphase | Self::G1 | Self::S | Self::G2)
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Simulation modes
// ---------------------------------------------------------------------------

/// The preset that selects which phase timeline applies to a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SimulationMode {
    /// Six-stage mitosis for introductory lessons.
    #[default]
    SimpleMitosis,
    /// Mitosis with G1/S/G2 and prometaphase broken out.
    DetailedMitosis,
    /// Two meiotic divisions with crossover in prophase I.
    Meiosis,
}

impl SimulationMode {
    /// Every mode, in presentation order.
    pub const ALL: [Self; 3] = [Self::SimpleMitosis, Self::DetailedMitosis, Self::Meiosis];

    /// Stable snake-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimpleMitosis => "simple_mitosis",
            Self::DetailedMitosis => "detailed_mitosis",
            Self::Meiosis => "meiosis",
        }
    }

    /// Whether a completed cycle in this mode involves chromosomal crossover.
    pub const fn has_crossover(self) -> bool {
        matches!(self, Self::Meiosis)
    }
}

impl core::fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mode name that does not match any known preset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown simulation mode: {name}")]
pub struct ParseModeError {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for SimulationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "simple_mitosis" | "simple" | "mitosis" => Ok(Self::SimpleMitosis),
            "detailed_mitosis" | "detailed" => Ok(Self::DetailedMitosis),
            "meiosis" => Ok(Self::Meiosis),
            _ => Err(ParseModeError { name: s.to_owned() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LifecycleState {
    /// Running its cycle normally.
    #[default]
    Alive,
    /// Transient: the cell left cytokinesis on the current tick.
    Dividing,
    /// Terminal: lifespan exceeded. No further transitions.
    Dead,
}

/// Which side of the lifespan boundary counts as death.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DeathBoundary {
    /// Dies once age is strictly greater than the lifespan.
    #[default]
    Exclusive,
    /// Dies as soon as age reaches the lifespan.
    Inclusive,
}

impl DeathBoundary {
    /// Whether `age` has crossed `lifespan` under this boundary rule.
    pub const fn is_exceeded(self, age: f64, lifespan: f64) -> bool {
        match self {
            Self::Exclusive => age > lifespan,
            Self::Inclusive => age >= lifespan,
        }
    }
}
