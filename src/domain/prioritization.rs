use crate::domain::story::Story;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Multiplier of the MoSCoW band
pub const MOSCOW_BAND: u32 = 1000;
/// Multiplier of the GUT band; any GUT step outweighs the whole CSD band
pub const GUT_BAND: u32 = 10;

/// MoSCoW category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Moscow {
    Must,
    Should,
    Could,
    #[serde(alias = "WON'T")]
    Wont,
    /// Any category this version does not know; weighs nothing
    #[serde(other)]
    Unrecognized,
}

impl Moscow {
    pub fn weight(self) -> u32 {
        match self {
            Self::Must => 4,
            Self::Should => 3,
            Self::Could => 2,
            Self::Wont => 1,
            Self::Unrecognized => 0,
        }
    }
}

impl FromStr for Moscow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MUST" => Ok(Self::Must),
            "SHOULD" => Ok(Self::Should),
            "COULD" => Ok(Self::Could),
            "WONT" | "WON'T" => Ok(Self::Wont),
            _ => Err(format!(
                "Invalid MoSCoW category '{}'. Valid categories: must, should, could, wont",
                s
            )),
        }
    }
}

impl fmt::Display for Moscow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Must => write!(f, "Must have"),
            Self::Should => write!(f, "Should have"),
            Self::Could => write!(f, "Could have"),
            Self::Wont => write!(f, "Won't have"),
            Self::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

/// CSD matrix category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Csd {
    Certainties,
    Suppositions,
    Doubts,
    #[serde(other)]
    Unrecognized,
}

impl Csd {
    pub fn weight(self) -> u32 {
        match self {
            Self::Certainties => 3,
            Self::Suppositions => 2,
            Self::Doubts => 1,
            Self::Unrecognized => 0,
        }
    }
}

impl FromStr for Csd {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CERTAINTIES" => Ok(Self::Certainties),
            "SUPPOSITIONS" => Ok(Self::Suppositions),
            "DOUBTS" => Ok(Self::Doubts),
            _ => Err(format!(
                "Invalid CSD category '{}'. Valid categories: certainties, suppositions, doubts",
                s
            )),
        }
    }
}

impl fmt::Display for Csd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Certainties => write!(f, "Certainties"),
            Self::Suppositions => write!(f, "Suppositions"),
            Self::Doubts => write!(f, "Doubts"),
            Self::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

/// Prioritization techniques applied to a single story
///
/// Each technique has its own toggle; values of a disabled technique are
/// kept but ignored when scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prioritization {
    pub use_moscow: bool,
    pub use_csd: bool,
    pub use_gut: bool,
    #[serde(default)]
    pub moscow: Option<Moscow>,
    #[serde(default)]
    pub csd: Option<Csd>,
    pub gut_g: u8,
    pub gut_u: u8,
    pub gut_t: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Default for Prioritization {
    fn default() -> Self {
        Self {
            use_moscow: true,
            use_csd: false,
            use_gut: false,
            moscow: None,
            csd: None,
            gut_g: 1,
            gut_u: 1,
            gut_t: 1,
            reason: None,
        }
    }
}

impl Prioritization {
    /// MoSCoW only, with the given category
    pub fn moscow(category: Moscow) -> Self {
        Self {
            moscow: Some(category),
            ..Self::default()
        }
    }

    /// GUT only, with the given gravity, urgency and tendency
    pub fn gut(g: u8, u: u8, t: u8) -> Self {
        Self {
            use_moscow: false,
            use_gut: true,
            gut_g: g,
            gut_u: u,
            gut_t: t,
            ..Self::default()
        }
    }

    /// CSD only, with the given category
    pub fn csd(category: Csd) -> Self {
        Self {
            use_moscow: false,
            use_csd: true,
            csd: Some(category),
            ..Self::default()
        }
    }

    /// Gravity x Urgency x Tendency
    pub fn gut_product(&self) -> u32 {
        u32::from(self.gut_g) * u32::from(self.gut_u) * u32::from(self.gut_t)
    }

    /// Composite score with one magnitude band per technique
    ///
    /// MoSCoW weighs `weight * 1000`, GUT `g * u * t * 10` and CSD its bare
    /// weight. Between stories sharing GUT and CSD values the MoSCoW category
    /// decides, and a GUT difference always outweighs a CSD difference.
    pub fn score(&self) -> u32 {
        let mut score = 0;

        if self.use_moscow {
            if let Some(moscow) = self.moscow {
                score += moscow.weight() * MOSCOW_BAND;
            }
        }

        if self.use_gut {
            score += self.gut_product() * GUT_BAND;
        }

        if self.use_csd {
            if let Some(csd) = self.csd {
                score += csd.weight();
            }
        }

        score
    }

    /// Upsert semantics: every unset field of `patch` falls back to the
    /// current value, then to the defaults
    pub fn merged(current: Option<&Prioritization>, patch: &PrioritizationPatch) -> Self {
        let base = current.cloned().unwrap_or_default();
        Self {
            use_moscow: patch.use_moscow.unwrap_or(base.use_moscow),
            use_csd: patch.use_csd.unwrap_or(base.use_csd),
            use_gut: patch.use_gut.unwrap_or(base.use_gut),
            moscow: patch.moscow.or(base.moscow),
            csd: patch.csd.or(base.csd),
            gut_g: patch.gut_g.unwrap_or(base.gut_g),
            gut_u: patch.gut_u.unwrap_or(base.gut_u),
            gut_t: patch.gut_t.unwrap_or(base.gut_t),
            reason: patch.reason.clone().or(base.reason),
        }
    }
}

/// Partial prioritization change submitted by a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizationPatch {
    pub use_moscow: Option<bool>,
    pub use_csd: Option<bool>,
    pub use_gut: Option<bool>,
    pub moscow: Option<Moscow>,
    pub csd: Option<Csd>,
    pub gut_g: Option<u8>,
    pub gut_u: Option<u8>,
    pub gut_t: Option<u8>,
    pub reason: Option<String>,
}

/// Priority score of a story; zero when it has never been prioritized
pub fn priority_score(story: &Story) -> u32 {
    story
        .prioritization
        .as_ref()
        .map(Prioritization::score)
        .unwrap_or(0)
}
