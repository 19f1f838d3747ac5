//! Skill statistics and the hazard pass-odds model.
//!
//! A hazard carries a difficulty score; each of the six crew skills converts
//! that score into a pass probability via linear interpolation over the
//! skill's proficiency range, and the voyage's primary/secondary choice
//! weights the six probabilities into a single combined chance.

use serde::{Deserialize, Serialize};

use crate::constants::{OTHER_SKILL_WEIGHT, PRIMARY_SKILL_WEIGHT, SECONDARY_SKILL_WEIGHT};

/// The six fixed voyage skill identifiers, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillId {
    #[serde(rename = "command_skill")]
    Command,
    #[serde(rename = "diplomacy_skill")]
    Diplomacy,
    #[serde(rename = "engineering_skill")]
    Engineering,
    #[serde(rename = "medicine_skill")]
    Medicine,
    #[serde(rename = "science_skill")]
    Science,
    #[serde(rename = "security_skill")]
    Security,
}

impl SkillId {
    /// All skills in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Command,
        Self::Diplomacy,
        Self::Engineering,
        Self::Medicine,
        Self::Science,
        Self::Security,
    ];

    /// Wire identifier used by the game export format.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Command => "command_skill",
            Self::Diplomacy => "diplomacy_skill",
            Self::Engineering => "engineering_skill",
            Self::Medicine => "medicine_skill",
            Self::Science => "science_skill",
            Self::Security => "security_skill",
        }
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Proficiency statistics for a single skill.
///
/// `core` is the guaranteed contribution; `range_min..=range_max` is the
/// proficiency roll window. All values are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub core: u32,
    pub range_min: u32,
    pub range_max: u32,
}

impl Skill {
    #[must_use]
    pub const fn new(core: u32, range_min: u32, range_max: u32) -> Self {
        Self {
            core,
            range_min,
            range_max,
        }
    }
}

/// Aggregate statistics for all six skills.
///
/// Skills absent from the wire payload default to a zero [`Skill`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    #[serde(default, rename = "command_skill")]
    pub command: Skill,
    #[serde(default, rename = "diplomacy_skill")]
    pub diplomacy: Skill,
    #[serde(default, rename = "engineering_skill")]
    pub engineering: Skill,
    #[serde(default, rename = "medicine_skill")]
    pub medicine: Skill,
    #[serde(default, rename = "science_skill")]
    pub science: Skill,
    #[serde(default, rename = "security_skill")]
    pub security: Skill,
}

impl SkillSet {
    /// Look up one skill by identifier.
    #[must_use]
    pub const fn get(&self, id: SkillId) -> Skill {
        match id {
            SkillId::Command => self.command,
            SkillId::Diplomacy => self.diplomacy,
            SkillId::Engineering => self.engineering,
            SkillId::Medicine => self.medicine,
            SkillId::Science => self.science,
            SkillId::Security => self.security,
        }
    }

    /// Set one skill by identifier.
    pub const fn set(&mut self, id: SkillId, skill: Skill) {
        match id {
            SkillId::Command => self.command = skill,
            SkillId::Diplomacy => self.diplomacy = skill,
            SkillId::Engineering => self.engineering = skill,
            SkillId::Medicine => self.medicine = skill,
            SkillId::Science => self.science = skill,
            SkillId::Security => self.security = skill,
        }
    }

    /// Skills ordered for hazard weighting: primary, secondary, then the
    /// remaining four in declaration order.
    #[must_use]
    pub fn ordered(&self, primary: SkillId, secondary: SkillId) -> [Skill; 6] {
        let mut out = [Skill::default(); 6];
        out[0] = self.get(primary);
        out[1] = self.get(secondary);
        let mut slot = 2;
        for id in SkillId::ALL {
            if id != primary && id != secondary {
                out[slot] = self.get(id);
                slot += 1;
            }
        }
        out
    }
}

/// Probability that `skill` passes a hazard of the given difficulty.
///
/// Always 1.0 at or below `core + range_min`, always 0.0 at or above
/// `core + range_max`, linear in between. A degenerate range
/// (`range_max == range_min`) collapses to a step function at the
/// threshold rather than dividing by zero.
#[must_use]
pub fn pass_probability(hazard_score: f64, skill: &Skill) -> f64 {
    let floor = f64::from(skill.core) + f64::from(skill.range_min);
    let span = f64::from(skill.range_max) - f64::from(skill.range_min);
    if span <= 0.0 {
        return if hazard_score <= floor { 1.0 } else { 0.0 };
    }
    (1.0 - (hazard_score - floor) / span).clamp(0.0, 1.0)
}

/// Weighted pass probability across all six skills.
///
/// `skills` must be ordered primary, secondary, then others, as produced
/// by [`SkillSet::ordered`]; weights are 0.35 / 0.25 / 0.10 each.
#[must_use]
pub fn combined_odds(hazard_score: f64, skills: &[Skill; 6]) -> f64 {
    const WEIGHTS: [f64; 6] = [
        PRIMARY_SKILL_WEIGHT,
        SECONDARY_SKILL_WEIGHT,
        OTHER_SKILL_WEIGHT,
        OTHER_SKILL_WEIGHT,
        OTHER_SKILL_WEIGHT,
        OTHER_SKILL_WEIGHT,
    ];
    skills
        .iter()
        .zip(WEIGHTS)
        .map(|(skill, weight)| pass_probability(hazard_score, skill) * weight)
        .sum()
}
