//! Centralized tuning constants for the voyage simulation and log store.
//!
//! These values define the deterministic math for the duration estimator.
//! Keeping them together ensures that estimation behavior can only be
//! adjusted via code changes reviewed in version control, rather than
//! through external JSON assets.

// Simulation cadence -------------------------------------------------------
pub(crate) const SECONDS_PER_TICK: u32 = 20;
pub(crate) const HAZARD_TICK: u32 = 4;
pub(crate) const REWARD_TICK: u32 = 7;
// Dilemma checkpoints arrive every two simulated hours.
pub(crate) const TICKS_BETWEEN_DILEMMAS: u32 = 2 * 60 * 60 / SECONDS_PER_TICK;
// Sanity escape at roughly fourteen simulated hours.
pub(crate) const TICK_SAFETY_CAP: u32 = 2520;

// Antimatter economy -------------------------------------------------------
pub(crate) const HAZARD_AM_PASS: i32 = 5;
pub(crate) const HAZARD_AM_FAIL: i32 = 30;
pub(crate) const AM_PER_ACTIVITY: i32 = 1;

// Hazard difficulty --------------------------------------------------------
pub(crate) const SKILL_INC_PER_HAZARD: f64 = 32.0;
pub(crate) const HAZARD_ODDS_TABLE_LEN: usize = 630;

// Skill weighting ----------------------------------------------------------
pub(crate) const PRIMARY_SKILL_WEIGHT: f64 = 0.35;
pub(crate) const SECONDARY_SKILL_WEIGHT: f64 = 0.25;
pub(crate) const OTHER_SKILL_WEIGHT: f64 = 0.10;

// Estimator defaults -------------------------------------------------------
pub(crate) const DEFAULT_SIMULATIONS: usize = 5000;

// Store and export ---------------------------------------------------------
pub(crate) const VOYAGE_LOG_KEY: &str = "voyageLog";
pub(crate) const EXPORT_VERSION_MAJOR: u32 = 1;
pub(crate) const EXPORT_VERSION_MINOR: u32 = 0;
