//! Centralized balance and tuning constants for the FtA simulation.
//!
//! Content (research, items, factions, operations) is data and lives in the
//! JSON rule packs. The values here define the fixed math around that data
//! and can only change through reviewed code.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_RESEARCH_STARTED: &str = "log.faction.research.started";
pub(crate) const LOG_RESEARCH_COMPLETED: &str = "log.faction.research.completed";
pub(crate) const LOG_ITEMS_MANUFACTURED: &str = "log.faction.items.manufactured";
pub(crate) const LOG_ITEMS_RESTOCKED: &str = "log.faction.items.restocked";
pub(crate) const LOG_ITEMS_SOLD: &str = "log.faction.items.sold";
pub(crate) const LOG_INCOME_COLLECTED: &str = "log.faction.income";
pub(crate) const LOG_SALARIES_PAID: &str = "log.faction.salaries";
pub(crate) const LOG_STAFF_HIRED: &str = "log.faction.staff.hired";
pub(crate) const LOG_STAFF_DISMISSED: &str = "log.faction.staff.dismissed";
pub(crate) const LOG_POWER_CHANGED: &str = "log.faction.power";
pub(crate) const LOG_MISSION_LAUNCHED: &str = "log.faction.mission";
pub(crate) const LOG_REPUTATION_CHANGED: &str = "log.faction.reputation";
pub(crate) const LOG_TREATY_SIGNED: &str = "log.faction.treaty.signed";
pub(crate) const LOG_TREATY_REVOKED: &str = "log.faction.treaty.revoked";
pub(crate) const LOG_INTEL_UNFUNDED: &str = "log.intel.unfunded";
pub(crate) const LOG_INTEL_FAILED: &str = "log.intel.failed";
pub(crate) const LOG_INTEL_PROGRESS: &str = "log.intel.progress";
pub(crate) const LOG_INTEL_STAGE: &str = "log.intel.stage";
pub(crate) const LOG_INTEL_COMPLETE: &str = "log.intel.complete";
pub(crate) const LOG_COVERT_STARTED: &str = "log.covert.started";
pub(crate) const LOG_COVERT_SUCCESS: &str = "log.covert.success";
pub(crate) const LOG_COVERT_FAILURE: &str = "log.covert.failure";
pub(crate) const LOG_RESEARCH_DISCOVERED: &str = "log.player.research";

// Calendar -----------------------------------------------------------------
pub(crate) const TEN_DAY_MARKERS: [u8; 3] = [10, 20, 30];
pub(crate) const MONTH_START_DAY: u8 = 1;

// Faction economy ----------------------------------------------------------
/// Research work is tracked in hundredths of a scientist-day.
pub(crate) const RESEARCH_WORK_SCALE: u32 = 100;
pub(crate) const DEFAULT_SCIENTIST_EFFICIENCY_PCT: u32 = 100;
pub(crate) const DEFAULT_SELL_KEEP_PCT: u32 = 150;
/// Engineer work units available per engineer in a ten-day production window.
pub(crate) const ENGINEER_WORK_PER_WINDOW: u32 = 10;
pub(crate) const DEFAULT_FOCUS_WEIGHT: f64 = 1.0;

// Reputation ---------------------------------------------------------------
pub(crate) const DEFAULT_UNFRIENDLY_MIN: i32 = -200;
pub(crate) const DEFAULT_NEUTRAL_MIN: i32 = -50;
pub(crate) const DEFAULT_FRIENDLY_MIN: i32 = 100;
pub(crate) const DEFAULT_ALLIED_MIN: i32 = 300;
pub(crate) const DEFAULT_REPUTATION_DRIFT: i32 = 5;

// Covert operations --------------------------------------------------------
pub(crate) const COVERT_UNDERSTAFFED_PENALTY: f64 = 15.0;
pub(crate) const COVERT_VIGILANCE_PENALTY: f64 = 0.25;
pub(crate) const COVERT_TIME_SPEEDUP_DIVISOR: f64 = 100.0;
pub(crate) const COVERT_DEFAULT_MAX_CHANCE: f64 = 95.0;
pub(crate) const COVERT_DEFAULT_STAT_SCALE: f64 = 10.0;

// Intel projects -----------------------------------------------------------
pub(crate) const INTEL_DEFAULT_MIN_CHANCE: f64 = 5.0;
pub(crate) const INTEL_DEFAULT_MAX_CHANCE: f64 = 90.0;
pub(crate) const INTEL_DEFAULT_STEP_SCALE: f64 = 10.0;

// Shared -------------------------------------------------------------------
pub(crate) const PERCENT: f64 = 100.0;
pub(crate) const DEFAULT_TEAM_FALLOFF: f64 = 0.75;
