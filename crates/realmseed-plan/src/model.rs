use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Seed plan for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SeedPlan {
    /// Seed for every random draw; a fresh one is drawn when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Anchor for generated timestamps; defaults to the current UTC time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_time: Option<NaiveDateTime>,
    /// Rows requested per phase.
    #[serde(default)]
    pub counts: PhaseCounts,
}

/// Rows requested per generation phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseCounts {
    pub characters: u32,
    pub quests: u32,
    pub levels: u32,
    pub battle_records: u32,
    pub quest_progress: u32,
    pub level_progress: u32,
    pub achievements: u32,
    pub save_slots: u32,
    pub logs: u32,
}

impl Default for PhaseCounts {
    fn default() -> Self {
        Self {
            characters: 15,
            quests: 25,
            levels: 20,
            battle_records: 80,
            quest_progress: 50,
            level_progress: 40,
            achievements: 30,
            save_slots: 8,
            logs: 150,
        }
    }
}

impl SeedPlan {
    /// Plan with every count set to zero.
    pub fn empty() -> Self {
        Self {
            seed: None,
            base_time: None,
            counts: PhaseCounts {
                characters: 0,
                quests: 0,
                levels: 0,
                battle_records: 0,
                quest_progress: 0,
                level_progress: 0,
                achievements: 0,
                save_slots: 0,
                logs: 0,
            },
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
