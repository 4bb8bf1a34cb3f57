//! Ordered generation phases with declared pool dependencies.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use realmseed_plan::PhaseCounts;

use crate::errors::GenerationError;
use crate::generators::{
    achievements, battles, characters, levels, loadout, logs, progress, quests, saves,
};
use crate::model::RowCounts;
use crate::pool::PoolKind;
use crate::session::GenerationSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Characters,
    Loadouts,
    Quests,
    Levels,
    BattleRecords,
    QuestProgress,
    LevelProgress,
    Achievements,
    SaveSlots,
    Logs,
}

impl PhaseKind {
    pub const STANDARD: [PhaseKind; 10] = [
        PhaseKind::Characters,
        PhaseKind::Loadouts,
        PhaseKind::Quests,
        PhaseKind::Levels,
        PhaseKind::BattleRecords,
        PhaseKind::QuestProgress,
        PhaseKind::LevelProgress,
        PhaseKind::Achievements,
        PhaseKind::SaveSlots,
        PhaseKind::Logs,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PhaseKind::Characters => characters::PHASE,
            PhaseKind::Loadouts => loadout::PHASE,
            PhaseKind::Quests => quests::PHASE,
            PhaseKind::Levels => levels::PHASE,
            PhaseKind::BattleRecords => battles::PHASE,
            PhaseKind::QuestProgress => progress::QUEST_PHASE,
            PhaseKind::LevelProgress => progress::LEVEL_PHASE,
            PhaseKind::Achievements => achievements::PHASE,
            PhaseKind::SaveSlots => saves::PHASE,
            PhaseKind::Logs => logs::PHASE,
        }
    }

    /// Pools the phase draws references from.
    pub const fn reads(self) -> &'static [PoolKind] {
        match self {
            PhaseKind::Characters | PhaseKind::Quests | PhaseKind::Levels => &[],
            PhaseKind::Loadouts | PhaseKind::Achievements | PhaseKind::Logs => {
                &[PoolKind::Characters]
            }
            PhaseKind::BattleRecords | PhaseKind::LevelProgress | PhaseKind::SaveSlots => {
                &[PoolKind::Characters, PoolKind::Levels]
            }
            PhaseKind::QuestProgress => &[PoolKind::Characters, PoolKind::Quests],
        }
    }

    /// Pools the phase adds entities to.
    pub const fn writes(self) -> &'static [PoolKind] {
        match self {
            PhaseKind::Characters => &[PoolKind::Characters],
            PhaseKind::Quests => &[PoolKind::Quests],
            PhaseKind::Levels => &[PoolKind::Levels],
            _ => &[],
        }
    }

    /// Rows requested by the plan; `None` for phases sized by their pools.
    pub fn requested(self, counts: &PhaseCounts) -> Option<u32> {
        match self {
            PhaseKind::Characters => Some(counts.characters),
            PhaseKind::Loadouts => None,
            PhaseKind::Quests => Some(counts.quests),
            PhaseKind::Levels => Some(counts.levels),
            PhaseKind::BattleRecords => Some(counts.battle_records),
            PhaseKind::QuestProgress => Some(counts.quest_progress),
            PhaseKind::LevelProgress => Some(counts.level_progress),
            PhaseKind::Achievements => Some(counts.achievements),
            PhaseKind::SaveSlots => Some(counts.save_slots),
            PhaseKind::Logs => Some(counts.logs),
        }
    }

    pub(crate) async fn run(
        self,
        conn: &mut SqliteConnection,
        session: &mut GenerationSession,
        counts: &PhaseCounts,
    ) -> Result<RowCounts, GenerationError> {
        let rows = self.requested(counts).unwrap_or(0);
        match self {
            PhaseKind::Characters => characters::generate_characters(conn, session, rows).await,
            PhaseKind::Loadouts => loadout::generate_loadouts(conn, session).await,
            PhaseKind::Quests => quests::generate_quests(conn, session, rows).await,
            PhaseKind::Levels => levels::generate_levels(conn, session, rows).await,
            PhaseKind::BattleRecords => battles::generate_battle_records(conn, session, rows).await,
            PhaseKind::QuestProgress => progress::generate_quest_progress(conn, session, rows).await,
            PhaseKind::LevelProgress => progress::generate_level_progress(conn, session, rows).await,
            PhaseKind::Achievements => {
                achievements::generate_achievements(conn, session, rows).await
            }
            PhaseKind::SaveSlots => saves::generate_save_slots(conn, session, rows).await,
            PhaseKind::Logs => logs::generate_logs(conn, session, rows).await,
        }
    }
}

/// Phases in execution order; no phase reads a pool that a later phase writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    phases: Vec<PhaseKind>,
}

impl Pipeline {
    pub fn new(phases: Vec<PhaseKind>) -> Result<Self, GenerationError> {
        let mut seen = HashSet::new();
        for phase in &phases {
            if !seen.insert(*phase) {
                return Err(GenerationError::Phase(format!(
                    "phase '{}' listed twice",
                    phase.name()
                )));
            }
        }

        for (index, phase) in phases.iter().enumerate() {
            for pool in phase.reads() {
                if let Some(writer) = phases[index + 1..]
                    .iter()
                    .find(|later| later.writes().contains(pool))
                {
                    return Err(GenerationError::Phase(format!(
                        "phase '{}' reads the {} pool before '{}' writes it",
                        phase.name(),
                        pool.as_str(),
                        writer.name()
                    )));
                }
            }
        }

        Ok(Self { phases })
    }

    /// characters, loadouts, quests, levels, battle records, quest progress,
    /// level progress, achievements, save slots, logs.
    pub fn standard() -> Self {
        Self {
            phases: PhaseKind::STANDARD.to_vec(),
        }
    }

    pub fn phases(&self) -> &[PhaseKind] {
        &self.phases
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order_is_valid() {
        let pipeline = Pipeline::new(PhaseKind::STANDARD.to_vec()).expect("standard pipeline");
        assert_eq!(pipeline, Pipeline::standard());
        assert_eq!(pipeline.phases()[0], PhaseKind::Characters);
    }

    #[test]
    fn reading_before_writing_is_rejected() {
        let err = Pipeline::new(vec![PhaseKind::SaveSlots, PhaseKind::Characters])
            .expect_err("save slots before characters");
        assert!(err.to_string().contains("save_slots"));

        let err = Pipeline::new(vec![
            PhaseKind::Characters,
            PhaseKind::QuestProgress,
            PhaseKind::Quests,
        ])
        .expect_err("progress before quests");
        assert!(matches!(err, GenerationError::Phase(_)));
    }

    #[test]
    fn duplicate_phases_are_rejected() {
        assert!(Pipeline::new(vec![PhaseKind::Logs, PhaseKind::Logs]).is_err());
    }

    #[test]
    fn partial_pipelines_are_allowed() {
        let pipeline =
            Pipeline::new(vec![PhaseKind::SaveSlots]).expect("reads only from the store");
        assert_eq!(pipeline.phases().len(), 1);
    }
}
