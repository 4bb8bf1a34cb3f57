//! Skills, equipment, inventory, and statistics for characters.

use std::collections::HashSet;

use rand::Rng;
use sqlx::{Connection, SqliteConnection};
use tracing::debug;

use realmseed_core::{EquipmentSlot, ItemType, Result, tables};

use crate::errors::{GenerationError, write_error};
use crate::generators::{bump, db_error};
use crate::ids::sample;
use crate::model::{GenerationIssue, RowCounts};
use crate::pool::CharacterRef;
use crate::resolver::{CandidateKind, Constraint, candidates, resolve};
use crate::session::GenerationSession;
use crate::vocab::STAT_KEYS;

pub const PHASE: &str = "loadouts";

pub const MAX_SKILLS: usize = 5;
pub const MAX_INVENTORY: usize = 5;
pub const LOADOUT_SLOTS: [EquipmentSlot; 3] =
    [EquipmentSlot::Weapon, EquipmentSlot::Chest, EquipmentSlot::Ring];
const INVENTORY_TYPES: &[ItemType] = &[ItemType::Consumable, ItemType::Material];

/// Assign up to [`MAX_SKILLS`] skills the character is eligible for.
pub async fn assign_skills<R: Rng + ?Sized>(
    conn: &mut SqliteConnection,
    rng: &mut R,
    character: &CharacterRef,
) -> Result<u64> {
    let eligible = candidates(
        conn,
        CandidateKind::Skill,
        &[
            Constraint::Class(character.class),
            Constraint::MaxLevel(character.level),
        ],
    )
    .await?;
    let max_skill_level = (character.level / 2 + 1).min(10);

    let chosen = sample(rng, &eligible, MAX_SKILLS);
    for skill_id in &chosen {
        sqlx::query(
            "INSERT INTO character_skills (character_id, skill_id, skill_level, is_equipped) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&character.id)
        .bind(*skill_id)
        .bind(rng.random_range(1..=max_skill_level))
        .bind(rng.random_bool(0.5))
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    }
    Ok(chosen.len() as u64)
}

/// Equip one eligible item per loadout slot; returns rows written and the
/// slots left empty because nothing was eligible.
pub async fn assign_equipment<R: Rng + ?Sized>(
    conn: &mut SqliteConnection,
    rng: &mut R,
    character: &CharacterRef,
) -> Result<(u64, Vec<EquipmentSlot>)> {
    let mut written = 0;
    let mut skipped = Vec::new();
    for slot in LOADOUT_SLOTS {
        let constraints = [
            Constraint::Slot(slot),
            Constraint::MaxLevel(character.level),
            Constraint::Class(character.class),
        ];
        let Some(equipment_id) = resolve(conn, rng, CandidateKind::Equipment, &constraints).await?
        else {
            skipped.push(slot);
            continue;
        };

        sqlx::query(
            "INSERT INTO character_equipment \
             (character_id, equipment_id, slot, is_equipped, durability, enchant_level) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&character.id)
        .bind(&equipment_id)
        .bind(slot.as_str())
        .bind(true)
        .bind(rng.random_range(80..=100_i64))
        .bind(rng.random_range(0..=3_i64))
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
        written += 1;
    }
    Ok((written, skipped))
}

/// Fill up to [`MAX_INVENTORY`] slots with consumables and materials.
pub async fn assign_inventory<R: Rng + ?Sized>(
    conn: &mut SqliteConnection,
    rng: &mut R,
    character: &CharacterRef,
) -> Result<u64> {
    let eligible = candidates(
        conn,
        CandidateKind::Item,
        &[Constraint::ItemTypes(INVENTORY_TYPES)],
    )
    .await?;

    let chosen = sample(rng, &eligible, MAX_INVENTORY);
    for (slot_index, item_id) in chosen.iter().enumerate() {
        sqlx::query(
            "INSERT INTO character_inventory (character_id, item_id, quantity, slot_index) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&character.id)
        .bind(*item_id)
        .bind(rng.random_range(1..=10_i64))
        .bind(slot_index as i64)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    }
    Ok(chosen.len() as u64)
}

/// Draw the value of every statistic key; `battles_won` never exceeds
/// `total_battles`.
pub fn draw_statistics<R: Rng + ?Sized>(rng: &mut R) -> Vec<(&'static str, i64)> {
    let total_battles: i64 = rng.random_range(10..=100);
    let battles_won = rng.random_range(5..=total_battles.min(80));
    STAT_KEYS
        .iter()
        .map(|key| {
            let value = match *key {
                "total_battles" => total_battles,
                "battles_won" => battles_won,
                "total_experience_gained" => rng.random_range(1000..=10_000),
                "max_combo" => rng.random_range(1..=15),
                "items_collected" => rng.random_range(20..=200),
                "quests_completed" => rng.random_range(5..=30),
                "levels_completed" => rng.random_range(5..=25),
                _ => 0,
            };
            (*key, value)
        })
        .collect()
}

pub async fn assign_statistics<R: Rng + ?Sized>(
    conn: &mut SqliteConnection,
    rng: &mut R,
    character: &CharacterRef,
) -> Result<u64> {
    let stats = draw_statistics(rng);
    for (key, value) in &stats {
        sqlx::query(
            "INSERT INTO statistics (character_id, stat_key, stat_value, stat_type) \
             VALUES (?, ?, ?, 'integer')",
        )
        .bind(&character.id)
        .bind(*key)
        .bind(*value)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    }
    Ok(stats.len() as u64)
}

/// Give every pooled character without statistics a full loadout.
pub async fn generate_loadouts(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
) -> std::result::Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);

    let equipped: HashSet<String> =
        sqlx::query_scalar("SELECT DISTINCT character_id FROM statistics")
            .fetch_all(&mut *conn)
            .await
            .map_err(write_error(PHASE))?
            .into_iter()
            .collect();
    let pending: Vec<CharacterRef> = session
        .pools
        .characters
        .iter()
        .filter(|character| !equipped.contains(&character.id))
        .cloned()
        .collect();

    let mut counts = RowCounts::new();
    let mut issues = Vec::new();
    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    for character in &pending {
        let skills = assign_skills(&mut *tx, &mut rng, character)
            .await
            .map_err(write_error(PHASE))?;
        let (equipment, skipped) = assign_equipment(&mut *tx, &mut rng, character)
            .await
            .map_err(write_error(PHASE))?;
        let inventory = assign_inventory(&mut *tx, &mut rng, character)
            .await
            .map_err(write_error(PHASE))?;
        let statistics = assign_statistics(&mut *tx, &mut rng, character)
            .await
            .map_err(write_error(PHASE))?;

        for slot in skipped {
            debug!(character_id = %character.id, slot = %slot, "no eligible equipment");
            issues.push(GenerationIssue::warning(
                PHASE,
                "constraint_unsatisfiable",
                format!(
                    "no eligible {slot} for {} ({} level {}); slot left empty",
                    character.id, character.class, character.level
                ),
            ));
        }

        bump(&mut counts, tables::CHARACTER_SKILLS, skills);
        bump(&mut counts, tables::CHARACTER_EQUIPMENT, equipment);
        bump(&mut counts, tables::CHARACTER_INVENTORY, inventory);
        bump(&mut counts, tables::STATISTICS, statistics);
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    for issue in issues {
        session.record_issue(issue);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn statistics_cover_every_key_with_consistent_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let stats = draw_statistics(&mut rng);
            assert_eq!(stats.len(), STAT_KEYS.len());
            let total = stats.iter().find(|(key, _)| *key == "total_battles").map(|s| s.1);
            let won = stats.iter().find(|(key, _)| *key == "battles_won").map(|s| s.1);
            assert!(won.expect("won") <= total.expect("total"));
        }
    }
}
