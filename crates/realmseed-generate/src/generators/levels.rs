use rand::Rng;
use serde_json::{Value, json};
use sqlx::{Connection, SqliteConnection};

use realmseed_core::{LevelType, tables};

use crate::errors::{GenerationError, write_error};
use crate::generators::{bump, draw_tokens};
use crate::ids::{pick, sample, unique_id};
use crate::model::RowCounts;
use crate::pool::PoolKind;
use crate::session::GenerationSession;
use crate::template::{TemplateError, TokenSet, render};
use crate::vocab::{LEVEL_ENEMIES, LEVEL_LOCATIONS, LEVEL_REWARD_ITEMS, LEVEL_TEMPLATES, LevelTemplate};

pub const PHASE: &str = "levels";

#[derive(Debug, Clone, PartialEq)]
pub struct LevelDraft {
    pub name: String,
    pub description: String,
    pub level_type: LevelType,
    pub chapter: i64,
    pub difficulty: f64,
    pub level_requirement: i64,
    pub enemies: Value,
    pub rewards: Value,
}

pub fn build_level<R: Rng + ?Sized>(
    template: &LevelTemplate,
    tokens: &TokenSet,
    rng: &mut R,
) -> Result<LevelDraft, TemplateError> {
    let name = render(template.name, tokens)?;
    let description = render(template.description, tokens)?;

    let chapter = rng.random_range(1..=6);
    let difficulty = (rng.random_range(1.0..=3.0_f64) * 100.0).round() / 100.0;
    let level_requirement = rng.random_range(1..=20);

    let enemy_count = rng.random_range(2..=6);
    let enemies: Vec<Value> = (0..enemy_count)
        .map(|_| {
            json!({
                "type": pick(rng, LEVEL_ENEMIES),
                "count": rng.random_range(1..=3),
                "position": [rng.random_range(100..=700), rng.random_range(100..=500)],
            })
        })
        .collect();

    let experience = rng.random_range(100..=1000);
    let gold = rng.random_range(50..=500);
    let reward_count = rng.random_range(1..=3);
    let items: Vec<&str> = sample(rng, LEVEL_REWARD_ITEMS, reward_count)
        .into_iter()
        .copied()
        .collect();

    Ok(LevelDraft {
        name,
        description,
        level_type: template.level_type,
        chapter,
        difficulty,
        level_requirement,
        enemies: Value::Array(enemies),
        rewards: json!({"experience": experience, "gold": gold, "items": items}),
    })
}

pub async fn generate_levels(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);
    let mut taken = session.pools.ids(PoolKind::Levels);

    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    let mut written = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id = unique_id("level", &mut rng, &mut taken);
        let template = pick(&mut rng, LEVEL_TEMPLATES);
        let tokens = draw_tokens(&mut rng, LEVEL_ENEMIES, LEVEL_LOCATIONS);
        let level = build_level(template, &tokens, &mut rng)?;

        sqlx::query(
            "INSERT INTO levels (id, name, description, type, chapter, difficulty, \
             level_requirement, enemies, rewards) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&level.name)
        .bind(&level.description)
        .bind(level.level_type.as_str())
        .bind(level.chapter)
        .bind(level.difficulty)
        .bind(level.level_requirement)
        .bind(level.enemies.to_string())
        .bind(level.rewards.to_string())
        .execute(&mut *tx)
        .await
        .map_err(write_error(PHASE))?;

        written.push(id);
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    session.pools.levels.extend(written);

    let mut counts = RowCounts::new();
    bump(&mut counts, tables::LEVELS, u64::from(count));
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn levels_respect_enemy_and_reward_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let tokens = TokenSet {
            enemy: "troll".into(),
            location: "temple".into(),
            item: "gemstone".into(),
            count: 1,
        };
        for template in LEVEL_TEMPLATES {
            let level = build_level(template, &tokens, &mut rng).expect("build level");
            let enemies = level.enemies.as_array().expect("enemy list");
            assert!((2..=6).contains(&enemies.len()));
            let items = level.rewards["items"].as_array().expect("reward items");
            assert!((1..=3).contains(&items.len()));
            assert!((1.0..=3.0).contains(&level.difficulty));
            assert!(!level.name.contains('{'));
        }
    }
}
