use rand::Rng;
use serde_json::{Map, Value, json};
use sqlx::{Connection, SqliteConnection};

use realmseed_core::{QuestType, tables};

use crate::errors::{GenerationError, write_error};
use crate::generators::{bump, draw_tokens};
use crate::ids::{pick, sample, unique_id};
use crate::model::RowCounts;
use crate::pool::{PoolKind, QuestRef};
use crate::session::GenerationSession;
use crate::template::{TemplateError, TokenSet, render, render_value};
use crate::vocab::{QUEST_ENEMIES, QUEST_ITEMS, QUEST_LOCATIONS, QUEST_TEMPLATES, QuestTemplate};

pub const PHASE: &str = "quests";

#[derive(Debug, Clone, PartialEq)]
pub struct QuestDraft {
    pub title: String,
    pub description: String,
    pub quest_type: QuestType,
    pub chapter: i64,
    pub level_requirement: i64,
    pub objectives: Value,
    pub rewards: Value,
}

/// Render a quest from `template`; the same tokens fill the title, the
/// description, and every objective field.
pub fn build_quest<R: Rng + ?Sized>(
    template: &QuestTemplate,
    tokens: &TokenSet,
    rng: &mut R,
) -> Result<QuestDraft, TemplateError> {
    let title = render(template.title, tokens)?;
    let description = render(template.description, tokens)?;

    let mut objectives = Vec::with_capacity(template.objectives.len());
    for objective in template.objectives {
        let mut fields = Map::new();
        for (field, value) in *objective {
            fields.insert(field.to_string(), render_value(value, tokens)?);
        }
        objectives.push(Value::Object(fields));
    }

    let reward_count = rng.random_range(0..=2);
    let reward_items: Vec<&str> = sample(rng, QUEST_ITEMS, reward_count)
        .into_iter()
        .copied()
        .collect();

    Ok(QuestDraft {
        title,
        description,
        quest_type: template.quest_type,
        chapter: rng.random_range(1..=6),
        level_requirement: rng.random_range(1..=20),
        objectives: Value::Array(objectives),
        rewards: json!({
            "experience": rng.random_range(50..=500),
            "gold": rng.random_range(20..=200),
            "items": reward_items,
        }),
    })
}

pub async fn generate_quests(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);
    let mut taken = session.pools.ids(PoolKind::Quests);

    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    let mut written = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id = unique_id("quest", &mut rng, &mut taken);
        let template = pick(&mut rng, QUEST_TEMPLATES);
        let tokens = draw_tokens(&mut rng, QUEST_ENEMIES, QUEST_LOCATIONS);
        let quest = build_quest(template, &tokens, &mut rng)?;

        sqlx::query(
            "INSERT INTO quests (id, title, description, type, chapter, level_requirement, \
             objectives, rewards) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&quest.title)
        .bind(&quest.description)
        .bind(quest.quest_type.as_str())
        .bind(quest.chapter)
        .bind(quest.level_requirement)
        .bind(quest.objectives.to_string())
        .bind(quest.rewards.to_string())
        .execute(&mut *tx)
        .await
        .map_err(write_error(PHASE))?;

        let objective_count = quest.objectives.as_array().map_or(0, Vec::len) as i64;
        written.push(QuestRef {
            id,
            objective_count,
        });
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    session.pools.quests.extend(written);

    let mut counts = RowCounts::new();
    bump(&mut counts, tables::QUESTS, u64::from(count));
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::quest_template;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tokens(item: &str, count: u32) -> TokenSet {
        TokenSet {
            enemy: "wolf".to_string(),
            location: "cave".to_string(),
            item: item.to_string(),
            count,
        }
    }

    #[test]
    fn collect_template_fills_objective_and_description() {
        let template = quest_template("collect").expect("collect template");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let quest = build_quest(template, &tokens("iron_ore", 3), &mut rng).expect("build quest");

        let objectives = quest.objectives.as_array().expect("objective list");
        assert_eq!(objectives.len(), 1);
        assert_eq!(objectives[0]["type"], "collect");
        assert_eq!(objectives[0]["item"], "iron_ore");
        assert_eq!(objectives[0]["count"], 3);
        assert!(quest.description.contains("iron_ore"));
        assert!(quest.description.contains('3'));
        assert_eq!(quest.quest_type, QuestType::Side);
    }

    #[test]
    fn objective_arity_matches_template() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for template in QUEST_TEMPLATES {
            let quest = build_quest(template, &tokens("gemstone", 2), &mut rng).expect("build");
            let objectives = quest.objectives.as_array().expect("objective list");
            assert_eq!(objectives.len(), template.objectives.len());
            let rewards = quest.rewards["items"].as_array().expect("reward items");
            assert!(rewards.len() <= 2);
        }
    }
}
