//! Fixed vocabularies and content templates.

use realmseed_core::{LevelType, QuestType};

pub const QUEST_ENEMIES: &[&str] = &["goblin", "wolf", "bandit", "skeleton", "troll", "dragon"];
pub const QUEST_LOCATIONS: &[&str] = &["forest", "cave", "castle", "village", "desert", "snowfield"];
/// Item ids from the reference data; quest objectives and rewards use them.
pub const QUEST_ITEMS: &[&str] = &[
    "iron_ore",
    "magic_crystal",
    "venom_essence",
    "fire_essence",
    "gold_coin",
    "gemstone",
];

pub const LEVEL_ENEMIES: &[&str] = &[
    "goblin", "wolf", "bandit", "skeleton", "troll", "dragon", "demon", "angel",
];
pub const LEVEL_LOCATIONS: &[&str] = &[
    "forest", "cave", "castle", "village", "desert", "snowfield", "dungeon", "temple",
];
pub const LEVEL_REWARD_ITEMS: &[&str] = &["iron_sword", "magic_staff", "health_potion", "mana_potion"];

pub const OPPONENT_TYPES: &[&str] = &["goblin", "wolf", "bandit", "skeleton", "boss", "player"];
pub const BATTLE_SKILLS: &[&str] = &["basic_attack", "heavy_strike", "fireball", "stealth"];
pub const BATTLE_DROPS: &[&str] = &["health_potion", "mana_potion", "iron_ore"];

pub const LOG_MESSAGES: &[&str] = &[
    "Character leveled up",
    "Battle won",
    "Quest completed",
    "Item obtained",
    "Equipment damaged",
    "Skill learned",
    "Level unlocked",
    "Achievement unlocked",
    "Game saved",
    "Game started",
];

pub const GRAPHICS_QUALITY: &[&str] = &["low", "medium", "high"];

/// Statistic keys written for every character.
pub const STAT_KEYS: &[&str] = &[
    "total_battles",
    "battles_won",
    "total_experience_gained",
    "max_combo",
    "items_collected",
    "quests_completed",
    "levels_completed",
];

/// One objective: `(field, template)` pairs.
pub type ObjectiveTemplate = &'static [(&'static str, &'static str)];

#[derive(Debug, Clone, Copy)]
pub struct QuestTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub quest_type: QuestType,
    pub objectives: &'static [ObjectiveTemplate],
}

pub const QUEST_TEMPLATES: &[QuestTemplate] = &[
    QuestTemplate {
        key: "kill",
        title: "Defeat the {enemy}",
        description: "Defeat {count} {enemy} in the {location}",
        quest_type: QuestType::Main,
        objectives: &[&[("type", "kill"), ("target", "{enemy}"), ("count", "{count}")]],
    },
    QuestTemplate {
        key: "collect",
        title: "Collect {item}",
        description: "Collect {count} {item}",
        quest_type: QuestType::Side,
        objectives: &[&[("type", "collect"), ("item", "{item}"), ("count", "{count}")]],
    },
    QuestTemplate {
        key: "explore",
        title: "Explore the {location}",
        description: "Explore the {location} region",
        quest_type: QuestType::Exploration,
        objectives: &[&[("type", "reach"), ("location", "{location}")]],
    },
];

#[derive(Debug, Clone, Copy)]
pub struct LevelTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level_type: LevelType,
}

pub const LEVEL_TEMPLATES: &[LevelTemplate] = &[
    LevelTemplate {
        key: "explore",
        name: "{location} Expedition",
        description: "Explore the {location} and defeat the enemies you meet",
        level_type: LevelType::Main,
    },
    LevelTemplate {
        key: "lair",
        name: "{enemy} Lair",
        description: "Descend into the {enemy} lair and defeat its leader",
        level_type: LevelType::Boss,
    },
    LevelTemplate {
        key: "challenge",
        name: "{location} Trial",
        description: "Complete the challenge set in the {location}",
        level_type: LevelType::Challenge,
    },
];

pub fn quest_template(key: &str) -> Option<&'static QuestTemplate> {
    QUEST_TEMPLATES.iter().find(|template| template.key == key)
}
