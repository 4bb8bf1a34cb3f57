use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Declares a closed string vocabulary stored as TEXT in the catalog.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
            /// Stored representation of every variant, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::Other(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

vocabulary! {
    /// Playable character class.
    CharacterClass {
        Warrior => "warrior",
        Mage => "mage",
        Assassin => "assassin",
    }
}

vocabulary! {
    /// Equipment slot on a character.
    EquipmentSlot {
        Weapon => "weapon",
        Head => "head",
        Chest => "chest",
        Legs => "legs",
        Feet => "feet",
        Ring => "ring",
        Amulet => "amulet",
    }
}

vocabulary! {
    ItemType {
        Consumable => "consumable",
        Material => "material",
        Quest => "quest",
        Currency => "currency",
    }
}

vocabulary! {
    Rarity {
        Common => "common",
        Uncommon => "uncommon",
        Rare => "rare",
        Epic => "epic",
        Legendary => "legendary",
    }
}

vocabulary! {
    QuestType {
        Main => "main",
        Side => "side",
        Exploration => "exploration",
    }
}

vocabulary! {
    /// Progress of a character on a quest.
    QuestStatus {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

vocabulary! {
    LevelType {
        Main => "main",
        Boss => "boss",
        Challenge => "challenge",
    }
}

vocabulary! {
    /// Progress of a character on a level.
    LevelStatus {
        Locked => "locked",
        Unlocked => "unlocked",
        Completed => "completed",
        Perfect => "perfect",
    }
}

vocabulary! {
    BattleType {
        Level => "level",
        Arena => "arena",
        Boss => "boss",
        Pvp => "pvp",
    }
}

vocabulary! {
    BattleResult {
        Victory => "victory",
        Defeat => "defeat",
        Draw => "draw",
    }
}

vocabulary! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warning => "warning",
        Error => "error",
    }
}

vocabulary! {
    LogCategory {
        Combat => "combat",
        Quest => "quest",
        Level => "level",
        System => "system",
        User => "user",
    }
}

impl LevelStatus {
    /// Completed levels carry timing, score, and star data.
    pub const fn is_cleared(self) -> bool {
        matches!(self, LevelStatus::Completed | LevelStatus::Perfect)
    }
}

/// Closed integer interval used for stat draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub min: i64,
    pub max: i64,
}

impl Band {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn range(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }
}

/// Class-specific bands for the four primary stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBands {
    pub health: Band,
    pub mana: Band,
    pub attack: Band,
    pub defense: Band,
}

const WARRIOR_BANDS: StatBands = StatBands {
    health: Band::new(120, 150),
    mana: Band::new(30, 50),
    attack: Band::new(20, 25),
    defense: Band::new(15, 20),
};

const MAGE_BANDS: StatBands = StatBands {
    health: Band::new(80, 100),
    mana: Band::new(80, 120),
    attack: Band::new(10, 15),
    defense: Band::new(8, 12),
};

const ASSASSIN_BANDS: StatBands = StatBands {
    health: Band::new(90, 110),
    mana: Band::new(40, 60),
    attack: Band::new(25, 30),
    defense: Band::new(10, 15),
};

impl CharacterClass {
    pub const fn stat_bands(self) -> StatBands {
        match self {
            CharacterClass::Warrior => WARRIOR_BANDS,
            CharacterClass::Mage => MAGE_BANDS,
            CharacterClass::Assassin => ASSASSIN_BANDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for status in QuestStatus::ALL {
            let parsed: QuestStatus = status.as_str().parse().expect("parse status");
            assert_eq!(parsed, *status);
        }
        assert!("paused".parse::<QuestStatus>().is_err());
    }

    #[test]
    fn class_bands_do_not_overlap_on_health() {
        let warrior = CharacterClass::Warrior.stat_bands().health;
        let mage = CharacterClass::Mage.stat_bands().health;
        assert!(mage.max < warrior.min);
        assert!(warrior.contains(120));
        assert!(!warrior.contains(151));
    }
}
