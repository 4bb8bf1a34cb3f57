//! Eligibility queries over the reference data.
//!
//! Candidates are read in id order and chosen with the caller's random
//! stream, so selection is reproducible under a fixed seed.

use rand::Rng;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use realmseed_core::{CharacterClass, EquipmentSlot, Error, ItemType, Result, tables};

use crate::ids::pick;

/// Kind of reference record being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Skill,
    Equipment,
    Item,
}

impl CandidateKind {
    fn table(self) -> &'static str {
        match self {
            CandidateKind::Skill => tables::SKILLS,
            CandidateKind::Equipment => tables::EQUIPMENT,
            CandidateKind::Item => tables::ITEMS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateKind::Skill => "skill",
            CandidateKind::Equipment => "equipment",
            CandidateKind::Item => "item",
        }
    }
}

/// Eligibility predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// `level_requirement <= level`.
    MaxLevel(i64),
    /// Class affinity; equipment without a class requirement also matches.
    Class(CharacterClass),
    Slot(EquipmentSlot),
    ItemTypes(&'static [ItemType]),
}

impl Constraint {
    fn push_sql(&self, kind: CandidateKind, query: &mut QueryBuilder<'_, Sqlite>) -> Result<()> {
        match (self, kind) {
            (Constraint::MaxLevel(level), CandidateKind::Skill | CandidateKind::Equipment) => {
                query.push(" AND level_requirement <= ").push_bind(*level);
            }
            (Constraint::Class(class), CandidateKind::Skill) => {
                query.push(" AND class_requirement = ").push_bind(class.as_str());
            }
            (Constraint::Class(class), CandidateKind::Equipment) => {
                query
                    .push(" AND (class_requirement IS NULL OR class_requirement = ")
                    .push_bind(class.as_str())
                    .push(")");
            }
            (Constraint::Slot(slot), CandidateKind::Equipment) => {
                query.push(" AND slot = ").push_bind(slot.as_str());
            }
            (Constraint::ItemTypes(types), CandidateKind::Item) if !types.is_empty() => {
                query.push(" AND type IN (");
                let mut separated = query.separated(", ");
                for item_type in *types {
                    separated.push_bind(item_type.as_str());
                }
                separated.push_unseparated(")");
            }
            (constraint, kind) => {
                return Err(Error::Other(format!(
                    "constraint {constraint:?} does not apply to {}",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Ids of every candidate satisfying all constraints, ordered by id.
pub async fn candidates(
    conn: &mut SqliteConnection,
    kind: CandidateKind,
    constraints: &[Constraint],
) -> Result<Vec<String>> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM ");
    query.push(kind.table()).push(" WHERE 1 = 1");
    for constraint in constraints {
        constraint.push_sql(kind, &mut query)?;
    }
    query.push(" ORDER BY id");

    query
        .build_query_scalar::<String>()
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| Error::Db(err.to_string()))
}

/// One candidate chosen uniformly, or `None` when nothing is eligible.
pub async fn resolve<R: Rng + ?Sized>(
    conn: &mut SqliteConnection,
    rng: &mut R,
    kind: CandidateKind,
    constraints: &[Constraint],
) -> Result<Option<String>> {
    let eligible = candidates(conn, kind, constraints).await?;
    if eligible.is_empty() {
        return Ok(None);
    }
    Ok(Some(pick(rng, &eligible).clone()))
}
