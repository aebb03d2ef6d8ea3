use serde::Deserialize;
use strum_macros::EnumIter as EnumIterMacro;

/// The four hierarchical GeoNames entity kinds.
///
/// Variants are declared in hierarchy order (parents first), so iterating with
/// `EntityKind::iter()` yields the order in which kinds must be supplied.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIterMacro, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Continent,
    Country,
    Division,
    City,
}

impl EntityKind {
    /// Table holding entities of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Continent => "continents",
            EntityKind::Country => "countries",
            EntityKind::Division => "divisions",
            EntityKind::City => "cities",
        }
    }

    /// The kind this kind's rows reference through a required foreign key.
    pub fn parent(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Continent => None,
            EntityKind::Country => Some(EntityKind::Continent),
            EntityKind::Division => Some(EntityKind::Country),
            EntityKind::City => Some(EntityKind::Country),
        }
    }

    /// All kinds, parents first.
    pub fn hierarchy() -> [EntityKind; 4] {
        [
            EntityKind::Continent,
            EntityKind::Country,
            EntityKind::Division,
            EntityKind::City,
        ]
    }

    /// All kinds, children first. Deletes run in this order.
    pub fn reverse_hierarchy() -> [EntityKind; 4] {
        let mut kinds = Self::hierarchy();
        kinds.reverse();
        kinds
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Continent => "continent",
            EntityKind::Country => "country",
            EntityKind::Division => "division",
            EntityKind::City => "city",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
