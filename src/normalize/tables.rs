//! Static name-mapping tables, one per field domain.
//!
//! Each table lists the canonical keys of its domain in output order, the many-to-one
//! spellings found in source data, and the order in which entry value keys are consulted.

use serde::{Deserialize, Serialize};

/// The kinds of composite field the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDomain {
    Attack,
    Guard,
    ArmorDefense,
    Resistance,
    Scaling,
    Requirement,
    CharacterStats,
}

impl FieldDomain {
    pub const ALL: [FieldDomain; 7] = [
        FieldDomain::Attack,
        FieldDomain::Guard,
        FieldDomain::ArmorDefense,
        FieldDomain::Resistance,
        FieldDomain::Scaling,
        FieldDomain::Requirement,
        FieldDomain::CharacterStats,
    ];

    /// The table every call site uses for this domain.
    pub fn table(self) -> &'static NameTable {
        match self {
            FieldDomain::Attack => &ATTACK_TABLE,
            FieldDomain::Guard => &GUARD_TABLE,
            FieldDomain::ArmorDefense => &ARMOR_DEFENSE_TABLE,
            FieldDomain::Resistance => &RESISTANCE_TABLE,
            FieldDomain::Scaling => &SCALING_TABLE,
            FieldDomain::Requirement => &REQUIREMENT_TABLE,
            FieldDomain::CharacterStats => &CHARACTER_STATS_TABLE,
        }
    }
}

/// How values under a canonical key are coerced after reshaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Coerced to a float.
    Number,
    /// Letter grade, trimmed and upper-cased.
    Grade,
    /// Kept as a nested structure.
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalKey {
    pub name: &'static str,
    pub kind: ValueKind,
}

const fn number(name: &'static str) -> CanonicalKey {
    CanonicalKey {
        name,
        kind: ValueKind::Number,
    }
}

const fn grade(name: &'static str) -> CanonicalKey {
    CanonicalKey {
        name,
        kind: ValueKind::Grade,
    }
}

const fn nested(name: &'static str) -> CanonicalKey {
    CanonicalKey {
        name,
        kind: ValueKind::Nested,
    }
}

/// Name-mapping table for one domain.
#[derive(Debug)]
pub struct NameTable {
    pub domain: FieldDomain,
    /// Canonical keys in output order.
    pub keys: &'static [CanonicalKey],
    /// `(source spelling, canonical key)` pairs, applied in this order.
    pub aliases: &'static [(&'static str, &'static str)],
    /// Entry value keys in priority order.
    pub value_keys: &'static [&'static str],
}

impl NameTable {
    /// Canonical key for a source spelling, if the table knows it.
    pub fn lookup(&self, source: &str) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == source)
            .map(|(_, canonical)| *canonical)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k.name == key)
    }

    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.keys.iter().find(|k| k.name == key).map(|k| k.kind)
    }

    pub fn key_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keys.iter().map(|k| k.name)
    }
}

const AMOUNT_FIRST: &[&str] = &["amount", "scaling"];
const SCALING_FIRST: &[&str] = &["scaling", "amount"];

const ATTRIBUTE_ALIASES: &[(&str, &str)] = &[
    ("Str", "strength"),
    ("Strength", "strength"),
    ("Dex", "dexterity"),
    ("Dexterity", "dexterity"),
    ("Int", "intelligence"),
    ("Intelligence", "intelligence"),
    ("Fai", "faith"),
    ("Faith", "faith"),
    ("Arc", "arcane"),
    ("Arcane", "arcane"),
];

pub static ATTACK_TABLE: NameTable = NameTable {
    domain: FieldDomain::Attack,
    keys: &[
        number("physical"),
        number("magic"),
        number("fire"),
        number("lightning"),
        number("holy"),
        number("critical"),
        nested("status_effects"),
    ],
    aliases: &[
        ("Phy", "physical"),
        ("Physical", "physical"),
        ("Mag", "magic"),
        ("Magic", "magic"),
        ("Fire", "fire"),
        ("Ligt", "lightning"),
        ("Light", "lightning"),
        ("Lightning", "lightning"),
        ("Holy", "holy"),
        ("Crit", "critical"),
        ("Critical", "critical"),
        ("Status", "status_effects"),
        ("Status Effects", "status_effects"),
    ],
    value_keys: AMOUNT_FIRST,
};

pub static GUARD_TABLE: NameTable = NameTable {
    domain: FieldDomain::Guard,
    keys: &[
        number("physical"),
        number("magic"),
        number("fire"),
        number("lightning"),
        number("holy"),
        number("boost"),
    ],
    aliases: &[
        ("Phy", "physical"),
        ("Physical", "physical"),
        ("Mag", "magic"),
        ("Magic", "magic"),
        ("Fire", "fire"),
        ("Ligt", "lightning"),
        ("Light", "lightning"),
        ("Lightning", "lightning"),
        ("Holy", "holy"),
        ("Boost", "boost"),
        ("Guard Boost", "boost"),
        ("Grd Boost", "boost"),
    ],
    value_keys: AMOUNT_FIRST,
};

pub static ARMOR_DEFENSE_TABLE: NameTable = NameTable {
    domain: FieldDomain::ArmorDefense,
    keys: &[
        number("physical"),
        number("strike"),
        number("slash"),
        number("pierce"),
        number("magic"),
        number("fire"),
        number("lightning"),
        number("holy"),
    ],
    aliases: &[
        ("Phy", "physical"),
        ("Physical", "physical"),
        ("Strike", "strike"),
        ("VS Strike", "strike"),
        ("Slash", "slash"),
        ("VS Slash", "slash"),
        ("Pierce", "pierce"),
        ("VS Pierce", "pierce"),
        ("Mag", "magic"),
        ("Magic", "magic"),
        ("Fire", "fire"),
        ("Ligt", "lightning"),
        ("Light", "lightning"),
        ("Lightning", "lightning"),
        ("Holy", "holy"),
    ],
    value_keys: AMOUNT_FIRST,
};

pub static RESISTANCE_TABLE: NameTable = NameTable {
    domain: FieldDomain::Resistance,
    keys: &[
        number("immunity"),
        number("robustness"),
        number("focus"),
        number("vitality"),
        number("poise"),
    ],
    aliases: &[
        ("Immunity", "immunity"),
        ("Immun", "immunity"),
        ("Robustness", "robustness"),
        ("Robust", "robustness"),
        ("Focus", "focus"),
        ("Vitality", "vitality"),
        ("Vital", "vitality"),
        ("Poise", "poise"),
    ],
    value_keys: AMOUNT_FIRST,
};

pub static SCALING_TABLE: NameTable = NameTable {
    domain: FieldDomain::Scaling,
    keys: &[
        grade("strength"),
        grade("dexterity"),
        grade("intelligence"),
        grade("faith"),
        grade("arcane"),
    ],
    aliases: ATTRIBUTE_ALIASES,
    value_keys: SCALING_FIRST,
};

pub static REQUIREMENT_TABLE: NameTable = NameTable {
    domain: FieldDomain::Requirement,
    keys: &[
        number("strength"),
        number("dexterity"),
        number("intelligence"),
        number("faith"),
        number("arcane"),
    ],
    aliases: ATTRIBUTE_ALIASES,
    value_keys: SCALING_FIRST,
};

pub static CHARACTER_STATS_TABLE: NameTable = NameTable {
    domain: FieldDomain::CharacterStats,
    keys: &[
        number("level"),
        number("vigor"),
        number("mind"),
        number("endurance"),
        number("strength"),
        number("dexterity"),
        number("intelligence"),
        number("faith"),
        number("arcane"),
    ],
    aliases: &[
        ("Lvl", "level"),
        ("Level", "level"),
        ("Vig", "vigor"),
        ("Vigor", "vigor"),
        ("Min", "mind"),
        ("Mind", "mind"),
        ("End", "endurance"),
        ("Endurance", "endurance"),
        ("Str", "strength"),
        ("Strength", "strength"),
        ("Dex", "dexterity"),
        ("Dexterity", "dexterity"),
        ("Int", "intelligence"),
        ("Intelligence", "intelligence"),
        ("Fai", "faith"),
        ("Faith", "faith"),
        ("Arc", "arcane"),
        ("Arcane", "arcane"),
    ],
    value_keys: AMOUNT_FIRST,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_targets_a_canonical_key() {
        for domain in FieldDomain::ALL {
            let table = domain.table();
            assert_eq!(table.domain, domain);
            for (alias, canonical) in table.aliases {
                assert!(
                    table.has_key(canonical),
                    "{:?}: {} maps to unknown key {}",
                    domain,
                    alias,
                    canonical
                );
            }
        }
    }

    #[test]
    fn no_alias_shadows_a_canonical_key() {
        for domain in FieldDomain::ALL {
            let table = domain.table();
            for (alias, _) in table.aliases {
                assert!(!table.has_key(alias), "{:?}: alias {} is a key", domain, alias);
            }
        }
    }

    #[test]
    fn value_key_priority_per_domain() {
        assert_eq!(SCALING_TABLE.value_keys, &["scaling", "amount"]);
        assert_eq!(REQUIREMENT_TABLE.value_keys, &["scaling", "amount"]);
        for domain in FieldDomain::ALL {
            if !matches!(domain, FieldDomain::Scaling | FieldDomain::Requirement) {
                assert_eq!(domain.table().value_keys[0], "amount");
            }
        }
    }

    #[test]
    fn lookup_and_kinds() {
        assert_eq!(ATTACK_TABLE.lookup("Ligt"), Some("lightning"));
        assert_eq!(ATTACK_TABLE.lookup("ligt"), None);
        assert_eq!(CHARACTER_STATS_TABLE.lookup("Min"), Some("mind"));
        assert_eq!(ATTACK_TABLE.kind_of("status_effects"), Some(ValueKind::Nested));
        assert_eq!(SCALING_TABLE.kind_of("faith"), Some(ValueKind::Grade));
        assert_eq!(REQUIREMENT_TABLE.kind_of("faith"), Some(ValueKind::Number));
        assert_eq!(GUARD_TABLE.key_names().count(), 6);
    }
}
