//! Field normalization: decoding string-encoded cells and reshaping them into canonical
//! per-domain maps.

pub mod canonical;
pub mod columns;
pub mod decode;
pub mod field;
pub mod literal;
pub mod tables;

pub use canonical::{
    normalize_as, ArmorDefenseFields, AttackFields, CanonicalField, CharacterStats, DomainFields,
    GuardFields, RequirementFields, ResistanceFields, ScalingFields,
};
pub use columns::ColumnSchema;
pub use decode::{decode, decode_structure, DecodeSource};
pub use field::{normalize, normalize_domain, CanonicalMap, RawField};
pub use literal::{parse_literal, LiteralError};
pub use tables::{FieldDomain, NameTable, ValueKind};
