//! Shared fixtures for unit tests.

use std::sync::Arc;

use iscn_types::{Cid, Fields, HashAlgorithm, Value};

use crate::property::{NumberKind, Property};
use crate::registry::CodecRegistry;
use crate::schema::{Schema, SchemaBuilder};
use crate::validation::{require_any, validate_parent};

pub const WORK: u64 = 0x0264;
pub const ENTITY: u64 = 0x0268;

pub fn entity_cid() -> Cid {
    Cid::new(ENTITY, HashAlgorithm::Blake3, [0x11; 32])
}

pub fn period_schema() -> Arc<Schema> {
    SchemaBuilder::new(0x033f, "period", 1)
        .property(Property::timestamp("from", false))
        .property(Property::timestamp("to", false))
        .validator(require_any(&["from", "to"]))
        .build()
        .unwrap()
}

pub fn work_schema() -> Arc<Schema> {
    SchemaBuilder::new(WORK, "work", 1)
        .property(Property::text("title", true))
        .property(Property::number("version", true, NumberKind::Uint64))
        .property(Property::link("parent", false, Some(WORK)))
        .property(Property::timestamp("timestamp", true))
        .property(Property::link("author", true, Some(ENTITY)))
        .property(Property::array("tags", false, Property::text("tag", true)))
        .property(Property::object("period", false, period_schema()))
        .property(Property::number("sharing", false, NumberKind::Int32))
        .validator(validate_parent("version", "parent"))
        .build()
        .unwrap()
}

pub fn work_v2_schema() -> Arc<Schema> {
    SchemaBuilder::new(WORK, "work", 2)
        .property(Property::text("title", true))
        .property(Property::text("subtitle", false))
        .build()
        .unwrap()
}

pub fn entity_schema() -> Arc<Schema> {
    SchemaBuilder::new(ENTITY, "entity", 1)
        .property(Property::text("id", true))
        .property(Property::text("name", false))
        .build()
        .unwrap()
}

pub fn work_input() -> Fields {
    Fields::new()
        .with("title", "A Title")
        .with("version", 1)
        .with("timestamp", "2024-03-01T12:00:00Z")
        .with("author", entity_cid())
        .with(
            "tags",
            Value::Array(vec![Value::from("a"), Value::from("b")]),
        )
}

pub fn registry() -> CodecRegistry {
    let mut registry = CodecRegistry::new();
    registry.register_schemas(WORK, "work", vec![work_schema(), work_v2_schema()]);
    registry.register_schemas(ENTITY, "entity", vec![entity_schema()]);
    registry
}
