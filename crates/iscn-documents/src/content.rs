use std::sync::Arc;

use iscn_schema::validation::validate_parent;
use iscn_schema::{NumberKind, Property, Schema, SchemaBuilder, SchemaResult};

use crate::codec;

pub const SCHEMA_NAME: &str = "content";

/// Content v1: what the work is. Version 1 has no parent; every later
/// version links to the one it supersedes.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::CONTENT, SCHEMA_NAME, 1)
        .property(Property::text("type", true))
        .property(Property::number("version", true, NumberKind::Uint64))
        .property(Property::link("parent", false, Some(codec::CONTENT)))
        .property(Property::url("source", false))
        .property(Property::text("edition", false))
        .property(Property::hash_uri("fingerprint", true))
        .property(Property::text("title", true))
        .property(Property::text("description", false))
        .property(Property::array("tags", false, Property::text("_", false)))
        .validator(validate_parent("version", "parent"))
        .build()
}

pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
