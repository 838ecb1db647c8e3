use std::sync::Arc;

use iscn_schema::{Property, Schema, SchemaBuilder, SchemaResult};

use crate::codec;

pub const SCHEMA_NAME: &str = "entity";

/// Entity v1: a person or organization referenced by rights and
/// stakeholders.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::ENTITY, SCHEMA_NAME, 1)
        .property(Property::text("id", true))
        .property(Property::text("name", false))
        .property(Property::text("description", false))
        .build()
}

/// Every version, v1 first.
pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
