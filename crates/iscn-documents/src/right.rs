use std::sync::Arc;

use iscn_schema::{Property, Schema, SchemaBuilder, SchemaResult};

use crate::{codec, time_period};

pub const SCHEMA_NAME: &str = "right";

/// Right v1: who holds which right under which terms.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::RIGHT, SCHEMA_NAME, 1)
        .property(Property::link("holder", true, Some(codec::ENTITY)))
        .property(Property::text("type", true))
        .property(Property::link("terms", true, None))
        .property(Property::object("period", false, time_period::schema_v1()?))
        .property(Property::text("territory", false))
        .build()
}

pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
