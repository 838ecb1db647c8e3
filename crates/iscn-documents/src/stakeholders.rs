use std::sync::Arc;

use iscn_schema::{Property, Schema, SchemaBuilder, SchemaResult};

use crate::{codec, stakeholder};

pub const SCHEMA_NAME: &str = "stakeholders";

/// Stakeholders v1: everyone with a share in one work.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::STAKEHOLDERS, SCHEMA_NAME, 1)
        .property(Property::array(
            "stakeholders",
            true,
            Property::object("stakeholder", true, stakeholder::schema_v1()?),
        ))
        .build()
}

pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
