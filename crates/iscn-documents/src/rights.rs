use std::sync::Arc;

use iscn_schema::{Property, Schema, SchemaBuilder, SchemaResult};

use crate::{codec, right};

pub const SCHEMA_NAME: &str = "rights";

/// Rights v1: the list of rights of one work.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::RIGHTS, SCHEMA_NAME, 1)
        .property(Property::array(
            "rights",
            true,
            Property::object("right", true, right::schema_v1()?),
        ))
        .build()
}

pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
