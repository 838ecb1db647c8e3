use std::sync::Arc;

use iscn_schema::validation::require_any;
use iscn_schema::{Property, Schema, SchemaBuilder, SchemaResult};

use crate::codec;

pub const SCHEMA_NAME: &str = "timeperiod";

/// Time period v1. At least one bound must be given.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::TIME_PERIOD, SCHEMA_NAME, 1)
        .property(Property::timestamp("from", false))
        .property(Property::timestamp("to", false))
        .validator(require_any(&["from", "to"]))
        .build()
}

pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
