use std::sync::Arc;

use iscn_schema::validation::validate_parent;
use iscn_schema::{NumberKind, Property, Schema, SchemaBuilder, SchemaResult};

use crate::codec;

pub const SCHEMA_NAME: &str = "iscn";

/// Length of the kernel id in bytes.
pub const ID_LEN: usize = 32;

/// Kernel v1: the root of one ISCN record, linking its rights,
/// stakeholders, and content.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::KERNEL, SCHEMA_NAME, 1)
        .property(Property::bytes("id", true, ID_LEN))
        .property(Property::timestamp("timestamp", true))
        .property(Property::number("version", true, NumberKind::Uint64))
        .property(Property::link("parent", false, Some(codec::KERNEL)))
        .property(Property::link("rights", true, Some(codec::RIGHTS)))
        .property(Property::link("stakeholders", true, Some(codec::STAKEHOLDERS)))
        .property(Property::link("content", true, Some(codec::CONTENT)))
        .validator(validate_parent("version", "parent"))
        .build()
}

pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
