use std::sync::Arc;

use iscn_schema::validation::require_when;
use iscn_schema::{NumberKind, Property, Schema, SchemaBuilder, SchemaResult};

use crate::codec;

pub const SCHEMA_NAME: &str = "stakeholder";

pub const CREATOR: &str = "Creator";
pub const CONTRIBUTOR: &str = "Contributor";
pub const EDITOR: &str = "Editor";
pub const PUBLISHER: &str = "Publisher";
pub const FOOTPRINT: &str = "FootprintStakeholder";
pub const ESCROW: &str = "Escrow";

/// Accepted stakeholder types.
pub const TYPES: [&str; 6] = [CREATOR, CONTRIBUTOR, EDITOR, PUBLISHER, FOOTPRINT, ESCROW];

/// Stakeholder v1.
///
/// `footprint` links to the kernel of the underlying work, or holds a URL
/// when the work lives outside the registry. It is present exactly when the
/// type is `FootprintStakeholder`.
pub fn schema_v1() -> SchemaResult<Arc<Schema>> {
    SchemaBuilder::new(codec::STAKEHOLDER, SCHEMA_NAME, 1)
        .property(Property::filtered("type", true, &TYPES))
        .property(Property::link("stakeholder", true, Some(codec::ENTITY)))
        .property(Property::number("sharing", true, NumberKind::Uint32))
        .property(Property::link_or_text("footprint", false, Some(codec::KERNEL)))
        .validator(require_when("type", FOOTPRINT, "footprint"))
        .build()
}

pub fn schemas() -> SchemaResult<Vec<Arc<Schema>>> {
    Ok(vec![schema_v1()?])
}
