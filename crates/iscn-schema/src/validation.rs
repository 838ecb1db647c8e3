//! Cross-field validators for [`SchemaBuilder::validator`](crate::SchemaBuilder::validator).

use crate::error::{SchemaError, SchemaResult};
use crate::object::SchemaObject;
use crate::property::PropertyHandler;

fn is_defined(object: &SchemaObject, key: &str) -> bool {
    object.property(key).is_some_and(|p| p.is_defined())
}

/// Version 1 forbids a parent link; later versions require one.
pub fn validate_parent(
    version_key: &str,
    parent_key: &str,
) -> impl Fn(&SchemaObject) -> SchemaResult<()> + Send + Sync + 'static {
    let version_key = version_key.to_string();
    let parent_key = parent_key.to_string();
    move |object: &SchemaObject| {
        let version = object.get_u64(&version_key)?;
        let has_parent = is_defined(object, &parent_key);
        if version == 1 && has_parent {
            return Err(SchemaError::ValidationError(format!(
                "{parent_key} should not be set as {version_key} <= 1"
            )));
        }
        if version > 1 && !has_parent {
            return Err(SchemaError::ValidationError(format!(
                "{parent_key} is missing as {version_key} > 1"
            )));
        }
        Ok(())
    }
}

/// At least one of `keys` must be defined.
pub fn require_any(keys: &[&str]) -> impl Fn(&SchemaObject) -> SchemaResult<()> + Send + Sync + 'static {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    move |object: &SchemaObject| {
        if keys.iter().any(|k| is_defined(object, k)) {
            Ok(())
        } else {
            Err(SchemaError::ValidationError(format!(
                "at least one of [{}] must be set",
                keys.join(", ")
            )))
        }
    }
}

/// `dependent_key` is defined exactly when `selector_key` holds
/// `selector_value`.
pub fn require_when(
    selector_key: &str,
    selector_value: &str,
    dependent_key: &str,
) -> impl Fn(&SchemaObject) -> SchemaResult<()> + Send + Sync + 'static {
    let selector_key = selector_key.to_string();
    let selector_value = selector_value.to_string();
    let dependent_key = dependent_key.to_string();
    move |object: &SchemaObject| {
        let selected = object
            .get(&selector_key)
            .and_then(|v| v.as_str())
            .is_some_and(|s| s == selector_value);
        match (selected, is_defined(object, &dependent_key)) {
            (true, false) => Err(SchemaError::ValidationError(format!(
                "{dependent_key} is missing as {selector_key} is {selector_value}"
            ))),
            (false, true) => Err(SchemaError::ValidationError(format!(
                "{dependent_key} should not be set as {selector_key} is not {selector_value}"
            ))),
            _ => Ok(()),
        }
    }
}
