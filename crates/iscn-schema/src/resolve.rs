//! Path resolution results.
//!
//! Resolution walks a document along a list of path segments and stops at
//! the first content link, returning a [`Link`] descriptor and the segments
//! that were not consumed. Following the link is the caller's business.

use iscn_types::value::link_to_json;
use iscn_types::{Cid, Value};
use serde_json::Value as Json;

use crate::object::SchemaObject;

/// A content link reached during resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// Key of the field holding the link.
    pub name: String,
    pub cid: Cid,
}

/// What a path resolved to.
#[derive(Clone, Debug)]
pub enum Resolved<'a> {
    /// A whole object, top-level or nested.
    Object(&'a SchemaObject),
    /// A leaf value.
    Value(Value),
    /// A link boundary.
    Link(Link),
    /// Every element of an array, each resolved with an empty path.
    List(Vec<Resolved<'a>>),
}

impl Resolved<'_> {
    /// JSON projection of the resolved node.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Object(object) => object.get_data(),
            Self::Value(value) => value.to_json(),
            Self::Link(link) => link_to_json(&link.cid),
            Self::List(nodes) => Json::Array(nodes.iter().map(Resolved::to_json).collect()),
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Self::Link(link) => Some(link),
            _ => None,
        }
    }
}

/// A resolved node plus the path segments left unconsumed.
///
/// `remaining` is non-empty only when `node` is a link.
#[derive(Clone, Debug)]
pub struct Resolution<'a> {
    pub node: Resolved<'a>,
    pub remaining: Vec<String>,
}

impl<'a> Resolution<'a> {
    /// A node with the whole path consumed.
    pub fn done(node: Resolved<'a>) -> Self {
        Self {
            node,
            remaining: Vec::new(),
        }
    }

    /// A node with `remaining` left to resolve beyond it.
    pub fn partial(node: Resolved<'a>, remaining: &[&str]) -> Self {
        Self {
            node,
            remaining: remaining.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Split a slash-separated path, ignoring empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
