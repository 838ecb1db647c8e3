//! Following content links across stored documents.
//!
//! A single document resolves a path until it reaches a link. The walker
//! loads the linked block, decodes it through the registry (which re-checks
//! the CID), and carries on with the rest of the path.

use std::collections::{HashSet, VecDeque};

use iscn_schema::resolve::split_path;
use iscn_schema::{CodecRegistry, Resolution, Resolved, SchemaObject, SchemaResult};
use iscn_types::Cid;
use serde_json::Value as Json;
use tracing::debug;

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// Where a walk ended: the last document loaded and the path left to
/// resolve inside it.
#[derive(Debug)]
pub struct Walk {
    /// Every document visited, root first.
    pub hops: Vec<Cid>,
    pub document: SchemaObject,
    pub path: Vec<String>,
}

impl Walk {
    /// CID of the document the walk ended in.
    pub fn cid(&self) -> Cid {
        self.hops[self.hops.len() - 1]
    }

    /// Resolve the leftover path inside the final document.
    pub fn resolve(&self) -> SchemaResult<Resolution<'_>> {
        let segments: Vec<&str> = self.path.iter().map(String::as_str).collect();
        self.document.resolve(&segments)
    }
}

/// Loads, stores and walks ISCN documents over a [`BlockStore`].
pub struct DagWalker<'a, S: BlockStore + ?Sized> {
    registry: &'a CodecRegistry,
    store: &'a S,
}

impl<'a, S: BlockStore + ?Sized> DagWalker<'a, S> {
    pub fn new(registry: &'a CodecRegistry, store: &'a S) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &CodecRegistry {
        self.registry
    }

    pub fn store(&self) -> &S {
        self.store
    }

    /// Store an encoded document's block and return its CID.
    pub fn put_document(&self, document: &SchemaObject) -> StoreResult<Cid> {
        let (Some(cid), Some(data)) = (document.cid(), document.raw_data()) else {
            return Err(StoreError::NotEncoded(document.to_string()));
        };
        self.store.put(&Block::new(cid, data.to_vec())?)
    }

    /// Fetch a block and decode it, verifying it re-encodes to `cid`.
    pub fn load(&self, cid: &Cid) -> StoreResult<SchemaObject> {
        let block = self.store.require(cid)?;
        let document = self.registry.decode(block.data(), cid)?;
        debug!(cid = %cid.short_hex(), kind = document.name(), "loaded document");
        Ok(document)
    }

    /// Resolve `path` from `root`, crossing into linked documents whenever
    /// resolution stops at a link with path segments left over.
    ///
    /// A path ending exactly on a link yields the link itself; it is not
    /// followed.
    pub fn walk(&self, root: &Cid, path: &str) -> StoreResult<Walk> {
        let mut hops = vec![*root];
        let mut segments: Vec<String> = split_path(path).into_iter().map(String::from).collect();
        let mut cid = *root;
        loop {
            let document = self.load(&cid)?;
            let next = {
                let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
                let Resolution { node, remaining } = document.resolve(&refs)?;
                match node {
                    Resolved::Link(link) if !remaining.is_empty() => Some((link.cid, remaining)),
                    _ => None,
                }
            };
            match next {
                Some((linked, remaining)) => {
                    debug!(from = %cid.short_hex(), to = %linked.short_hex(), "following link");
                    cid = linked;
                    segments = remaining;
                    hops.push(cid);
                }
                None => {
                    return Ok(Walk {
                        hops,
                        document,
                        path: segments,
                    })
                }
            }
        }
    }

    /// JSON projection of whatever `path` resolves to from `root`.
    pub fn resolve_json(&self, root: &Cid, path: &str) -> StoreResult<Json> {
        let walk = self.walk(root, path)?;
        let json = walk.resolve()?.node.to_json();
        Ok(json)
    }

    /// Every CID reachable from `root` through document links, breadth
    /// first, root included, each once. Fails on the first missing block.
    pub fn reachable(&self, root: &Cid) -> StoreResult<Vec<Cid>> {
        let mut visited = HashSet::new();
        visited.insert(*root);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([*root]);

        while let Some(cid) = queue.pop_front() {
            let document = self.load(&cid)?;
            order.push(cid);
            for link in document.links() {
                if visited.insert(link.cid) {
                    queue.push_back(link.cid);
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBlockStore;
    use iscn_documents::{codec, default_registry};
    use iscn_schema::SchemaError;
    use iscn_types::{Fields, HashAlgorithm, Value};
    use serde_json::json;

    struct Graph {
        registry: CodecRegistry,
        store: InMemoryBlockStore,
        kernel: Cid,
        alice: Cid,
        rights: Cid,
        stakeholders: Cid,
        content: Cid,
    }

    fn encode(registry: &CodecRegistry, store: &InMemoryBlockStore, codec: u64, fields: Fields) -> Cid {
        let document = registry.encode(codec, 1, &fields).unwrap();
        DagWalker::new(registry, store).put_document(&document).unwrap()
    }

    fn graph() -> Graph {
        let registry = default_registry().unwrap();
        let store = InMemoryBlockStore::new();
        let alice = encode(
            &registry,
            &store,
            codec::ENTITY,
            Fields::new().with("id", "likecoin:alice").with("name", "Alice"),
        );
        let right = Fields::new()
            .with("holder", alice)
            .with("type", "License")
            .with("terms", alice);
        let rights = encode(
            &registry,
            &store,
            codec::RIGHTS,
            Fields::new().with("rights", Value::Array(vec![Value::Map(right)])),
        );
        let stakeholder = Fields::new()
            .with("type", "Creator")
            .with("stakeholder", alice)
            .with("sharing", 100u32);
        let stakeholders = encode(
            &registry,
            &store,
            codec::STAKEHOLDERS,
            Fields::new().with("stakeholders", Value::Array(vec![Value::Map(stakeholder)])),
        );
        let content = encode(
            &registry,
            &store,
            codec::CONTENT,
            Fields::new()
                .with("type", "article")
                .with("version", 1)
                .with("fingerprint", "hash://sha256/00ff")
                .with("title", "Walked"),
        );
        let kernel = encode(
            &registry,
            &store,
            codec::KERNEL,
            Fields::new()
                .with("id", Value::Bytes(vec![7; 32]))
                .with("timestamp", "2024-03-01T12:00:00Z")
                .with("version", 1)
                .with("rights", rights)
                .with("stakeholders", stakeholders)
                .with("content", content),
        );
        Graph {
            registry,
            store,
            kernel,
            alice,
            rights,
            stakeholders,
            content,
        }
    }

    #[test]
    fn load_verifies_and_decodes() {
        let g = graph();
        let walker = DagWalker::new(&g.registry, &g.store);
        let kernel = walker.load(&g.kernel).unwrap();
        assert_eq!(kernel.name(), "iscn");
        assert_eq!(kernel.get_link("content").unwrap(), g.content);
    }

    #[test]
    fn walks_across_documents() {
        let g = graph();
        let walker = DagWalker::new(&g.registry, &g.store);

        let walk = walker.walk(&g.kernel, "rights/rights/0/holder/name").unwrap();
        assert_eq!(walk.hops, vec![g.kernel, g.rights, g.alice]);
        assert_eq!(walk.cid(), g.alice);
        assert_eq!(walk.path, vec!["name".to_string()]);

        assert_eq!(
            walker
                .resolve_json(&g.kernel, "rights/rights/0/holder/name")
                .unwrap(),
            json!("Alice")
        );
        assert_eq!(
            walker.resolve_json(&g.kernel, "content/title").unwrap(),
            json!("Walked")
        );
    }

    #[test]
    fn path_ending_on_link_is_not_followed() {
        let g = graph();
        let walker = DagWalker::new(&g.registry, &g.store);
        let walk = walker.walk(&g.kernel, "stakeholders").unwrap();
        assert_eq!(walk.hops, vec![g.kernel]);
        assert_eq!(
            walker.resolve_json(&g.kernel, "stakeholders").unwrap(),
            json!({"/": g.stakeholders.to_string()})
        );
    }

    #[test]
    fn empty_path_is_the_root_document() {
        let g = graph();
        let walker = DagWalker::new(&g.registry, &g.store);
        let json = walker.resolve_json(&g.kernel, "").unwrap();
        assert_eq!(json["context"], "https://iscn/iscn-v1");
        assert_eq!(json["version"], 1);
    }

    #[test]
    fn reachable_is_breadth_first_and_deduplicated() {
        let g = graph();
        let walker = DagWalker::new(&g.registry, &g.store);
        let cids = walker.reachable(&g.kernel).unwrap();
        assert_eq!(
            cids,
            vec![g.kernel, g.rights, g.stakeholders, g.content, g.alice]
        );
    }

    #[test]
    fn missing_block_is_not_found() {
        let g = graph();
        g.store.delete(&g.alice).unwrap();
        let walker = DagWalker::new(&g.registry, &g.store);
        assert!(matches!(
            walker.reachable(&g.kernel),
            Err(StoreError::NotFound(c)) if c == g.alice
        ));
        assert!(matches!(
            walker.walk(&g.kernel, "rights/rights/0/holder/name"),
            Err(StoreError::NotFound(_))
        ));
        // Resolving inside documents that are present still works.
        walker.resolve_json(&g.kernel, "rights/rights/0/type").unwrap();
    }

    #[test]
    fn bad_paths_surface_schema_errors() {
        let g = graph();
        let walker = DagWalker::new(&g.registry, &g.store);
        assert!(matches!(
            walker.walk(&g.kernel, "nothing"),
            Err(StoreError::Schema(SchemaError::NoSuchLink(_)))
        ));
        assert!(matches!(
            walker.walk(&g.kernel, "rights/rights/5"),
            Err(StoreError::Schema(SchemaError::IndexOutOfRange { index: 5, .. }))
        ));
    }

    #[test]
    fn unencoded_documents_cannot_be_stored() {
        let g = graph();
        let walker = DagWalker::new(&g.registry, &g.store);
        let fresh = g.registry.instantiate(codec::ENTITY, 1).unwrap();
        assert!(matches!(
            walker.put_document(&fresh),
            Err(StoreError::NotEncoded(_))
        ));
    }

    #[test]
    fn blocks_stored_under_wrong_codec_fail_decode() {
        let g = graph();
        let block = g.store.require(&g.alice).unwrap();
        let hasher = iscn_crypto::ContentHasher::new(HashAlgorithm::Blake3);
        let disguised = Block::from_data(&hasher, codec::CONTENT, block.into_data());
        let cid = g.store.put(&disguised).unwrap();
        let walker = DagWalker::new(&g.registry, &g.store);
        assert!(matches!(walker.load(&cid), Err(StoreError::Schema(_))));
    }
}
