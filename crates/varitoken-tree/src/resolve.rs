//! Alias resolution.
//!
//! Rewrites every placeholder alias whose variable id is in the [`IdIndex`]
//! into a `{dotted.path}` reference. Only one hop is taken: an alias that
//! names another alias resolves to that alias's path, never to the value
//! behind it, so no chain walking or cycle detection is needed.

use crate::index::IdIndex;
use crate::node::{Group, TokenNode};
use crate::value::LeafValue;

/// An alias whose id was not found in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedAlias {
    /// Dotted path of the aliasing token.
    pub path: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: usize,
    pub unresolved: Vec<UnresolvedAlias>,
}

/// Resolve every alias under `root` against `ids`.
///
/// Already-resolved aliases are looked up again, so running this twice is a
/// no-op.
pub fn resolve_aliases(root: &mut Group, ids: &IdIndex) -> Resolution {
    let mut resolution = Resolution::default();
    let mut prefix = Vec::new();
    walk(root, ids, &mut prefix, &mut resolution);
    resolution
}

fn walk(group: &mut Group, ids: &IdIndex, prefix: &mut Vec<String>, out: &mut Resolution) {
    for (segment, node) in group.children.iter_mut() {
        prefix.push(segment.clone());
        match node {
            TokenNode::Group(child) => walk(child, ids, prefix, out),
            TokenNode::Leaf(leaf) => {
                if let LeafValue::Alias(alias) = &mut leaf.value {
                    match ids.resolve(&alias.id) {
                        Some(target) => {
                            alias.target = Some(target.to_string());
                            out.resolved += 1;
                        }
                        None => {
                            alias.target = None;
                            out.unresolved.push(UnresolvedAlias {
                                path: prefix.join("."),
                                id: alias.id.clone(),
                            });
                        }
                    }
                }
            }
        }
        prefix.pop();
    }
}
