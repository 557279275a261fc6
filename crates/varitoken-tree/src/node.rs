//! Token tree nodes.
//!
//! A mode's tokens form a tree of [`Group`]s whose leaves are [`Leaf`] tokens.
//! Children keep first-insertion order, which is also the order they are
//! written out in.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::path::TokenPath;
use crate::value::{types, LeafValue};

/// Key carrying a node's type in the serialized document.
pub const TYPE_KEY: &str = "$type";
/// Key carrying a leaf's value in the serialized document.
pub const VALUE_KEY: &str = "$value";

#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Group(Group),
    Leaf(Leaf),
}

impl TokenNode {
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            TokenNode::Group(group) => Some(group),
            TokenNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            TokenNode::Leaf(leaf) => Some(leaf),
            TokenNode::Group(_) => None,
        }
    }
}

/// A typed design token.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub token_type: String,
    pub value: LeafValue,
}

/// A named collection of tokens and nested groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    /// Type hint for descendants that don't carry their own.
    pub token_type: Option<String>,
    pub children: IndexMap<String, TokenNode>,
}

/// The root group of one mode's document.
pub type ModeTree = Group;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("token path is empty")]
    EmptyPath,
    #[error("`{path}` is already a token, cannot nest `{wanted}` under it")]
    LeafInPath { path: String, wanted: String },
    #[error("`{path}` is already a group, cannot make it a token")]
    GroupAtLeaf { path: String },
    #[error("segment `{segment}` in `{path}` collides with a reserved `$` key")]
    ReservedSegment { path: String, segment: String },
}

/// Outcome of a successful [`Group::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Created,
    /// An existing leaf at the same path was overwritten.
    Replaced,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `leaf` at `path`, creating intermediate groups as needed.
    ///
    /// A leaf already at `path` is overwritten in place (its position among
    /// its siblings is kept). The leaf's parent group adopts `hint` as its
    /// `$type` when it has none and the hint is a scalar kind. Pass `None` for
    /// rows whose type was defaulted rather than declared.
    pub fn insert(
        &mut self,
        path: &TokenPath,
        leaf: Leaf,
        hint: Option<&str>,
    ) -> Result<Insertion, TreeError> {
        let (last, parents) = path.segments().split_last().ok_or(TreeError::EmptyPath)?;

        if let Some(segment) = path.segments().iter().find(|s| s.starts_with('$')) {
            return Err(TreeError::ReservedSegment {
                path: path.dotted(),
                segment: segment.clone(),
            });
        }

        let mut cursor = self;
        for (depth, segment) in parents.iter().enumerate() {
            let child = cursor
                .children
                .entry(segment.clone())
                .or_insert_with(|| TokenNode::Group(Group::new()));
            cursor = match child {
                TokenNode::Group(group) => group,
                TokenNode::Leaf(_) => {
                    return Err(TreeError::LeafInPath {
                        path: path.prefix(depth + 1).dotted(),
                        wanted: path.dotted(),
                    })
                }
            };
        }

        if let Some(TokenNode::Group(_)) = cursor.children.get(last) {
            return Err(TreeError::GroupAtLeaf {
                path: path.dotted(),
            });
        }

        if cursor.token_type.is_none() {
            if let Some(hint) = hint.filter(|h| types::is_group_hint(h)) {
                cursor.token_type = Some(hint.to_string());
            }
        }

        match cursor.children.insert(last.clone(), TokenNode::Leaf(leaf)) {
            Some(_) => Ok(Insertion::Replaced),
            None => Ok(Insertion::Created),
        }
    }

    pub fn get(&self, path: &TokenPath) -> Option<&TokenNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.children.get(first)?;
        for segment in rest {
            node = node.as_group()?.children.get(segment)?;
        }
        Some(node)
    }

    /// Look up a leaf by dotted path.
    pub fn leaf(&self, dotted: &str) -> Option<&Leaf> {
        self.get(&TokenPath::parse(dotted))?.as_leaf()
    }

    /// Look up a group by dotted path.
    pub fn group(&self, dotted: &str) -> Option<&Group> {
        self.get(&TokenPath::parse(dotted))?.as_group()
    }

    /// Visit every leaf depth-first, in document order.
    pub fn for_each_leaf(&self, mut f: impl FnMut(&TokenPath, &Leaf)) {
        fn walk(group: &Group, prefix: &mut Vec<String>, f: &mut dyn FnMut(&TokenPath, &Leaf)) {
            for (segment, node) in &group.children {
                prefix.push(segment.clone());
                match node {
                    TokenNode::Leaf(leaf) => f(&TokenPath::new(prefix.clone()), leaf),
                    TokenNode::Group(child) => walk(child, prefix, f),
                }
                prefix.pop();
            }
        }
        walk(self, &mut Vec::new(), &mut f);
    }

    /// Number of leaves beneath this group.
    pub fn leaf_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                TokenNode::Leaf(_) => 1,
                TokenNode::Group(group) => group.leaf_count(),
            })
            .sum()
    }
}

// ============================================================================
// Serialization
// ============================================================================

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.children.len() + usize::from(self.token_type.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(token_type) = &self.token_type {
            map.serialize_entry(TYPE_KEY, token_type)?;
        }
        for (segment, node) in &self.children {
            map.serialize_entry(segment, node)?;
        }
        map.end()
    }
}

impl Serialize for Leaf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(TYPE_KEY, &self.token_type)?;
        map.serialize_entry(VALUE_KEY, &self.value)?;
        map.end()
    }
}

impl Serialize for TokenNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TokenNode::Group(group) => group.serialize(serializer),
            TokenNode::Leaf(leaf) => leaf.serialize(serializer),
        }
    }
}
