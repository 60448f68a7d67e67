//! Refinable-property tree and its flattened, selectable form.
//!
//! A mixture's phases are walked into [`RefinableNode`]s with three
//! polymorphic shapes: collections (recursed into, no row of their own),
//! groups (one row, then their children one level deeper) and values (one
//! leaf row). Empty nodes and groups without any value below them produce
//! no rows.
use crate::{
    phases::{PhaseId, PhaseProperty},
    refinement::info::RefinementInfo,
};

/// Handle of one refinable scalar in a mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    pub phase: PhaseId,
    pub property: PhaseProperty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefinableNode {
    Collection { title: String, children: Vec<RefinableNode> },
    Group { title: String, children: Vec<RefinableNode> },
    Value { title: String, path: PropertyPath, info: RefinementInfo, refinable: bool },
    Empty,
}

impl RefinableNode {
    /// `true` if at least one value sits below this node.
    pub fn has_values(&self) -> bool {
        match self {
            RefinableNode::Value { .. } => true,
            RefinableNode::Collection { children, .. } | RefinableNode::Group { children, .. } => {
                children.iter().any(RefinableNode::has_values)
            }
            RefinableNode::Empty => false,
        }
    }

    fn flatten_into(&self, depth: usize, rows: &mut Vec<RefinementRow>) {
        match self {
            RefinableNode::Collection { children, .. } => {
                for child in children {
                    child.flatten_into(depth, rows);
                }
            }
            RefinableNode::Group { title, children } => {
                if !self.has_values() {
                    return;
                }
                rows.push(RefinementRow {
                    depth,
                    title: title.clone(),
                    is_group: true,
                    path: None,
                    info: None,
                    refinable: false,
                });
                for child in children {
                    child.flatten_into(depth + 1, rows);
                }
            }
            RefinableNode::Value { title, path, info, refinable } => rows.push(RefinementRow {
                depth,
                title: title.clone(),
                is_group: false,
                path: Some(*path),
                info: Some(*info),
                refinable: *refinable,
            }),
            RefinableNode::Empty => {}
        }
    }
}

/// One row of the flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementRow {
    pub depth: usize,
    pub title: String,
    pub is_group: bool,
    pub path: Option<PropertyPath>,
    pub info: Option<RefinementInfo>,
    pub refinable: bool,
}

impl RefinementRow {
    /// Leaf flagged for refinement and actually refinable.
    pub fn is_selected(&self) -> bool {
        self.refinable && self.info.map(|i| i.refine).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefinementTree {
    rows: Vec<RefinementRow>,
}

impl RefinementTree {
    pub fn from_nodes(nodes: &[RefinableNode]) -> Self {
        let mut rows = Vec::new();
        for node in nodes {
            node.flatten_into(0, &mut rows);
        }
        RefinementTree { rows }
    }

    pub fn rows(&self) -> &[RefinementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Selected leaves in tree order with their refinement bounds.
    pub fn selected(&self) -> Vec<(PropertyPath, RefinementInfo)> {
        self.rows
            .iter()
            .filter(|r| r.is_selected())
            .filter_map(|r| Some((r.path?, r.info?)))
            .collect()
    }
}
