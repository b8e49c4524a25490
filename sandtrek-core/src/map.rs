//! Location graph: nodes, edges, and the derived adjacency table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Node identifier as used by the ingestion layer.
pub type NodeId = String;

const fn default_true() -> bool {
    true
}

/// Structural problems detected while building a graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("graph has no nodes")]
    EmptyGraph,
    #[error("graph has {count} start nodes, expected at most one")]
    MultipleStart { count: usize },
    #[error("graph has {count} end nodes, expected at most one")]
    MultipleEnd { count: usize },
    #[error("edge {index} references unknown node '{node}'")]
    UnknownEndpoint { index: usize, node: NodeId },
    #[error("edge {index} has non-positive distance {distance}")]
    NonPositiveDistance { index: usize, distance: f64 },
}

/// Role a node plays on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    End,
    Mine,
    Village,
    #[default]
    Normal,
    Forbidden,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Mine => "mine",
            Self::Village => "village",
            Self::Normal => "normal",
            Self::Forbidden => "forbidden",
        }
    }

    /// Kinds that are stocked with the default supply prices when the
    /// ingestion layer configured none.
    #[must_use]
    pub const fn has_default_supply(self) -> bool {
        matches!(self, Self::Start | Self::Mine | Self::Village)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buy/sell prices offered at a node. A missing sell price means selling
/// that good here is disallowed, not that it sells for zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplyPoint {
    pub buy_price_food: f64,
    pub buy_price_water: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price_food: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price_water: Option<f64>,
}

impl SupplyPoint {
    /// Supply point that only sells to the traveller.
    #[must_use]
    pub const fn buy_only(buy_price_food: f64, buy_price_water: f64) -> Self {
        Self {
            buy_price_food,
            buy_price_water,
            sell_price_food: None,
            sell_price_water: None,
        }
    }
}

/// One location on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply: Option<SupplyPoint>,
}

impl MapNode {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            supply: None,
        }
    }

    #[must_use]
    pub fn with_supply(mut self, supply: SupplyPoint) -> Self {
        self.supply = Some(supply);
        self
    }
}

/// A connection between two nodes. Bidirectional edges populate the
/// adjacency table symmetrically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub distance: f64,
    #[serde(default = "default_true")]
    pub bidirectional: bool,
}

impl MapEdge {
    #[must_use]
    pub fn new(src: impl Into<NodeId>, dst: impl Into<NodeId>, distance: f64) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            distance,
            bidirectional: true,
        }
    }

    #[must_use]
    pub fn one_way(mut self) -> Self {
        self.bidirectional = false;
        self
    }
}

/// The map as handed in by the ingestion layer. The adjacency table is
/// always derived from the edge list, never deserialized; call
/// [`MapGraph::rebuild`] after constructing one by hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapGraph {
    pub nodes: BTreeMap<NodeId, MapNode>,
    pub edges: Vec<MapEdge>,
    #[serde(skip)]
    adjacency: BTreeMap<NodeId, Vec<(NodeId, f64)>>,
}

impl MapGraph {
    /// Build a graph from nodes and edges, deriving the adjacency table.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] when the node set is empty, an edge names an
    /// unknown node, a distance is not positive, or more than one start or
    /// end node exists.
    pub fn new(nodes: Vec<MapNode>, edges: Vec<MapEdge>) -> Result<Self, MapError> {
        let mut graph = Self {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            edges,
            adjacency: BTreeMap::new(),
        };
        graph.rebuild()?;
        Ok(graph)
    }

    /// Re-derive the adjacency table and re-check structural invariants.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`MapGraph::new`].
    pub fn rebuild(&mut self) -> Result<(), MapError> {
        if self.nodes.is_empty() {
            return Err(MapError::EmptyGraph);
        }
        let starts = self.count_kind(NodeKind::Start);
        if starts > 1 {
            return Err(MapError::MultipleStart { count: starts });
        }
        let ends = self.count_kind(NodeKind::End);
        if ends > 1 {
            return Err(MapError::MultipleEnd { count: ends });
        }

        let mut adjacency: BTreeMap<NodeId, Vec<(NodeId, f64)>> = self
            .nodes
            .keys()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        for (index, edge) in self.edges.iter().enumerate() {
            for endpoint in [&edge.src, &edge.dst] {
                if !self.nodes.contains_key(endpoint) {
                    return Err(MapError::UnknownEndpoint {
                        index,
                        node: endpoint.clone(),
                    });
                }
            }
            if !edge.distance.is_finite() || edge.distance <= 0.0 {
                return Err(MapError::NonPositiveDistance {
                    index,
                    distance: edge.distance,
                });
            }
            if let Some(list) = adjacency.get_mut(&edge.src) {
                list.push((edge.dst.clone(), edge.distance));
            }
            if edge.bidirectional {
                if let Some(list) = adjacency.get_mut(&edge.dst) {
                    list.push((edge.src.clone(), edge.distance));
                }
            }
        }
        self.adjacency = adjacency;
        Ok(())
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&MapNode> {
        self.nodes.get(id)
    }

    /// Neighbors of a node in edge-list order; empty for unknown ids.
    #[must_use]
    pub fn neighbors(&self, id: &str) -> &[(NodeId, f64)] {
        self.adjacency.get(id).map_or(&[], Vec::as_slice)
    }

    /// The start node id: the unique `start`-kind node, else the smallest
    /// node id as a deterministic fallback.
    #[must_use]
    pub fn start_node(&self) -> Option<&str> {
        self.find_kind(NodeKind::Start)
            .or_else(|| self.nodes.keys().next().map(String::as_str))
    }

    /// The end node id: the unique `end`-kind node, else the largest node
    /// id as a deterministic fallback.
    #[must_use]
    pub fn end_node(&self) -> Option<&str> {
        self.find_kind(NodeKind::End)
            .or_else(|| self.nodes.keys().next_back().map(String::as_str))
    }

    fn find_kind(&self, kind: NodeKind) -> Option<&str> {
        self.nodes
            .iter()
            .find(|(_, node)| node.kind == kind)
            .map(|(id, _)| id.as_str())
    }

    fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.values().filter(|node| node.kind == kind).count()
    }
}
