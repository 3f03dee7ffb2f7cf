//! Mind map data model.
//!
//! The map is a directed graph: vertices are topic nodes, edges are links
//! from a parent topic to the topic it spawned (or any user-drawn
//! connection). The graph is the single source of truth; everything drawn
//! on screen is a projection of it. Because links live *in* the graph,
//! removing a node drops its incident links in the same step and no link
//! can outlive either endpoint.

use crate::error::{MapError, Result};
use crate::geometry::Point;
use crate::id::{IdCounter, LinkId, NodeId};
use petgraph::Direction as EdgeDirection;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    /// `#007BFF`, the accent of nodes that were never recolored.
    pub const DEFAULT_ACCENT: Color = Color::rgba(0.0, 123.0 / 255.0, 1.0, 1.0);
    /// `#F0F2F5`, the page background used for exports.
    pub const EXPORT_BACKGROUND: Color = Color::rgba(240.0 / 255.0, 242.0 / 255.0, 245.0 / 255.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channel = |hi: u8, lo: u8| -> Option<f32> {
            Some((hex_val(hi)? << 4 | hex_val(lo)?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                channel(bytes[6], bytes[7])?,
            )),
            _ => None,
        }
    }

    /// Channels as 8-bit integers.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Nodes & links ───────────────────────────────────────────────────────

/// A topic on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicNode {
    pub id: NodeId,
    /// Top-left corner in unscaled canvas coordinates.
    pub position: Point,
    pub content: String,
    /// Border color picked by the user. `None` until the first recolor.
    pub accent: Option<Color>,
    /// Image URL shown above the text. Broken URLs simply fail to render.
    pub image: Option<String>,
}

impl TopicNode {
    pub fn new(id: NodeId, position: Point, content: impl Into<String>) -> Self {
        Self {
            id,
            position,
            content: content.into(),
            accent: None,
            image: None,
        }
    }

    pub fn accent_or(&self, fallback: Color) -> Color {
        self.accent.unwrap_or(fallback)
    }
}

/// Stroke of a link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkStyle {
    pub color: Color,
    pub width: f32,
}

/// A directed connector from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
    pub style: LinkStyle,
}

/// What `remove_node` took out of the map.
#[derive(Debug, Clone)]
pub struct RemovedNode {
    pub node: TopicNode,
    pub links: Vec<Link>,
}

// ─── Map ─────────────────────────────────────────────────────────────────

/// The whole mind map: an arena of topics keyed by id plus the links
/// between them.
#[derive(Debug, Clone, Default)]
pub struct MindMap {
    /// The underlying directed graph.
    pub graph: StableDiGraph<TopicNode, Link>,

    /// Index from NodeId → NodeIndex for fast lookup.
    id_index: HashMap<NodeId, NodeIndex>,

    /// Index from LinkId → EdgeIndex.
    link_index: HashMap<LinkId, EdgeIndex>,

    ids: IdCounter,
}

impl MindMap {
    /// Create a new empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a topic at `position`. Returns the freshly allocated id.
    pub fn create_node(&mut self, position: Point, content: impl Into<String>) -> NodeId {
        let id = self.ids.next_node();
        let idx = self.graph.add_node(TopicNode::new(id, position, content));
        self.id_index.insert(id, idx);
        log::debug!("created {id} at ({}, {})", position.x, position.y);
        id
    }

    /// Connect `source` → `target`. Self-loops are rejected; duplicate and
    /// cyclic links are allowed.
    pub fn connect(&mut self, source: NodeId, target: NodeId, style: LinkStyle) -> Result<LinkId> {
        let from = self.index_of(source)?;
        let to = self.index_of(target)?;
        if source == target {
            return Err(MapError::SelfLoop(source));
        }
        let id = self.ids.next_link();
        let edge = self.graph.add_edge(
            from,
            to,
            Link {
                id,
                source,
                target,
                style,
            },
        );
        self.link_index.insert(id, edge);
        log::debug!("linked {source} -> {target} as {id}");
        Ok(id)
    }

    /// Remove a node together with every link touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<RemovedNode> {
        let idx = self.index_of(id)?;
        let mut links: Vec<Link> = self
            .graph
            .edges_directed(idx, EdgeDirection::Outgoing)
            .chain(self.graph.edges_directed(idx, EdgeDirection::Incoming))
            .map(|e| e.weight().clone())
            .collect();
        links.sort_by_key(|l| l.id);
        for link in &links {
            self.link_index.remove(&link.id);
        }
        // Removing the vertex drops its incident edges with it.
        let node = self
            .graph
            .remove_node(idx)
            .ok_or(MapError::UnknownNode(id))?;
        self.id_index.remove(&id);
        log::debug!("removed {id} and {} link(s)", links.len());
        Ok(RemovedNode { node, links })
    }

    /// Remove a single link. Returns it if it existed.
    pub fn remove_link(&mut self, id: LinkId) -> Option<Link> {
        let edge = self.link_index.remove(&id)?;
        self.graph.remove_edge(edge)
    }

    // ─── Node mutation ───────────────────────────────────────────────────

    /// Set a node's accent and restyle the links whose source is that node.
    /// Links further downstream keep their color. Returns the number of
    /// restyled links.
    pub fn set_accent(&mut self, id: NodeId, color: Color) -> Result<usize> {
        let idx = self.index_of(id)?;
        self.graph[idx].accent = Some(color);

        let edges: Vec<EdgeIndex> = self
            .graph
            .edges_directed(idx, EdgeDirection::Outgoing)
            .map(|e| e.id())
            .collect();
        for &edge in &edges {
            self.graph[edge].style.color = color;
        }
        Ok(edges.len())
    }

    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.content = content.into();
        Ok(())
    }

    /// Replace (or with `None`, drop) the node's image.
    pub fn set_image(&mut self, id: NodeId, url: Option<String>) -> Result<()> {
        self.node_mut(id)?.image = url;
        Ok(())
    }

    pub fn move_to(&mut self, id: NodeId, position: Point) -> Result<()> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&TopicNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Look up a node, failing with `UnknownNode`.
    pub fn node(&self, id: NodeId) -> Result<&TopicNode> {
        self.get(id).ok_or(MapError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut TopicNode> {
        let idx = self.index_of(id)?;
        Ok(&mut self.graph[idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Get the graph index for a NodeId.
    pub fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.id_index
            .get(&id)
            .copied()
            .ok_or(MapError::UnknownNode(id))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in creation order.
    ///
    /// Sorted by id so the order is deterministic regardless of slot reuse
    /// inside the stable graph. Later nodes paint on top.
    pub fn nodes(&self) -> Vec<&TopicNode> {
        let mut nodes: Vec<&TopicNode> = self.graph.node_weights().collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    /// All links in creation order.
    pub fn links(&self) -> Vec<&Link> {
        let mut links: Vec<&Link> = self.graph.edge_weights().collect();
        links.sort_by_key(|l| l.id);
        links
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.link_index.get(&id).map(|e| &self.graph[*e])
    }

    /// Links whose source is `id`.
    pub fn outgoing(&self, id: NodeId) -> Vec<&Link> {
        self.links_directed(id, EdgeDirection::Outgoing)
    }

    /// Links whose target is `id`.
    pub fn incoming(&self, id: NodeId) -> Vec<&Link> {
        self.links_directed(id, EdgeDirection::Incoming)
    }

    fn links_directed(&self, id: NodeId, dir: EdgeDirection) -> Vec<&Link> {
        let Some(&idx) = self.id_index.get(&id) else {
            return Vec::new();
        };
        let mut links: Vec<&Link> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| e.weight())
            .collect();
        links.sort_by_key(|l| l.id);
        links
    }
}
