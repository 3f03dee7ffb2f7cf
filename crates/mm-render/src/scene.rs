//! Map → scene projection.
//!
//! A `Scene` is everything a renderer needs for one frame: resolved node
//! geometry, routed links, control placement, and the view transform. It
//! is recomputed from the map on demand and never mutated.

use crate::chrome::Control;
use crate::route::{ConnectionRouter, Route};
use mm_core::layout::{NodeLayout, layout_node};
use mm_core::{Bounds, Color, LinkId, LinkStyle, MindMap, NodeId, Viewport};
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct NodeView {
    pub id: NodeId,
    pub layout: NodeLayout,
    pub accent: Color,
    pub image: Option<String>,
    /// Node is in text-edit mode.
    pub editing: bool,
    pub controls: SmallVec<[(Control, Bounds); 8]>,
}

impl NodeView {
    pub fn bounds(&self) -> Bounds {
        self.layout.bounds
    }
}

#[derive(Debug, Clone)]
pub struct LinkView {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
    pub style: LinkStyle,
    pub route: Route,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub viewport: Viewport,
    /// Paint order: later nodes on top.
    pub nodes: Vec<NodeView>,
    pub links: Vec<LinkView>,
    /// Controls are drawn and hittable only while visible.
    pub chrome_visible: bool,
}

impl Scene {
    pub fn node(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Swap each node image URL for `f(url)` when it returns `Some`; images
    /// it declines keep their URL. Returns the URLs that were kept.
    ///
    /// An SVG loaded as an image never fetches external resources, so the
    /// export path inlines images as data URLs before serializing.
    pub fn inline_images(&mut self, mut f: impl FnMut(&str) -> Option<String>) -> Vec<String> {
        let mut kept = Vec::new();
        for node in &mut self.nodes {
            let Some(url) = node.image.as_deref() else {
                continue;
            };
            if url.starts_with("data:") {
                continue;
            }
            match f(url) {
                Some(inlined) => node.image = Some(inlined),
                None => kept.push(url.to_string()),
            }
        }
        kept
    }
}

/// Inputs to `project` that are not part of the map.
#[derive(Debug, Clone, Copy)]
pub struct ProjectOptions {
    pub viewport: Viewport,
    pub chrome_visible: bool,
    pub editing: Option<NodeId>,
    pub default_accent: Color,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::IDENTITY,
            chrome_visible: true,
            editing: None,
            default_accent: Color::DEFAULT_ACCENT,
        }
    }
}

/// Project the map into a renderable scene.
pub fn project(map: &MindMap, router: &dyn ConnectionRouter, opts: &ProjectOptions) -> Scene {
    let nodes: Vec<NodeView> = map
        .nodes()
        .into_iter()
        .map(|node| {
            let layout = layout_node(node);
            let controls = Control::ALL
                .iter()
                .map(|&c| (c, c.bounds(&layout.bounds)))
                .collect();
            NodeView {
                id: node.id,
                accent: node.accent_or(opts.default_accent),
                image: node.image.clone(),
                editing: opts.editing == Some(node.id),
                controls,
                layout,
            }
        })
        .collect();

    let bounds_by_id: HashMap<NodeId, Bounds> =
        nodes.iter().map(|n| (n.id, n.bounds())).collect();

    let links = map
        .links()
        .into_iter()
        .filter_map(|link| {
            let from = bounds_by_id.get(&link.source)?;
            let to = bounds_by_id.get(&link.target)?;
            Some(LinkView {
                id: link.id,
                source: link.source,
                target: link.target,
                style: link.style,
                route: router.route(from, to),
            })
        })
        .collect();

    log::trace!("projected scene with {} node(s)", nodes.len());

    Scene {
        viewport: opts.viewport,
        nodes,
        links,
        chrome_visible: opts.chrome_visible,
    }
}
