use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use serde_json::Value;
use slotmap::{Key, SlotMap};

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::geometry::{Insets, Rect, Size};
use crate::logging::{LogLevel, event_with_fields, json_kv};
use crate::measure::{MeasureSpec, Measurable};
use crate::properties::LayoutProperties;

use super::axis::Orientation;
use super::linear::{LayoutChild, LinearLayout};

const TARGET: &str = "stackbox::tree";

slotmap::new_key_type! {
    /// Handle to a node inside a [`LayoutTree`].
    pub struct NodeId;
}

/// What a node lays out: host content or a linear stack of other nodes.
pub enum NodeKind {
    Leaf(Box<dyn Measurable>),
    Linear(LinearLayout),
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf(_) => f.write_str("Leaf(..)"),
            NodeKind::Linear(layout) => f.debug_tuple("Linear").field(layout).finish(),
        }
    }
}

/// Arena entry for a single box.
#[derive(Debug)]
pub struct LayoutNode {
    kind: NodeKind,
    properties: LayoutProperties,
    hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    frame: Option<Rect>,
    needs_layout: bool,
}

impl LayoutNode {
    fn new(kind: NodeKind, properties: LayoutProperties) -> Self {
        Self {
            kind,
            properties,
            hidden: false,
            parent: None,
            children: Vec::new(),
            frame: None,
            needs_layout: true,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn properties(&self) -> &LayoutProperties {
        &self.properties
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Frame relative to the parent, as committed by the last pass.
    pub fn frame(&self) -> Option<Rect> {
        self.frame
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Linear(_))
    }
}

/// Result of a full layout pass.
#[derive(Debug, Clone)]
pub struct LayoutReport {
    /// Size the root was laid out at.
    pub size: Size,
    /// Absolute frame of every placed node. Hidden-skipped nodes are absent.
    pub frames: HashMap<NodeId, Rect>,
    /// Nodes whose absolute frame differs from the previous pass, in tree order,
    /// followed by nodes detached since then.
    pub changed: Vec<NodeId>,
    /// Digest over every placed node and frame, in tree order.
    pub digest: blake3::Hash,
}

impl LayoutReport {
    pub fn frame(&self, id: NodeId) -> Option<Rect> {
        self.frames.get(&id).copied()
    }

    pub fn is_changed(&self, id: NodeId) -> bool {
        self.changed.contains(&id)
    }
}

/// Retained tree of boxes with upward invalidation.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]; the parent
/// link is only used to route invalidation and to fold absolute frames.
pub struct LayoutTree {
    nodes: SlotMap<NodeId, LayoutNode>,
    root: Option<NodeId>,
    config: LayoutConfig,
    last_size: Option<Size>,
    last_frames: HashMap<NodeId, Rect>,
    measure_calls: Cell<usize>,
}

impl fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTree")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("last_size", &self.last_size)
            .finish_non_exhaustive()
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            config,
            last_size: None,
            last_frames: HashMap::new(),
            measure_calls: Cell::new(0),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.config
    }

    /// Create a detached leaf around host content.
    pub fn new_leaf(
        &mut self,
        content: impl Measurable + 'static,
        properties: LayoutProperties,
    ) -> NodeId {
        self.nodes
            .insert(LayoutNode::new(NodeKind::Leaf(Box::new(content)), properties))
    }

    /// Create a detached, empty linear container.
    pub fn new_linear(
        &mut self,
        orientation: Orientation,
        padding: Insets,
        properties: LayoutProperties,
    ) -> NodeId {
        let layout = LinearLayout::new(orientation).with_padding(padding);
        self.nodes
            .insert(LayoutNode::new(NodeKind::Linear(layout), properties))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make a detached node the root. The previous root, if any, stays in the arena.
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if let Some(parent) = node.parent {
            return Err(LayoutError::AlreadyAttached { child: id, parent });
        }
        if let Some(previous) = self.root.filter(|previous| *previous != id) {
            self.clear_frames(previous);
        }
        self.root = Some(id);
        self.last_size = None;
        self.invalidate(id)?;
        self.log_structure("set_root", None, id);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        if !parent_node.is_container() {
            return Err(LayoutError::NotAContainer(parent));
        }
        let len = parent_node.children.len();
        let child_node = self.node(child)?;
        if self.root == Some(child) {
            return Err(LayoutError::RootAttach(child));
        }
        if let Some(current) = child_node.parent {
            return Err(LayoutError::AlreadyAttached {
                child,
                parent: current,
            });
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(LayoutError::WouldCycle { parent, child });
        }
        if index > len {
            return Err(LayoutError::IndexOutOfBounds { index, len });
        }

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.invalidate(parent)?;
        self.log_structure("insert_child", Some(parent), child);
        Ok(())
    }

    /// Detach `child` from `parent`; the child and its subtree stay in the arena.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|id| *id == child)
            .ok_or(LayoutError::NotAChild { parent, child })?;
        self.node_mut(parent)?.children.remove(position);
        self.node_mut(child)?.parent = None;
        self.clear_frames(child);
        self.invalidate(parent)?;
        self.log_structure("remove_child", Some(parent), child);
        Ok(())
    }

    /// Drop a node and its whole subtree. Returns how many nodes were removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.remove_child(parent, id)?;
        }
        if self.root == Some(id) {
            self.root = None;
            self.last_size = None;
        }

        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                self.last_frames.remove(&next);
                removed += 1;
            }
        }
        self.log_structure("remove", parent, id);
        Ok(removed)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.hidden != hidden {
            node.hidden = hidden;
            self.invalidate(id)?;
        }
        Ok(())
    }

    pub fn update_properties<F>(&mut self, id: NodeId, update: F) -> Result<()>
    where
        F: FnOnce(&mut LayoutProperties),
    {
        update(&mut self.node_mut(id)?.properties);
        self.invalidate(id)
    }

    pub fn set_orientation(&mut self, id: NodeId, orientation: Orientation) -> Result<()> {
        self.linear_mut(id)?.orientation = orientation;
        self.invalidate(id)
    }

    pub fn set_padding(&mut self, id: NodeId, padding: Insets) -> Result<()> {
        self.linear_mut(id)?.padding = padding;
        self.invalidate(id)
    }

    /// Mutable access to leaf content. The node is invalidated up front.
    pub fn leaf_mut(&mut self, id: NodeId) -> Result<&mut (dyn Measurable + 'static)> {
        if !matches!(self.node(id)?.kind, NodeKind::Leaf(_)) {
            return Err(LayoutError::NotALeaf(id));
        }
        self.invalidate(id)?;
        match &mut self.node_mut(id)?.kind {
            NodeKind::Leaf(content) => Ok(content.as_mut()),
            NodeKind::Linear(_) => Err(LayoutError::NotALeaf(id)),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn properties(&self, id: NodeId) -> Result<&LayoutProperties> {
        Ok(&self.node(id)?.properties)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn is_hidden(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.hidden)
    }

    pub fn needs_layout(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.needs_layout)
    }

    /// Frame relative to the parent, `None` until placed.
    pub fn frame(&self, id: NodeId) -> Result<Option<Rect>> {
        Ok(self.node(id)?.frame)
    }

    /// Frame in root coordinates, `None` if the node or an ancestor is unplaced.
    pub fn absolute_frame(&self, id: NodeId) -> Result<Option<Rect>> {
        let Some(mut rect) = self.node(id)?.frame else {
            return Ok(None);
        };
        for ancestor in self.ancestors(id).skip(1) {
            match self.nodes.get(ancestor).and_then(|node| node.frame) {
                Some(frame) => rect = rect.offset(frame.x, frame.y),
                None => return Ok(None),
            }
        }
        Ok(Some(rect))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flag `id` and every ancestor for the next pass. Never measures.
    pub fn invalidate(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        let mut depth = 0_u64;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get_mut(current) else {
                break;
            };
            node.needs_layout = true;
            cursor = node.parent;
            depth += 1;
        }

        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_invalidation();
            }
        }
        self.log(
            LogLevel::Trace,
            "invalidated",
            [
                json_kv("node", format!("{id:?}")),
                json_kv("flagged", depth),
            ],
        );
        Ok(())
    }

    /// Read-only measurement of the root.
    pub fn measure(
        &self,
        available: Size,
        width: MeasureSpec,
        height: MeasureSpec,
    ) -> Result<Size> {
        let root = self.root.ok_or(LayoutError::EmptyLayout)?;
        Ok(self.measure_node(self.node(root)?, available, width, height))
    }

    /// Preferred root size within `target`, bounding only the required axes.
    pub fn fitting_size(&self, target: Size, fit_width: bool, fit_height: bool) -> Result<Size> {
        self.measure(
            target,
            MeasureSpec::fitting(fit_width),
            MeasureSpec::fitting(fit_height),
        )
    }

    /// Lay the root out at `(0, 0, size)` and commit every frame.
    pub fn layout(&mut self, size: Size) -> Result<LayoutReport> {
        let root = self.root.ok_or(LayoutError::EmptyLayout)?;
        self.node(root)?;
        let started = Instant::now();
        self.measure_calls.set(0);

        let mut pass = PassState::default();
        self.arrange_node(root, Rect::from_size(size), (0.0, 0.0), &mut pass);

        let frames: HashMap<NodeId, Rect> = pass.order.iter().copied().collect();
        let skipped: HashSet<NodeId> = pass.skipped.iter().copied().collect();
        let mut changed: Vec<NodeId> = pass
            .order
            .iter()
            .filter(|(id, rect)| self.last_frames.get(id) != Some(rect))
            .map(|(id, _)| *id)
            .collect();
        changed.extend(
            pass.skipped
                .iter()
                .filter(|id| self.last_frames.contains_key(*id))
                .copied(),
        );
        // Detached since the last pass: no longer reachable from the root.
        let mut detached: Vec<NodeId> = self
            .last_frames
            .keys()
            .filter(|id| !frames.contains_key(*id) && !skipped.contains(*id))
            .copied()
            .collect();
        detached.sort();
        changed.extend(detached);

        let mut hasher = blake3::Hasher::new();
        for (id, rect) in &pass.order {
            hasher.update(&id.data().as_ffi().to_le_bytes());
            for value in [rect.x, rect.y, rect.width, rect.height] {
                hasher.update(&value.to_le_bytes());
            }
        }
        let digest = hasher.finalize();

        self.last_frames = frames.clone();
        self.last_size = Some(size);

        let elapsed = started.elapsed();
        let measure_calls = self.measure_calls.get();
        self.log(
            LogLevel::Debug,
            "layout_pass",
            [
                json_kv("width", size.width),
                json_kv("height", size.height),
                json_kv("arranged", pass.order.len()),
                json_kv("changed", changed.len()),
                json_kv("measure_calls", measure_calls),
                json_kv("elapsed_us", elapsed.as_micros() as u64),
                json_kv("digest", digest.to_hex().to_string()),
            ],
        );
        self.record_pass(pass.order.len(), measure_calls, elapsed);

        Ok(LayoutReport {
            size,
            frames,
            changed,
            digest,
        })
    }

    /// Run [`layout`](Self::layout) only if the root is flagged or `size` moved.
    pub fn layout_if_needed(&mut self, size: Size) -> Result<Option<LayoutReport>> {
        let root = self.root.ok_or(LayoutError::EmptyLayout)?;
        if self.node(root)?.needs_layout || self.last_size != Some(size) {
            return self.layout(size).map(Some);
        }
        Ok(None)
    }

    fn node(&self, id: NodeId) -> Result<&LayoutNode> {
        self.nodes.get(id).ok_or(LayoutError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut LayoutNode> {
        self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))
    }

    fn linear_mut(&mut self, id: NodeId) -> Result<&mut LinearLayout> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Linear(layout) => Ok(layout),
            NodeKind::Leaf(_) => Err(LayoutError::NotAContainer(id)),
        }
    }

    /// `id` followed by each ancestor up to the top of its tree.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| {
            self.nodes.get(*current).and_then(|node| node.parent)
        })
    }

    fn child_refs<'a>(&'a self, node: &'a LayoutNode) -> Vec<NodeRef<'a>> {
        node.children
            .iter()
            .filter_map(|id| self.nodes.get(*id))
            .map(|node| NodeRef { tree: self, node })
            .collect()
    }

    fn measure_node(
        &self,
        node: &LayoutNode,
        available: Size,
        width: MeasureSpec,
        height: MeasureSpec,
    ) -> Size {
        self.measure_calls.set(self.measure_calls.get() + 1);
        match &node.kind {
            NodeKind::Leaf(content) => content.measure(available, width, height),
            NodeKind::Linear(layout) => {
                layout.measure(&self.child_refs(node), available, width, height)
            }
        }
    }

    fn arrange_node(&mut self, id: NodeId, frame: Rect, origin: (f32, f32), pass: &mut PassState) {
        let placed: Vec<(NodeId, Option<Rect>)> = match self.nodes.get(id) {
            Some(node) => match &node.kind {
                NodeKind::Linear(layout) => {
                    let resolution = layout.arrange_frames(&self.child_refs(node), frame.size());
                    node.children
                        .iter()
                        .copied()
                        .zip(resolution.frames)
                        .collect()
                }
                NodeKind::Leaf(_) => Vec::new(),
            },
            None => return,
        };

        if let Some(node) = self.nodes.get_mut(id) {
            node.frame = Some(frame);
            node.needs_layout = false;
            if let NodeKind::Leaf(content) = &mut node.kind {
                content.arrange(frame);
            }
        }
        let absolute = frame.offset(origin.0, origin.1);
        pass.order.push((id, absolute));

        for (child, child_frame) in placed {
            match child_frame {
                Some(child_frame) => {
                    self.arrange_node(child, child_frame, (absolute.x, absolute.y), pass)
                }
                None => self.clear_skipped(child, pass),
            }
        }
    }

    /// Drop frames of a hidden subtree; it was resolved this pass even though unplaced.
    fn clear_skipped(&mut self, id: NodeId, pass: &mut PassState) {
        for hidden in self.clear_frames(id) {
            if let Some(node) = self.nodes.get_mut(hidden) {
                node.needs_layout = false;
            }
            pass.skipped.push(hidden);
        }
    }

    /// Drop committed frames across a subtree. Returns its ids in tree order.
    fn clear_frames(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut cleared = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next) {
                node.frame = None;
                cleared.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        cleared
    }

    fn record_pass(&self, arranged: usize, measure_calls: usize, elapsed: std::time::Duration) {
        let Some(metrics) = self.config.metrics.as_ref() else {
            return;
        };
        let Ok(mut guard) = metrics.lock() else {
            return;
        };
        guard.record_pass(arranged, elapsed);
        guard.record_measures(measure_calls);

        let every = self.config.metrics_every;
        if every == 0 || guard.passes() % every != 0 {
            return;
        }
        if let Some(logger) = self.config.logger.as_ref() {
            let event = guard.snapshot().to_log_event(&self.config.metrics_target);
            let _ = logger.log_event(event);
        }
    }

    fn log_structure(&self, op: &str, parent: Option<NodeId>, child: NodeId) {
        let parent = parent
            .map(|id| Value::from(format!("{id:?}")))
            .unwrap_or(Value::Null);
        self.log(
            LogLevel::Debug,
            "structure_changed",
            [
                json_kv("op", op),
                json_kv("parent", parent),
                json_kv("node", format!("{child:?}")),
            ],
        );
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, TARGET, message, fields));
        }
    }
}

#[derive(Default)]
struct PassState {
    order: Vec<(NodeId, Rect)>,
    skipped: Vec<NodeId>,
}

/// Borrowed view of an attached node handed to [`LinearLayout`].
struct NodeRef<'a> {
    tree: &'a LayoutTree,
    node: &'a LayoutNode,
}

impl LayoutChild for NodeRef<'_> {
    fn properties(&self) -> &LayoutProperties {
        &self.node.properties
    }

    fn is_hidden(&self) -> bool {
        self.node.hidden
    }

    fn measure(&self, available: Size, width: MeasureSpec, height: MeasureSpec) -> Size {
        self.tree.measure_node(self.node, available, width, height)
    }
}
