//! Diagram state as an immutable value plus a pure reducer.
//!
//! Every mutation the feed can ask for is a [`FlowCommand`]. Applying one
//! yields a new [`FlowState`] and, for delayed clears, a [`Deferred`]
//! command the caller must feed back after the delay.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use super::graph::{EdgeId, NodeId};

/// How long a pulsed edge stays animated.
pub const EDGE_HOLD_MS: u32 = 2_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeTrace {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub is_processing: bool,
    pub processing_complete: bool,
}

/// Partial update for [`NodeFlags`]; `None` leaves a flag untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStatePatch {
    pub is_processing: Option<bool>,
    pub processing_complete: Option<bool>,
}

impl NodeStatePatch {
    pub fn processing() -> Self {
        Self {
            is_processing: Some(true),
            processing_complete: Some(false),
        }
    }

    pub fn complete() -> Self {
        Self {
            is_processing: Some(false),
            processing_complete: Some(true),
        }
    }

    fn merge_into(self, flags: &mut NodeFlags) {
        if let Some(is_processing) = self.is_processing {
            flags.is_processing = is_processing;
        }
        if let Some(processing_complete) = self.processing_complete {
            flags.processing_complete = processing_complete;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeStats {
    pub count: u32,
    pub animated: bool,
    /// Bumped every time the edge is switched on; a delayed clear only
    /// lands if the pulse it captured is still current.
    pub pulse: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowCommand {
    UpdateEdgeAnimation { edge: EdgeId, animated: bool },
    IncrementEdgeCount { edge: EdgeId },
    UpdateNodeState { node: NodeId, patch: NodeStatePatch },
    AddNodeTrace { node: NodeId, trace: NodeTrace },
    /// Schedule the edge to stop animating after `delay_ms`.
    ClearEdgeAnimationAfter { edge: EdgeId, delay_ms: u32 },
    /// Emitted by the reducer for a scheduled clear.
    ExpireEdgeAnimation { edge: EdgeId, pulse: u64 },
}

impl FlowCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            FlowCommand::UpdateEdgeAnimation { .. } => "update_edge_animation",
            FlowCommand::IncrementEdgeCount { .. } => "increment_edge_count",
            FlowCommand::UpdateNodeState { .. } => "update_node_state",
            FlowCommand::AddNodeTrace { .. } => "add_node_trace",
            FlowCommand::ClearEdgeAnimationAfter { .. } => "clear_edge_animation_after",
            FlowCommand::ExpireEdgeAnimation { .. } => "expire_edge_animation",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deferred {
    pub delay_ms: u32,
    pub command: FlowCommand,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: FlowState,
    pub deferred: Option<Deferred>,
}

/// What the diagram draws for one edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeView {
    pub edge: EdgeId,
    pub label: String,
    pub animated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowState {
    nodes: BTreeMap<NodeId, NodeFlags>,
    edges: BTreeMap<EdgeId, EdgeStats>,
    /// Shared between successive states; only the node being appended to
    /// is copied.
    traces: BTreeMap<NodeId, Rc<Vec<NodeTrace>>>,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            nodes: NodeId::ALL
                .into_iter()
                .map(|node| (node, NodeFlags::default()))
                .collect(),
            edges: EdgeId::ALL
                .into_iter()
                .map(|edge| (edge, EdgeStats::default()))
                .collect(),
            traces: BTreeMap::new(),
        }
    }
}

impl FlowState {
    pub fn node(&self, node: NodeId) -> NodeFlags {
        self.nodes.get(&node).copied().unwrap_or_default()
    }

    pub fn edge(&self, edge: EdgeId) -> EdgeStats {
        self.edges.get(&edge).copied().unwrap_or_default()
    }

    /// Trace history for `node`, oldest first.
    pub fn traces(&self, node: NodeId) -> &[NodeTrace] {
        self.traces
            .get(&node)
            .map(|traces| traces.as_slice())
            .unwrap_or_default()
    }

    /// Shared handle to the history of `node`.
    pub fn trace_history(&self, node: NodeId) -> Rc<Vec<NodeTrace>> {
        self.traces.get(&node).cloned().unwrap_or_default()
    }

    pub fn edge_views(&self) -> Vec<EdgeView> {
        self.edges
            .iter()
            .map(|(edge, stats)| EdgeView {
                edge: *edge,
                label: format!("{} calls", stats.count),
                animated: stats.animated,
            })
            .collect()
    }
}

/// Apply one command. Ids outside the diagram leave the state untouched.
pub fn reduce(state: &FlowState, command: FlowCommand) -> Transition {
    let mut next = state.clone();
    let mut deferred = None;

    match command {
        FlowCommand::UpdateEdgeAnimation { edge, animated } => {
            if let Some(stats) = next.edges.get_mut(&edge) {
                if animated {
                    stats.pulse += 1;
                }
                stats.animated = animated;
            }
        }
        FlowCommand::IncrementEdgeCount { edge } => {
            if let Some(stats) = next.edges.get_mut(&edge) {
                stats.count = stats.count.saturating_add(1);
            }
        }
        FlowCommand::UpdateNodeState { node, patch } => {
            if let Some(flags) = next.nodes.get_mut(&node) {
                patch.merge_into(flags);
            }
        }
        FlowCommand::AddNodeTrace { node, trace } => {
            if next.nodes.contains_key(&node) {
                Rc::make_mut(next.traces.entry(node).or_default()).push(trace);
            }
        }
        FlowCommand::ClearEdgeAnimationAfter { edge, delay_ms } => {
            if let Some(stats) = next.edges.get(&edge) {
                deferred = Some(Deferred {
                    delay_ms,
                    command: FlowCommand::ExpireEdgeAnimation {
                        edge,
                        pulse: stats.pulse,
                    },
                });
            }
        }
        FlowCommand::ExpireEdgeAnimation { edge, pulse } => {
            if let Some(stats) = next.edges.get_mut(&edge) {
                if stats.pulse == pulse {
                    stats.animated = false;
                }
            }
        }
    }

    Transition {
        state: next,
        deferred,
    }
}

/// Apply a batch, collecting every deferred command in order.
pub fn reduce_all(
    state: &FlowState,
    commands: impl IntoIterator<Item = FlowCommand>,
) -> (FlowState, Vec<Deferred>) {
    let mut current = state.clone();
    let mut deferred = Vec::new();
    for command in commands {
        let transition = reduce(&current, command);
        current = transition.state;
        deferred.extend(transition.deferred);
    }
    (current, deferred)
}
