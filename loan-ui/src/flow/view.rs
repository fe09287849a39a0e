use std::rc::Rc;

use dioxus::prelude::*;

use super::graph::{EdgeId, NodeId};
use super::state::{FlowState, NodeTrace};
use crate::styles::FLOW_STYLES;

const NODE_WIDTH: f64 = 140.0;
const NODE_HEIGHT: f64 = 56.0;
const VIEW_BOX: &str = "0 0 780 340";

/// SVG path for an edge. The reply edge arcs under the diagram so it does
/// not cross the supervisor.
pub fn edge_path(edge: EdgeId) -> String {
    let (source, target) = edge.endpoints();
    let (x1, y1) = source.position();
    let (x2, y2) = target.position();
    match edge {
        EdgeId::ResponseUser => {
            let mid_x = (x1 + x2) / 2.0;
            format!("M {x1:.1} {y1:.1} Q {mid_x:.1} 480.0 {x2:.1} {y2:.1}")
        }
        _ => format!("M {x1:.1} {y1:.1} L {x2:.1} {y2:.1}"),
    }
}

/// Where the "<n> calls" label sits for an edge.
fn edge_label_anchor(edge: EdgeId) -> (f64, f64) {
    let (source, target) = edge.endpoints();
    let (x1, y1) = source.position();
    let (x2, y2) = target.position();
    match edge {
        // Quadratic midpoint: 0.25 * p0 + 0.5 * control + 0.25 * p2
        EdgeId::ResponseUser => ((x1 + x2) / 2.0, 0.25 * y1 + 240.0 + 0.25 * y2 - 6.0),
        _ => ((x1 + x2) / 2.0, (y1 + y2) / 2.0 - 6.0),
    }
}

#[component]
pub fn FlowView(state: Signal<FlowState>) -> Element {
    let mut selected = use_signal(|| None::<NodeId>);
    let snapshot = state.read();
    let edge_views = snapshot.edge_views();

    rsx! {
        style { {FLOW_STYLES} }

        div {
            class: "flow-card",
            div {
                class: "flow-head",
                h3 { class: "flow-title", "Agent activity" }
                span { class: "flow-hint", "Click an agent to see its history" }
            }
            svg {
                class: "flow-canvas",
                view_box: VIEW_BOX,
                for view in edge_views {
                    {
                        let (label_x, label_y) = edge_label_anchor(view.edge);
                        rsx! {
                            g {
                                key: "{view.edge}",
                                path {
                                    class: if view.animated { "flow-edge flow-edge--animated" } else { "flow-edge" },
                                    d: edge_path(view.edge),
                                    fill: "none",
                                }
                                text {
                                    class: "flow-edge-label",
                                    x: format!("{label_x:.1}"),
                                    y: format!("{label_y:.1}"),
                                    text_anchor: "middle",
                                    "{view.label}"
                                }
                            }
                        }
                    }
                }
                for node in NodeId::ALL {
                    {
                        let (cx, cy) = node.position();
                        let flags = snapshot.node(node);
                        let history = snapshot.traces(node).len();
                        let class = if flags.is_processing {
                            "flow-node flow-node--processing"
                        } else if flags.processing_complete {
                            "flow-node flow-node--complete"
                        } else {
                            "flow-node"
                        };
                        rsx! {
                            g {
                                key: "{node}",
                                class: "{class}",
                                onclick: move |_| selected.set(Some(node)),
                                rect {
                                    x: format!("{:.1}", cx - NODE_WIDTH / 2.0),
                                    y: format!("{:.1}", cy - NODE_HEIGHT / 2.0),
                                    width: "{NODE_WIDTH}",
                                    height: "{NODE_HEIGHT}",
                                    rx: "10",
                                    stroke: node.border_color(),
                                }
                                text {
                                    class: "flow-node-label",
                                    x: format!("{cx:.1}"),
                                    y: format!("{:.1}", cy + 4.0),
                                    text_anchor: "middle",
                                    "{node.label()}"
                                }
                                if history > 0 {
                                    circle {
                                        class: "flow-node-badge",
                                        cx: format!("{:.1}", cx + NODE_WIDTH / 2.0 - 4.0),
                                        cy: format!("{:.1}", cy - NODE_HEIGHT / 2.0 + 4.0),
                                        r: "10",
                                    }
                                    text {
                                        class: "flow-node-badge-text",
                                        x: format!("{:.1}", cx + NODE_WIDTH / 2.0 - 4.0),
                                        y: format!("{:.1}", cy - NODE_HEIGHT / 2.0 + 8.0),
                                        text_anchor: "middle",
                                        "{history}"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        if let Some(node) = selected() {
            NodeModal {
                node,
                traces: snapshot.trace_history(node),
                on_close: move |_| selected.set(None),
            }
        }
    }
}

#[component]
fn NodeModal(node: NodeId, traces: Rc<Vec<NodeTrace>>, on_close: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "flow-modal-backdrop",
            onclick: move |_| on_close.call(()),
            div {
                class: "flow-modal",
                onclick: move |e: MouseEvent| e.stop_propagation(),
                div {
                    class: "flow-modal-head",
                    h3 { style: "border-left: 4px solid {node.border_color()}; padding-left: 0.5rem;", "{node.label()}" }
                    button {
                        class: "flow-modal-close",
                        onclick: move |_| on_close.call(()),
                        "✕"
                    }
                }
                p { class: "flow-modal-description", "{node.description()}" }
                if traces.is_empty() {
                    p { class: "flow-modal-empty", "No activity yet." }
                } else {
                    div {
                        class: "flow-trace-list",
                        for (idx, trace) in traces.iter().enumerate() {
                            div {
                                key: "{idx}",
                                class: "flow-trace",
                                span {
                                    class: "flow-trace-time",
                                    "{trace_time(trace)}"
                                }
                                pre { class: "flow-trace-text", "{trace.text}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn trace_time(trace: &NodeTrace) -> String {
    trace.timestamp.format("%H:%M:%S").to_string()
}
