//! Turns agent traces into diagram commands.

use chrono::{DateTime, Utc};
use dioxus_logger::tracing::{debug, warn};
use shared_types::{ChatTurn, TraceAction, TraceEnvelope, TraceStatus};

use crate::flow::graph::{CollaboratorRoutes, EdgeId, NodeId};
use crate::flow::state::{FlowCommand, NodeStatePatch, NodeTrace, EDGE_HOLD_MS};

#[derive(Clone, Debug, PartialEq)]
pub struct BridgeSettings {
    pub routes: CollaboratorRoutes,
    pub edge_hold_ms: u32,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            routes: CollaboratorRoutes::default(),
            edge_hold_ms: EDGE_HOLD_MS,
        }
    }
}

/// Commands for one delivered turn.
///
/// `trace` is the trace embedded in the turn's payload, if any. The
/// final-reply rule runs whether or not a trace is present.
pub fn classify(
    trace: Option<&TraceEnvelope>,
    turn: &ChatTurn,
    settings: &BridgeSettings,
    now: DateTime<Utc>,
) -> Vec<FlowCommand> {
    let mut commands = Vec::new();

    if let Some(trace) = trace {
        classify_trace(trace, settings, now, &mut commands);
    }

    if let Some(reply) = turn.bot_reply() {
        commands.push(FlowCommand::AddNodeTrace {
            node: NodeId::Response,
            trace: NodeTrace {
                timestamp: now,
                text: reply.to_string(),
            },
        });
        commands.push(FlowCommand::UpdateNodeState {
            node: NodeId::Supervisor,
            patch: NodeStatePatch::complete(),
        });
        commands.push(FlowCommand::ClearEdgeAnimationAfter {
            edge: EdgeId::SupervisorResponse,
            delay_ms: settings.edge_hold_ms,
        });
        pulse(EdgeId::ResponseUser, settings.edge_hold_ms, &mut commands);
    }

    commands
}

fn classify_trace(
    trace: &TraceEnvelope,
    settings: &BridgeSettings,
    now: DateTime<Utc>,
    commands: &mut Vec<FlowCommand>,
) {
    let content = &trace.content;
    if content.status() == TraceStatus::Error {
        warn!(
            "Agent trace reported an error: {}",
            content.error.as_deref().unwrap_or("unknown error")
        );
    }

    let timestamp = trace.event_time().unwrap_or(now);
    let node_trace = |text: &str| NodeTrace {
        timestamp,
        text: text.to_string(),
    };

    match (content.action(), content.collaborator()) {
        (Some(TraceAction::ModelInvocationInput), None) => {
            if let Some(text) = content.text() {
                commands.push(FlowCommand::AddNodeTrace {
                    node: NodeId::Supervisor,
                    trace: node_trace(text),
                });
            }
            commands.push(FlowCommand::UpdateNodeState {
                node: NodeId::Supervisor,
                patch: NodeStatePatch::processing(),
            });
            pulse(EdgeId::UserSupervisor, settings.edge_hold_ms, commands);
            // Stays on until the reply arrives.
            commands.push(FlowCommand::UpdateEdgeAnimation {
                edge: EdgeId::SupervisorResponse,
                animated: true,
            });
        }
        (Some(TraceAction::ModelInvocationOutput), Some(collaborator)) => {
            let Some(node) = settings.routes.resolve(collaborator) else {
                warn!("No diagram node for collaborator {:?}; trace skipped", collaborator);
                return;
            };
            let Some(edge) = EdgeId::from_supervisor(node) else {
                return;
            };
            if let Some(text) = content.text() {
                commands.push(FlowCommand::AddNodeTrace {
                    node,
                    trace: node_trace(text),
                });
            }
            commands.push(FlowCommand::IncrementEdgeCount { edge });
            pulse(edge, settings.edge_hold_ms, commands);
            commands.push(FlowCommand::UpdateNodeState {
                node,
                patch: NodeStatePatch::complete(),
            });
        }
        (Some(TraceAction::ModelInvocationOutput), None) => {
            if let Some(text) = content.text() {
                commands.push(FlowCommand::AddNodeTrace {
                    node: NodeId::Supervisor,
                    trace: node_trace(text),
                });
            }
        }
        (action, collaborator) => {
            debug!(
                "Trace not drawn: action={:?} collaborator={:?}",
                action, collaborator
            );
        }
    }
}

fn pulse(edge: EdgeId, hold_ms: u32, commands: &mut Vec<FlowCommand>) {
    commands.push(FlowCommand::UpdateEdgeAnimation {
        edge,
        animated: true,
    });
    commands.push(FlowCommand::ClearEdgeAnimationAfter {
        edge,
        delay_ms: hold_ms,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::graph::LOAN_APPLICANT_COLLABORATOR;
    use crate::flow::state::{reduce, reduce_all, FlowState};
    use shared_types::TraceContent;

    fn turn(bot: Option<&str>) -> ChatTurn {
        ChatTurn {
            id: "turn-1".to_string(),
            user_id: "user-1".to_string(),
            human: Some("Can I get pre-approved?".to_string()),
            bot: bot.map(ToString::to_string),
            payload: None,
            created_at: Utc::now(),
        }
    }

    fn trace(action: &str, collaborator: Option<&str>, text: Option<&str>) -> TraceEnvelope {
        TraceEnvelope {
            kind: "trace".to_string(),
            timestamp: None,
            content: TraceContent {
                action: Some(action.to_string()),
                collaborator_name: collaborator.map(ToString::to_string),
                text: text.map(ToString::to_string),
                ..TraceContent::default()
            },
        }
    }

    fn run(trace: Option<&TraceEnvelope>, turn: &ChatTurn) -> (FlowState, Vec<FlowCommand>) {
        let commands = classify(trace, turn, &BridgeSettings::default(), Utc::now());
        let (state, deferred) = reduce_all(&FlowState::default(), commands);
        (
            state,
            deferred.into_iter().map(|deferred| deferred.command).collect(),
        )
    }

    #[test]
    fn supervisor_input_with_text() {
        let input = trace("modelInvocationInput", None, Some("User wants a loan"));
        let (state, expirations) = run(Some(&input), &turn(None));

        assert_eq!(state.traces(NodeId::Supervisor).len(), 1);
        assert_eq!(state.traces(NodeId::Supervisor)[0].text, "User wants a loan");
        assert!(state.edge(EdgeId::UserSupervisor).animated);
        assert!(state.edge(EdgeId::SupervisorResponse).animated);
        assert!(state.node(NodeId::Supervisor).is_processing);

        // Only the user edge is scheduled to clear.
        assert_eq!(expirations.len(), 1);
        let cleared = reduce(&state, expirations[0].clone()).state;
        assert!(!cleared.edge(EdgeId::UserSupervisor).animated);
        assert!(cleared.edge(EdgeId::SupervisorResponse).animated);
    }

    #[test]
    fn supervisor_input_without_text_still_animates() {
        let input = trace("modelInvocationInput", None, Some("   "));
        let (state, _) = run(Some(&input), &turn(None));
        assert!(state.traces(NodeId::Supervisor).is_empty());
        assert!(state.edge(EdgeId::UserSupervisor).animated);
    }

    #[test]
    fn loan_applicant_output_counts_only_its_edge() {
        let output = trace(
            "modelInvocationOutput",
            Some(LOAN_APPLICANT_COLLABORATOR),
            Some("Applicant income verified"),
        );
        let before = FlowState::default();
        let (state, _) = run(Some(&output), &turn(None));

        assert_eq!(state.edge(EdgeId::SupervisorLoanApplicant).count, 1);
        assert!(state.edge(EdgeId::SupervisorLoanApplicant).animated);
        assert_eq!(state.traces(NodeId::LoanApplicant).len(), 1);
        assert!(state.node(NodeId::LoanApplicant).processing_complete);

        assert_eq!(
            state.edge(EdgeId::SupervisorBroker),
            before.edge(EdgeId::SupervisorBroker)
        );
        assert_eq!(state.node(NodeId::Broker), before.node(NodeId::Broker));
        assert!(state.traces(NodeId::Broker).is_empty());
    }

    #[test]
    fn unknown_collaborator_is_not_drawn() {
        let output = trace("modelInvocationOutput", Some("UnderwriterAgent"), Some("hi"));
        let (state, _) = run(Some(&output), &turn(None));
        assert_eq!(state, FlowState::default());
    }

    #[test]
    fn supervisor_output_only_appends() {
        let output = trace("modelInvocationOutput", None, Some("Routing to broker"));
        let (state, expirations) = run(Some(&output), &turn(None));
        assert_eq!(state.traces(NodeId::Supervisor).len(), 1);
        assert!(expirations.is_empty());
        assert!(state.edge_views().iter().all(|view| !view.animated));
    }

    #[test]
    fn other_actions_are_ignored() {
        let rationale = trace("rationale", None, Some("thinking"));
        let commands = classify(
            Some(&rationale),
            &turn(None),
            &BridgeSettings::default(),
            Utc::now(),
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn final_reply_lands_on_response_node() {
        let input = trace("modelInvocationInput", None, None);
        let (state, _) = run(Some(&input), &turn(None));

        let commands = classify(None, &turn(Some("Approved")), &BridgeSettings::default(), Utc::now());
        let (state, deferred) = reduce_all(&state, commands);

        assert_eq!(state.traces(NodeId::Response).len(), 1);
        assert_eq!(state.traces(NodeId::Response)[0].text, "Approved");
        assert!(state.edge(EdgeId::SupervisorResponse).animated);
        assert!(state.node(NodeId::Supervisor).processing_complete);

        let clear_response = deferred
            .iter()
            .find(|deferred| {
                matches!(
                    deferred.command,
                    FlowCommand::ExpireEdgeAnimation {
                        edge: EdgeId::SupervisorResponse,
                        ..
                    }
                )
            })
            .unwrap();
        assert_eq!(clear_response.delay_ms, EDGE_HOLD_MS);
        let settled = reduce(&state, clear_response.command.clone()).state;
        assert!(!settled.edge(EdgeId::SupervisorResponse).animated);
    }

    #[test]
    fn empty_bot_placeholder_is_not_a_reply() {
        let commands = classify(None, &turn(Some("")), &BridgeSettings::default(), Utc::now());
        assert!(commands.is_empty());
    }

    #[test]
    fn trace_timestamp_is_used_when_present() {
        let mut input = trace("modelInvocationInput", None, Some("hello"));
        input.timestamp = Some("2025-03-01T08:00:00Z".to_string());
        let (state, _) = run(Some(&input), &turn(None));
        assert_eq!(
            state.traces(NodeId::Supervisor)[0].timestamp.to_rfc3339(),
            "2025-03-01T08:00:00+00:00"
        );
    }
}
