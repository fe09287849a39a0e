use std::collections::BTreeMap;
use std::fmt;

use dioxus_logger::tracing::{debug, warn};

// ── Nodes ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    User,
    Supervisor,
    LoanApplicant,
    Broker,
    Response,
}

impl NodeId {
    pub const ALL: [NodeId; 5] = [
        NodeId::User,
        NodeId::Supervisor,
        NodeId::LoanApplicant,
        NodeId::Broker,
        NodeId::Response,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeId::User => "user",
            NodeId::Supervisor => "supervisor",
            NodeId::LoanApplicant => "loanApplicant",
            NodeId::Broker => "broker",
            NodeId::Response => "response",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|node| node.as_str() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeId::User => "User",
            NodeId::Supervisor => "Supervisor Agent",
            NodeId::LoanApplicant => "Loan Applicant Agent",
            NodeId::Broker => "Broker Agent",
            NodeId::Response => "Response",
        }
    }

    pub fn border_color(self) -> &'static str {
        match self {
            NodeId::User => "#64748b",
            NodeId::Supervisor => "#3b82f6",
            NodeId::LoanApplicant => "#22c55e",
            NodeId::Broker => "#f59e0b",
            NodeId::Response => "#c084fc",
        }
    }

    /// Center of the node in diagram units.
    pub fn position(self) -> (f64, f64) {
        match self {
            NodeId::User => (90.0, 150.0),
            NodeId::Supervisor => (290.0, 150.0),
            NodeId::LoanApplicant => (490.0, 60.0),
            NodeId::Broker => (490.0, 240.0),
            NodeId::Response => (690.0, 150.0),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            NodeId::User => {
                "Messages typed in the chat panel. Each message starts a new request to the supervisor."
            }
            NodeId::Supervisor => {
                "Routes the request, decides which specialist to consult and composes the final answer."
            }
            NodeId::LoanApplicant => {
                "Looks up applicant details: income, employment, credit profile and existing applications."
            }
            NodeId::Broker => {
                "Answers product questions: rates, loan terms, eligibility rules and pre-approval letters."
            }
            NodeId::Response => "The reply delivered back to the chat once the supervisor is done.",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Edges ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeId {
    UserSupervisor,
    SupervisorLoanApplicant,
    SupervisorBroker,
    SupervisorResponse,
    ResponseUser,
}

impl EdgeId {
    pub const ALL: [EdgeId; 5] = [
        EdgeId::UserSupervisor,
        EdgeId::SupervisorLoanApplicant,
        EdgeId::SupervisorBroker,
        EdgeId::SupervisorResponse,
        EdgeId::ResponseUser,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeId::UserSupervisor => "e-user-supervisor",
            EdgeId::SupervisorLoanApplicant => "e-supervisor-loanApplicant",
            EdgeId::SupervisorBroker => "e-supervisor-broker",
            EdgeId::SupervisorResponse => "e-supervisor-response",
            EdgeId::ResponseUser => "e-response-user",
        }
    }

    pub fn endpoints(self) -> (NodeId, NodeId) {
        match self {
            EdgeId::UserSupervisor => (NodeId::User, NodeId::Supervisor),
            EdgeId::SupervisorLoanApplicant => (NodeId::Supervisor, NodeId::LoanApplicant),
            EdgeId::SupervisorBroker => (NodeId::Supervisor, NodeId::Broker),
            EdgeId::SupervisorResponse => (NodeId::Supervisor, NodeId::Response),
            EdgeId::ResponseUser => (NodeId::Response, NodeId::User),
        }
    }

    /// Edge from the supervisor into `node`, if the diagram has one.
    pub fn from_supervisor(node: NodeId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|edge| edge.endpoints() == (NodeId::Supervisor, node))
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Collaborator routing ─────────────────────────────────────────────────────

pub const LOAN_APPLICANT_COLLABORATOR: &str = "LoanApplicantAgent";
pub const BROKER_COLLABORATOR: &str = "BrokerAgent";

/// Maps collaborator names reported in traces to diagram nodes.
///
/// Names are matched trimmed and case-insensitively. Names missing from the
/// table resolve to nothing; they are reported instead of being folded into
/// an arbitrary node.
#[derive(Clone, Debug, PartialEq)]
pub struct CollaboratorRoutes {
    routes: BTreeMap<String, NodeId>,
}

impl Default for CollaboratorRoutes {
    fn default() -> Self {
        Self::empty()
            .with_route(LOAN_APPLICANT_COLLABORATOR, NodeId::LoanApplicant)
            .with_route(BROKER_COLLABORATOR, NodeId::Broker)
    }
}

fn route_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl CollaboratorRoutes {
    pub fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Adds or replaces the node for `name`. Only collaborator nodes are
    /// routable; anything else is rejected.
    pub fn with_route(mut self, name: impl AsRef<str>, node: NodeId) -> Self {
        if !matches!(node, NodeId::LoanApplicant | NodeId::Broker) {
            warn!("Ignoring collaborator route to non-collaborator node {}", node);
            return self;
        }
        let key = route_key(name.as_ref());
        if key.is_empty() {
            warn!("Ignoring collaborator route with a blank name");
            return self;
        }
        if let Some(previous) = self.routes.insert(key, node) {
            if previous != node {
                debug!("Collaborator {:?} rerouted from {} to {}", name.as_ref(), previous, node);
            }
        }
        self
    }

    pub fn resolve(&self, collaborator: &str) -> Option<NodeId> {
        self.routes.get(&route_key(collaborator)).copied()
    }
}
