//! Runtime configuration resolved once from the browser environment.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use dioxus_logger::tracing::{info, warn};

use crate::bridge::BridgeSettings;
use crate::flow::graph::{CollaboratorRoutes, NodeId};

const USER_ID_KEY: &str = "loan-assistant.user-id";
const COLLABORATORS_KEY: &str = "loan-assistant.collaborators";

#[derive(Clone, Debug, PartialEq)]
pub struct UiConfig {
    pub api_base: String,
    pub user_id: String,
    pub bridge: BridgeSettings,
}

static UI_CONFIG: OnceLock<UiConfig> = OnceLock::new();

/// Configuration for this page load.
pub fn ui_config() -> &'static UiConfig {
    UI_CONFIG.get_or_init(load_ui_config)
}

fn load_ui_config() -> UiConfig {
    let hostname = web_sys::window()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default();

    let user_id = cached_user_id().unwrap_or_else(|| {
        let fresh = uuid::Uuid::new_v4().to_string();
        store_item(USER_ID_KEY, &fresh);
        fresh
    });

    let routes = read_item(COLLABORATORS_KEY)
        .map(|raw| parse_collaborator_routes(&raw))
        .unwrap_or_default();

    let config = UiConfig {
        api_base: api_base_for_host(&hostname),
        user_id,
        bridge: BridgeSettings {
            routes,
            ..BridgeSettings::default()
        },
    };
    info!("Loan assistant UI configured for API base {:?}", config.api_base);
    config
}

/// Local development talks to the API on port 8080; deployed builds are
/// served by the API itself.
pub fn api_base_for_host(hostname: &str) -> String {
    if hostname == "localhost" || hostname == "127.0.0.1" {
        "http://localhost:8080".to_string()
    } else {
        String::new()
    }
}

/// Parse a `{"<collaborator name>": "<node id>"}` override map on top of the
/// default routes. Bad entries are skipped.
pub fn parse_collaborator_routes(raw: &str) -> CollaboratorRoutes {
    let overrides = match serde_json::from_str::<BTreeMap<String, String>>(raw) {
        Ok(overrides) => overrides,
        Err(e) => {
            warn!("Ignoring unreadable collaborator routes: {}", e);
            return CollaboratorRoutes::default();
        }
    };

    overrides
        .into_iter()
        .fold(CollaboratorRoutes::default(), |routes, (name, node)| {
            match NodeId::parse(&node) {
                Some(node) => routes.with_route(name, node),
                None => {
                    warn!("Unknown node {:?} for collaborator {:?}", node, name);
                    routes
                }
            }
        })
}

fn cached_user_id() -> Option<String> {
    read_item(USER_ID_KEY).filter(|id| !id.trim().is_empty())
}

fn read_item(key: &str) -> Option<String> {
    web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(key).ok().flatten())
}

fn store_item(key: &str, value: &str) {
    if let Some(storage) =
        web_sys::window().and_then(|window| window.local_storage().ok().flatten())
    {
        let _ = storage.set_item(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_points_at_dev_api() {
        assert_eq!(api_base_for_host("localhost"), "http://localhost:8080");
        assert_eq!(api_base_for_host("127.0.0.1"), "http://localhost:8080");
        assert_eq!(api_base_for_host("loans.example.com"), "");
    }

    #[test]
    fn route_overrides_extend_defaults() {
        let routes = parse_collaborator_routes(
            r#"{"MortgageBroker": "broker", "Ghost": "nowhere", "Closer": "response"}"#,
        );
        assert_eq!(routes.resolve("MortgageBroker"), Some(NodeId::Broker));
        assert_eq!(routes.resolve("LoanApplicantAgent"), Some(NodeId::LoanApplicant));
        assert_eq!(routes.resolve("Ghost"), None);
        assert_eq!(routes.resolve("Closer"), None);
    }

    #[test]
    fn lowercase_override_wins_over_default_entry() {
        let routes = parse_collaborator_routes(r#"{"brokeragent": "loanApplicant"}"#);
        assert_eq!(routes.resolve("BrokerAgent"), Some(NodeId::LoanApplicant));
    }

    #[test]
    fn unreadable_overrides_fall_back() {
        assert_eq!(
            parse_collaborator_routes("not json"),
            CollaboratorRoutes::default()
        );
    }
}
