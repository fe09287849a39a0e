//! Shared types between the loan assistant UI and the chat backend
//!
//! These types describe:
//! - chat turns as delivered by the push subscription and the list query
//! - the JSON payload embedded in a turn (attachments and agent traces)
//! - outbound requests the UI sends to the resolver
//!
//! Serializable with serde for JSON over WebSocket/HTTP

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// ============================================================================
// Chat Turns
// ============================================================================

/// One human/bot exchange.
///
/// `payload` is a JSON document encoded as a string; it is decoded lazily
/// with [`ChatTurn::parse_payload`] because the backend rewrites it on every
/// trace update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub struct ChatTurn {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(default)]
    pub human: Option<String>,
    #[serde(default)]
    pub bot: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// A freshly submitted turn: human text set, no reply yet.
    pub fn new(user_id: impl Into<String>, human: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            user_id: user_id.into(),
            human: Some(human.into()),
            bot: None,
            payload: None,
            created_at: Utc::now(),
        }
    }

    /// Human utterance, ignoring blank strings.
    pub fn human_text(&self) -> Option<&str> {
        non_blank(self.human.as_deref())
    }

    /// Bot reply, ignoring the empty placeholder the backend sends while the
    /// agent is still working.
    pub fn bot_reply(&self) -> Option<&str> {
        non_blank(self.bot.as_deref())
    }

    pub fn awaiting_reply(&self) -> bool {
        self.human_text().is_some() && self.bot_reply().is_none()
    }

    /// Decode the embedded payload.
    ///
    /// Absent or blank payloads are `Ok(None)`; anything that is not valid
    /// payload JSON is an error the caller is expected to log and drop.
    pub fn parse_payload(&self) -> Result<Option<TurnPayload>, PayloadError> {
        let Some(raw) = non_blank(self.payload.as_deref()) else {
            return Ok(None);
        };
        serde_json::from_str::<TurnPayload>(raw)
            .map(Some)
            .map_err(|source| PayloadError::Malformed {
                turn_id: self.id.clone(),
                source,
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed payload on turn {turn_id}: {source}")]
    Malformed {
        turn_id: String,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Turn Payload
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub struct TurnPayload {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub trace: Option<TraceEnvelope>,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub metrics: Option<serde_json::Value>,
}

/// Attachment referenced by a turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image_url: String,
}

// ============================================================================
// Agent Traces
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub struct TraceEnvelope {
    #[serde(rename = "type", default = "trace_kind")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub content: TraceContent,
}

fn trace_kind() -> String {
    "trace".to_string()
}

impl TraceEnvelope {
    /// Event time reported by the backend.
    ///
    /// Accepts RFC 3339 as well as offset-less ISO timestamps, which are
    /// taken to be UTC.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub struct TraceContent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub collaborator_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<TraceStatus>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TraceContent {
    pub fn action(&self) -> Option<TraceAction> {
        self.action.as_deref().map(TraceAction::parse)
    }

    pub fn collaborator(&self) -> Option<&str> {
        non_blank(self.collaborator_name.as_deref())
    }

    pub fn text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }

    pub fn status(&self) -> TraceStatus {
        self.status.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub enum TraceStatus {
    Complete,
    Error,
    #[default]
    #[serde(other)]
    Processing,
}

/// Action tag of a trace. Only the model invocation pair drives the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceAction {
    ModelInvocationInput,
    ModelInvocationOutput,
    Rationale,
    Observation,
    InvocationInput,
    Other(String),
}

impl TraceAction {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "modelInvocationInput" => Self::ModelInvocationInput,
            "modelInvocationOutput" => Self::ModelInvocationOutput,
            "rationale" => Self::Rationale,
            "observation" => Self::Observation,
            "invocationInput" => Self::InvocationInput,
            other => Self::Other(other.to_string()),
        }
    }
}

// ============================================================================
// Subscription Protocol
// ============================================================================

/// Server → Client message on the per-user chat subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub enum SubscriptionMessage {
    /// Subscription established
    Connected,

    /// A turn was created or updated
    Chat { chat: ChatTurn },

    /// Transport or resolver error
    Error { message: String },
}

// ============================================================================
// Outbound Requests
// ============================================================================

/// Message sent verbatim to end the agent session.
pub const END_SESSION_MESSAGE: &str = "end_session";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub struct ChatRequest {
    pub opr: String,
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl ChatRequest {
    pub fn for_turn(turn: &ChatTurn, documents: Vec<Document>) -> Self {
        Self {
            opr: "chat".to_string(),
            id: turn.id.clone(),
            user_id: turn.user_id.clone(),
            message: turn.human.clone().unwrap_or_default(),
            documents,
        }
    }

    pub fn ends_session(&self) -> bool {
        self.message.contains(END_SESSION_MESSAGE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../loan-ui/src/types/generated.ts")]
pub struct ApprovalLetterRequest {
    pub application_name: String,
    pub date: String,
    pub loan_amount: String,
    pub loan_terms: String,
    pub mail_address: String,
    pub property_address: String,
    pub property_address_same_as_mail: bool,
    pub purchase_price: String,
    pub satisfactory_purchase_agreement: bool,
    pub sufficient_appraisal: bool,
    pub marketable_title: bool,
}

impl Default for ApprovalLetterRequest {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            date: String::new(),
            loan_amount: String::new(),
            loan_terms: String::new(),
            mail_address: String::new(),
            property_address: String::new(),
            property_address_same_as_mail: false,
            purchase_price: String::new(),
            satisfactory_purchase_agreement: true,
            sufficient_appraisal: true,
            marketable_title: true,
        }
    }
}

impl ApprovalLetterRequest {
    /// Property address to print, honoring the same-as-mail flag.
    pub fn effective_property_address(&self) -> &str {
        if self.property_address_same_as_mail {
            &self.mail_address
        } else {
            &self.property_address
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("applicationName", &self.application_name),
            ("loanAmount", &self.loan_amount),
            ("mailAddress", &self.mail_address),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if self.effective_property_address().trim().is_empty() {
            missing.push("propertyAddress");
        }
        missing
    }
}

// ============================================================================
// API Types
// ============================================================================

/// Generic API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ts_rs::Config;

    fn turn_with_payload(payload: Option<&str>) -> ChatTurn {
        ChatTurn {
            id: "turn-1".to_string(),
            user_id: "user-1".to_string(),
            human: Some("How much can I borrow?".to_string()),
            bot: None,
            payload: payload.map(ToString::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_turn_ids_are_unique() {
        let a = ChatTurn::new("user-1", "hi");
        let b = ChatTurn::new("user-1", "hi");
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 26); // ULID length
        assert!(a.awaiting_reply());
    }

    #[test]
    fn test_turn_wire_names() {
        let json = r#"{
            "id": "t1",
            "userID": "u1",
            "human": "hello",
            "bot": "",
            "payload": null,
            "createdAt": "2025-01-10T09:30:00.000Z"
        }"#;
        let turn: ChatTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.user_id, "u1");
        assert_eq!(turn.bot_reply(), None);
        assert!(turn.awaiting_reply());
    }

    #[test]
    fn test_blank_payload_is_absent() {
        assert_eq!(turn_with_payload(None).parse_payload().unwrap(), None);
        assert_eq!(turn_with_payload(Some("  ")).parse_payload().unwrap(), None);
    }

    #[test]
    fn test_malformed_payload_is_error() {
        let err = turn_with_payload(Some("{not json"))
            .parse_payload()
            .unwrap_err();
        assert!(err.to_string().contains("turn-1"));
    }

    #[test]
    fn test_payload_with_trace_and_documents() {
        let raw = r#"{
            "trace": {
                "type": "trace",
                "timestamp": "2025-01-10T09:30:01.250000",
                "content": {
                    "collaboratorName": "LoanApplicantAgent",
                    "action": "modelInvocationOutput",
                    "sessionId": "s-1",
                    "status": "processing",
                    "text": "Checking income"
                }
            },
            "metrics": {},
            "documents": [{"id": "d1", "title": "w2.pdf", "imageUrl": "https://x/w2.pdf"}]
        }"#;
        let payload = turn_with_payload(Some(raw)).parse_payload().unwrap().unwrap();
        assert_eq!(payload.documents.len(), 1);
        assert_eq!(payload.documents[0].image_url, "https://x/w2.pdf");

        let trace = payload.trace.unwrap();
        assert_eq!(trace.content.action(), Some(TraceAction::ModelInvocationOutput));
        assert_eq!(trace.content.collaborator(), Some("LoanApplicantAgent"));
        assert_eq!(trace.content.text(), Some("Checking income"));
        let at = trace.event_time().unwrap();
        assert_eq!(at.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_trace_status_is_lenient() {
        let content: TraceContent =
            serde_json::from_str(r#"{"status": "queued", "collaboratorName": null}"#).unwrap();
        assert_eq!(content.status(), TraceStatus::Processing);
        assert_eq!(content.collaborator(), None);

        let content: TraceContent = serde_json::from_str(r#"{"status": "complete"}"#).unwrap();
        assert_eq!(content.status(), TraceStatus::Complete);

        let content: TraceContent = serde_json::from_str("{}").unwrap();
        assert_eq!(content.status(), TraceStatus::Processing);
        assert_eq!(content.action(), None);

        let content: TraceContent = serde_json::from_str(r#"{"status": "error", "error": "timeout"}"#).unwrap();
        assert_eq!(content.status(), TraceStatus::Error);
        assert_eq!(serde_json::to_string(&TraceStatus::Processing).unwrap(), r#""processing""#);
        assert_eq!(serde_json::to_string(&TraceStatus::Complete).unwrap(), r#""complete""#);
    }

    #[test]
    fn test_rfc3339_event_time() {
        let envelope = TraceEnvelope {
            kind: "trace".to_string(),
            timestamp: Some("2025-01-10T09:30:00+02:00".to_string()),
            content: TraceContent::default(),
        };
        assert_eq!(
            envelope.event_time().unwrap().to_rfc3339(),
            "2025-01-10T07:30:00+00:00"
        );
    }

    #[test]
    fn test_subscription_message_protocol() {
        let msg: SubscriptionMessage =
            serde_json::from_str(r#"{"type": "error", "message": "unauthorized"}"#).unwrap();
        assert_eq!(
            msg,
            SubscriptionMessage::Error {
                message: "unauthorized".to_string()
            }
        );

        let json = serde_json::to_string(&SubscriptionMessage::Connected).unwrap();
        assert_eq!(json, r#"{"type":"connected"}"#);
    }

    #[test]
    fn test_chat_request_end_session() {
        let turn = ChatTurn::new("user-1", END_SESSION_MESSAGE);
        let request = ChatRequest::for_turn(&turn, Vec::new());
        assert!(request.ends_session());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["opr"], "chat");
        assert_eq!(json["userID"], "user-1");
    }

    #[test]
    fn test_approval_letter_defaults_and_validation() {
        let mut request = ApprovalLetterRequest::default();
        assert!(request.marketable_title);
        assert!(!request.property_address_same_as_mail);
        assert_eq!(
            request.missing_fields(),
            vec!["applicationName", "loanAmount", "mailAddress", "propertyAddress"]
        );

        request.application_name = "Jane Doe".to_string();
        request.loan_amount = "350000".to_string();
        request.mail_address = "1 Main St".to_string();
        request.property_address_same_as_mail = true;
        assert!(request.missing_fields().is_empty());
        assert_eq!(request.effective_property_address(), "1 Main St");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["propertyAddressSameAsMail"], true);
    }

    #[test]
    fn export_types() {
        // Export all types to TypeScript
        // The export_to attribute in each type's #[ts] macro specifies the output file
        let config = Config::default();
        ChatTurn::export(&config).unwrap();
        TurnPayload::export(&config).unwrap();
        Document::export(&config).unwrap();
        TraceEnvelope::export(&config).unwrap();
        TraceContent::export(&config).unwrap();
        TraceStatus::export(&config).unwrap();
        SubscriptionMessage::export(&config).unwrap();
        ChatRequest::export(&config).unwrap();
        ApprovalLetterRequest::export(&config).unwrap();
    }
}
