use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{ApiResponse, ApprovalLetterRequest, ChatRequest, ChatTurn};
use thiserror::Error;

use crate::config::ui_config;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("failed to parse JSON: {0}")]
    Decode(String),
    #[error("API error: {0}")]
    Rejected(String),
}

/// Get the API base URL for this page load
pub fn api_base() -> &'static str {
    ui_config().api_base.as_str()
}

#[derive(Debug, Deserialize)]
pub struct GetChatsResponse {
    pub success: bool,
    #[serde(default)]
    pub chats: Vec<ChatTurn>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendChatResponse {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApprovalLetterEnvelope<'a> {
    opr: &'static str,
    #[serde(flatten)]
    request: &'a ApprovalLetterRequest,
}

/// All turns for `user_id`, oldest first.
pub async fn fetch_turns(user_id: &str) -> Result<Vec<ChatTurn>, ApiError> {
    let url = format!("{}/chats", api_base());

    let response = Request::get(&url)
        .query([("user_id", user_id)])
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    let data: GetChatsResponse = decode(response).await?;
    if !data.success {
        return Err(ApiError::Rejected(
            data.error.unwrap_or_else(|| "success=false".to_string()),
        ));
    }

    let mut chats = data.chats;
    chats.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(chats)
}

/// Submit a turn; the reply arrives on the subscription.
pub async fn send_chat(request: &ChatRequest) -> Result<(), ApiError> {
    let url = format!("{}/chat", api_base());

    let response = Request::post(&url)
        .json(request)
        .map_err(|e| ApiError::Request(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    let data: SendChatResponse = decode(response).await?;
    if !data.success {
        return Err(ApiError::Rejected(
            data.error.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }
    Ok(())
}

/// Returns the generated letter as HTML.
pub async fn generate_approval_letter(request: &ApprovalLetterRequest) -> Result<String, ApiError> {
    let url = format!("{}/approval-letter", api_base());
    let envelope = ApprovalLetterEnvelope {
        opr: "generate_approval_letter",
        request,
    };

    let response = Request::post(&url)
        .json(&envelope)
        .map_err(|e| ApiError::Request(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    let data: ApiResponse<String> = decode(response).await?;
    letter_from_response(data)
}

fn letter_from_response(data: ApiResponse<String>) -> Result<String, ApiError> {
    if !data.success {
        return Err(ApiError::Rejected(
            data.error.unwrap_or_else(|| "Letter generation failed".to_string()),
        ));
    }
    data.data
        .filter(|html| !html.trim().is_empty())
        .ok_or_else(|| ApiError::Rejected("Empty letter returned".to_string()))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.ok() {
        return Err(ApiError::Http(response.status()));
    }
    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_envelope_is_flat() {
        let request = ApprovalLetterRequest {
            application_name: "Jane Doe".to_string(),
            ..ApprovalLetterRequest::default()
        };
        let json = serde_json::to_value(ApprovalLetterEnvelope {
            opr: "generate_approval_letter",
            request: &request,
        })
        .unwrap();
        assert_eq!(json["opr"], "generate_approval_letter");
        assert_eq!(json["applicationName"], "Jane Doe");
        assert_eq!(json["marketableTitle"], true);
    }

    #[test]
    fn letter_response_handling() {
        let ok = ApiResponse {
            success: true,
            data: Some("<p>Approved</p>".to_string()),
            error: None,
        };
        assert_eq!(letter_from_response(ok).unwrap(), "<p>Approved</p>");

        let failed: ApiResponse<String> = ApiResponse {
            success: false,
            data: None,
            error: Some("Agent unavailable".to_string()),
        };
        assert_eq!(
            letter_from_response(failed).unwrap_err().to_string(),
            "API error: Agent unavailable"
        );

        let empty = ApiResponse {
            success: true,
            data: Some(" ".to_string()),
            error: None,
        };
        assert!(letter_from_response(empty).is_err());
    }

    #[test]
    fn chats_response_tolerates_missing_list() {
        let data: GetChatsResponse =
            serde_json::from_str(r#"{"success": false, "error": "denied"}"#).unwrap();
        assert!(data.chats.is_empty());
        assert_eq!(data.error.as_deref(), Some("denied"));
    }
}
