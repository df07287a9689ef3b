//! IPC Message Types
//!
//! JSON messages for front-end ↔ relay communication.

use crate::error::RelayError;
use crate::relay::ExplanationResult;
use serde::{Deserialize, Serialize};

/// Requests sent from a front-end to the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelayRequest {
    /// Explain `word` as used in `context`
    #[serde(rename = "queryLLM")]
    QueryLlm { word: String, context: String },

    /// List the models the upstream offers
    #[serde(rename = "checkModels")]
    CheckModels,

    /// Re-read the settings file and rebuild the backend
    #[serde(rename = "reloadSettings")]
    ReloadSettings,
}

/// Relay reply. `success` decides which of the optional fields is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn ack() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn from_explanation(result: ExplanationResult) -> Self {
        match result {
            Ok(text) => Self {
                success: true,
                explanation: Some(text),
                ..Self::default()
            },
            Err(e) => Self::failure(e.to_string()),
        }
    }

    pub fn from_models(result: Result<Vec<String>, RelayError>) -> Self {
        match result {
            Ok(models) => Self {
                success: true,
                models: Some(models),
                ..Self::default()
            },
            Err(e) => Self::failure(e.to_string()),
        }
    }

    /// Explanation text on success, the relay's error string otherwise
    pub fn into_explanation(self) -> ExplanationResult {
        if self.success {
            Ok(self.explanation.unwrap_or_default())
        } else {
            Err(self.into_remote_error())
        }
    }

    pub fn into_models(self) -> Result<Vec<String>, RelayError> {
        if self.success {
            Ok(self.models.unwrap_or_default())
        } else {
            Err(self.into_remote_error())
        }
    }

    fn into_remote_error(self) -> RelayError {
        RelayError::Remote(self.error.unwrap_or_else(|| "unknown relay error".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_wire_format() {
        let req = RelayRequest::QueryLlm {
            word: "bank".to_string(),
            context: "the river bank".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "queryLLM", "word": "bank", "context": "the river bank"})
        );
    }

    #[test]
    fn test_unit_requests_parse() {
        let req: RelayRequest = serde_json::from_str(r#"{"type":"checkModels"}"#).unwrap();
        assert_eq!(req, RelayRequest::CheckModels);
        let req: RelayRequest = serde_json::from_str(r#"{"type":"reloadSettings"}"#).unwrap();
        assert_eq!(req, RelayRequest::ReloadSettings);
        assert!(serde_json::from_str::<RelayRequest>(r#"{"type":"getExplanation"}"#).is_err());
    }

    #[test]
    fn test_response_shapes() {
        let ok = RelayResponse::from_explanation(Ok("It means X.".to_string()));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "explanation": "It means X."})
        );

        let err = RelayResponse::from_explanation(Err(RelayError::UpstreamHttpError(500)));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"success": false, "error": "upstream returned HTTP 500"})
        );

        let models = RelayResponse::from_models(Ok(vec![]));
        assert_eq!(
            serde_json::to_value(&models).unwrap(),
            serde_json::json!({"success": true, "models": []})
        );
    }

    #[test]
    fn test_response_back_to_result() {
        let resp: RelayResponse =
            serde_json::from_str(r#"{"success":false,"error":"upstream unreachable: refused"}"#)
                .unwrap();
        assert_eq!(
            resp.into_explanation(),
            Err(RelayError::Remote("upstream unreachable: refused".to_string()))
        );

        let resp: RelayResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(resp.into_models(), Ok(vec![]));
    }
}
