use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{ErrorType, Transaction, TransactionType};

/// Cursor-paginated response envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub per_page: u32,
    pub count: u64,
    /// Opaque continuation token; `None` on the last page.
    pub next_cursor: Option<String>,
    pub next_page_url: Option<String>,
}

/// Body of `POST /v2/transactions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub content: JsonValue,
}

impl SentTransaction {
    pub fn new(transaction_type: TransactionType, content: JsonValue) -> Self {
        Self {
            transaction_type,
            content,
        }
    }
}

/// Body of `PUT /v2/transactions/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkProcessedRequest {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_context: Option<BTreeMap<String, String>>,
}

impl MarkProcessedRequest {
    pub fn success() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(error_type: ErrorType, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error_reason: Some(reason.into()),
            error_type: Some(error_type),
            error_context: None,
        }
    }
}

/// Entry of `POST /v2/transactions/bulk/mark-processed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMarkProcessedItem {
    pub procuros_transaction_id: String,
    #[serde(flatten)]
    pub result: MarkProcessedRequest,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkMarkProcessedBody<'a> {
    pub items: &'a [BulkMarkProcessedItem],
}

/// Body of `POST /v2/errors`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportErrorRequest {
    pub error_reason: String,
    pub error_type: ErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_context: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedMessage {
    pub message: String,
    #[serde(default)]
    pub error_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MarkProcessedResponse {
    pub data: ProcessedMessage,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMarkProcessedResult {
    pub procuros_transaction_id: String,
    pub message: String,
    #[serde(default)]
    pub error_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BulkMarkProcessedResponse {
    pub data: Vec<BulkMarkProcessedResult>,
}

pub type ReportErrorResponse = ProcessedMessage;

/// Result of sending a transaction: created synchronously, or accepted for
/// asynchronous processing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SendTransactionResponse {
    #[serde(rename_all = "camelCase")]
    Created { procuros_transaction_id: String },
    Accepted { message: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShowTransactionResponse {
    pub data: Transaction,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_envelope_uses_camel_case() {
        let page: Page<u32> = serde_json::from_value(json!({
            "items": [1, 2],
            "hasMore": true,
            "perPage": 2,
            "count": 2,
            "nextCursor": "abc",
            "nextPageUrl": "https://api.example.test/v2/transactions?cursor=abc"
        }))
        .unwrap();

        assert_eq!(page.items, vec![1, 2]);
        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn bulk_item_flattens_result() {
        let item = BulkMarkProcessedItem {
            procuros_transaction_id: "id-1".to_owned(),
            result: MarkProcessedRequest::failure(ErrorType::Data, "missing GTIN"),
        };

        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "procurosTransactionId": "id-1",
                "success": false,
                "errorReason": "missing GTIN",
                "errorType": "DATA"
            })
        );
    }

    #[test]
    fn send_response_variants() {
        let created: SendTransactionResponse =
            serde_json::from_value(json!({"procurosTransactionId": "abc"})).unwrap();
        let accepted: SendTransactionResponse =
            serde_json::from_value(json!({"message": "Accepted."})).unwrap();

        assert_eq!(
            created,
            SendTransactionResponse::Created {
                procuros_transaction_id: "abc".to_owned()
            }
        );
        assert!(matches!(accepted, SendTransactionResponse::Accepted { .. }));
    }
}
