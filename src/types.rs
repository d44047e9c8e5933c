use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Order,
    OrderResponse,
    ShippingNotice,
    Invoice,
    CreditNote,
    DispatchInstruction,
    DispatchInstructionResponse,
    ReceivalNotice,
    RemittanceAdvice,
    ProductCatalog,
    InventoryReport,
    SalesReport,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Order => "ORDER",
            Self::OrderResponse => "ORDER_RESPONSE",
            Self::ShippingNotice => "SHIPPING_NOTICE",
            Self::Invoice => "INVOICE",
            Self::CreditNote => "CREDIT_NOTE",
            Self::DispatchInstruction => "DISPATCH_INSTRUCTION",
            Self::DispatchInstructionResponse => "DISPATCH_INSTRUCTION_RESPONSE",
            Self::ReceivalNotice => "RECEIVAL_NOTICE",
            Self::RemittanceAdvice => "REMITTANCE_ADVICE",
            Self::ProductCatalog => "PRODUCT_CATALOG",
            Self::InventoryReport => "INVENTORY_REPORT",
            Self::SalesReport => "SALES_REPORT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionFlow {
    Live,
    Test,
}

impl TransactionFlow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Test => "TEST",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Dropped,
    Unknown,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Dropped => "DROPPED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Who is at fault when processing a transaction failed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Data,
    Internal,
}

/// Item of `GET /v2/transactions` (transactions waiting to be processed).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTransaction {
    pub procuros_transaction_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Business document; its shape depends on `transaction_type`.
    pub content: JsonValue,
}

/// Item of `GET /v2/all-transactions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub procuros_transaction_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub flow: TransactionFlow,
    pub created_at: String,
    pub content: JsonValue,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn enums_use_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(TransactionType::DispatchInstructionResponse).unwrap(),
            json!("DISPATCH_INSTRUCTION_RESPONSE")
        );
        assert_eq!(TransactionType::ShippingNotice.to_string(), "SHIPPING_NOTICE");
        assert_eq!(
            serde_json::from_value::<TransactionStatus>(json!("DROPPED")).unwrap(),
            TransactionStatus::Dropped
        );
    }

    #[test]
    fn transaction_deserializes_from_camel_case() {
        let transaction: Transaction = serde_json::from_value(json!({
            "procurosTransactionId": "949b2f25-fd9d-4c58-8899-b4dc277f8cf9",
            "type": "INVOICE",
            "status": "SUCCESS",
            "flow": "LIVE",
            "createdAt": "2024-05-01T10:00:00Z",
            "content": {"header": {"invoiceIdentifier": "INV-1"}}
        }))
        .unwrap();

        assert_eq!(transaction.transaction_type, TransactionType::Invoice);
        assert_eq!(transaction.flow, TransactionFlow::Live);
        assert_eq!(transaction.content["header"]["invoiceIdentifier"], "INV-1");
    }
}
