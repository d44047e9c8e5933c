use futures::Stream;

use crate::{
    http::{ApiRequest, HttpCore},
    pagination::paginate,
    validate::{validate_bulk_size, validate_per_page, validate_uuid},
    wire::BulkMarkProcessedBody,
    BulkMarkProcessedItem, BulkMarkProcessedResponse, MarkProcessedRequest,
    MarkProcessedResponse, Page, ReceivedTransaction, RequestOptions, Result, TransactionType,
};

/// Filters for `GET /v2/transactions`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListIncomingOptions {
    pub transaction_type: Option<TransactionType>,
    pub cursor: Option<String>,
    /// Page size, 1 to 100.
    pub per_page: Option<u32>,
}

/// Transactions addressed to this account that still need processing.
#[derive(Clone, Copy, Debug)]
pub struct IncomingTransactions<'a> {
    http: &'a HttpCore,
}

impl<'a> IncomingTransactions<'a> {
    pub(crate) fn new(http: &'a HttpCore) -> Self {
        Self { http }
    }

    /// Fetches one page.
    pub async fn list(
        &self,
        options: &ListIncomingOptions,
        request_options: &RequestOptions,
    ) -> Result<Page<ReceivedTransaction>> {
        if let Some(per_page) = options.per_page {
            validate_per_page(per_page)?;
        }
        let request = ApiRequest::get("/v2/transactions")
            .query(
                "filter[type]",
                options.transaction_type.map(TransactionType::as_str),
            )
            .query("cursor", options.cursor.clone())
            .query("per_page", options.per_page.map(|n| n.to_string()))
            .options(request_options);
        self.http.execute(request).await
    }

    /// Streams every transaction across all pages, starting from the first.
    ///
    /// Any `cursor` in `options` is ignored.
    pub fn list_all(
        &self,
        options: ListIncomingOptions,
        request_options: RequestOptions,
    ) -> impl Stream<Item = Result<ReceivedTransaction>> + 'a {
        let this = *self;
        paginate(move |cursor| {
            let options = ListIncomingOptions {
                cursor,
                ..options.clone()
            };
            let request_options = request_options.clone();
            async move { this.list(&options, &request_options).await }
        })
    }

    /// Marks a transaction as processed, successfully or not.
    pub async fn mark_processed(
        &self,
        procuros_transaction_id: &str,
        request: &MarkProcessedRequest,
        request_options: &RequestOptions,
    ) -> Result<MarkProcessedResponse> {
        validate_uuid(procuros_transaction_id, "procuros_transaction_id")?;
        let request = ApiRequest::put(format!("/v2/transactions/{procuros_transaction_id}"))
            .json(request)?
            .options(request_options);
        self.http.execute(request).await
    }

    /// Marks up to 1000 transactions in one call.
    pub async fn bulk_mark_processed(
        &self,
        items: &[BulkMarkProcessedItem],
        request_options: &RequestOptions,
    ) -> Result<BulkMarkProcessedResponse> {
        validate_bulk_size(items.len())?;
        let request = ApiRequest::post("/v2/transactions/bulk/mark-processed")
            .json(&BulkMarkProcessedBody { items })?
            .options(request_options);
        self.http.execute(request).await
    }
}
