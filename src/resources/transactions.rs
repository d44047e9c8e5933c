use futures::Stream;

use crate::{
    http::{ApiRequest, HttpCore},
    pagination::paginate,
    validate::{validate_created_between, validate_per_page, validate_uuid},
    wire::ShowTransactionResponse,
    Page, RequestOptions, Result, Transaction, TransactionFlow, TransactionStatus,
    TransactionType,
};

/// Filters for `GET /v2/all-transactions`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListTransactionsOptions {
    pub transaction_type: Option<TransactionType>,
    pub flow: Option<TransactionFlow>,
    pub status: Option<TransactionStatus>,
    /// `YYYY-MM-DD,YYYY-MM-DD`.
    pub created_between: Option<String>,
    pub cursor: Option<String>,
    pub per_page: Option<u32>,
}

/// Every transaction of the account, sent or received, in any state.
#[derive(Clone, Copy, Debug)]
pub struct AllTransactions<'a> {
    http: &'a HttpCore,
}

impl<'a> AllTransactions<'a> {
    pub(crate) fn new(http: &'a HttpCore) -> Self {
        Self { http }
    }

    pub async fn list(
        &self,
        options: &ListTransactionsOptions,
        request_options: &RequestOptions,
    ) -> Result<Page<Transaction>> {
        if let Some(per_page) = options.per_page {
            validate_per_page(per_page)?;
        }
        if let Some(range) = &options.created_between {
            validate_created_between(range)?;
        }

        let request = ApiRequest::get("/v2/all-transactions")
            .query(
                "filter[type]",
                options.transaction_type.map(TransactionType::as_str),
            )
            .query("filter[flow]", options.flow.map(TransactionFlow::as_str))
            .query("filter[status]", options.status.map(TransactionStatus::as_str))
            .query("filter[created_between]", options.created_between.clone())
            .query("cursor", options.cursor.clone())
            .query("per_page", options.per_page.map(|n| n.to_string()))
            .options(request_options);
        self.http.execute(request).await
    }

    /// Streams every matching transaction across all pages.
    pub fn list_all(
        &self,
        options: ListTransactionsOptions,
        request_options: RequestOptions,
    ) -> impl Stream<Item = Result<Transaction>> + 'a {
        let this = *self;
        paginate(move |cursor| {
            let options = ListTransactionsOptions {
                cursor,
                ..options.clone()
            };
            let request_options = request_options.clone();
            async move { this.list(&options, &request_options).await }
        })
    }

    pub async fn get(
        &self,
        procuros_transaction_id: &str,
        request_options: &RequestOptions,
    ) -> Result<Transaction> {
        validate_uuid(procuros_transaction_id, "procuros_transaction_id")?;
        let request = ApiRequest::get(format!("/v2/all-transactions/{procuros_transaction_id}"))
            .options(request_options);
        let response: ShowTransactionResponse = self.http.execute(request).await?;
        Ok(response.data)
    }
}
