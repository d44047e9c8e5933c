use crate::{
    http::{ApiRequest, HttpCore},
    ReportErrorRequest, ReportErrorResponse, RequestOptions, Result, SendTransactionResponse,
    SentTransaction,
};

/// Documents sent from this account to a trade partner.
#[derive(Clone, Copy, Debug)]
pub struct OutgoingTransactions<'a> {
    http: &'a HttpCore,
}

impl<'a> OutgoingTransactions<'a> {
    pub(crate) fn new(http: &'a HttpCore) -> Self {
        Self { http }
    }

    /// Submits a transaction. Not retried on 5xx unless the client was built
    /// with `retry_on_post`.
    pub async fn send(
        &self,
        transaction: &SentTransaction,
        request_options: &RequestOptions,
    ) -> Result<SendTransactionResponse> {
        let request = ApiRequest::post("/v2/transactions")
            .json(transaction)?
            .options(request_options);
        self.http.execute(request).await
    }

    /// Reports a processing error for a document that could not be sent.
    pub async fn report_error(
        &self,
        report: &ReportErrorRequest,
        request_options: &RequestOptions,
    ) -> Result<ReportErrorResponse> {
        let request = ApiRequest::post("/v2/errors")
            .json(report)?
            .options(request_options);
        self.http.execute(request).await
    }
}
