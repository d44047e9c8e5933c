use procuros_http::{
    ListIncomingOptions, MarkProcessedRequest, ProcurosClient, RequestOptions,
    TransactionType,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ProcurosClient::from_env()?;
    let opts = RequestOptions::default();

    client.ping(&opts).await?;

    let page = client
        .incoming()
        .list(
            &ListIncomingOptions {
                transaction_type: Some(TransactionType::Order),
                per_page: Some(10),
                ..ListIncomingOptions::default()
            },
            &opts,
        )
        .await?;

    for transaction in &page.items {
        println!(
            "{} {}",
            transaction.transaction_type, transaction.procuros_transaction_id
        );
        client
            .incoming()
            .mark_processed(
                &transaction.procuros_transaction_id,
                &MarkProcessedRequest::success(),
                &opts,
            )
            .await?;
    }

    Ok(())
}
