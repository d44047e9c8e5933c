use std::time::Duration;

use futures::TryStreamExt;
use procuros_http::{
    CancellationToken, ClientOptions, ListTransactionsOptions, ProcurosClient, RequestOptions,
    TransactionStatus,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let token = std::env::var("PROCUROS_API_TOKEN")?;
    let client = ProcurosClient::builder(token)
        .options(ClientOptions {
            timeout_ms: 10_000,
            max_retries: 4,
            ..ClientOptions::default()
        })
        .build()?;

    // Give up on the whole walk after a minute.
    let cancel = CancellationToken::new();
    let deadline = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        deadline.cancel();
    });

    let failed: Vec<_> = client
        .transactions()
        .list_all(
            ListTransactionsOptions {
                status: Some(TransactionStatus::Failed),
                per_page: Some(100),
                ..ListTransactionsOptions::default()
            },
            RequestOptions::new().with_cancellation(cancel),
        )
        .try_collect()
        .await?;

    for transaction in &failed {
        println!(
            "{} {} {}",
            transaction.created_at, transaction.transaction_type, transaction.procuros_transaction_id
        );
    }
    println!("{} failed transactions", failed.len());

    Ok(())
}
