use std::fs;

use procuros_http::{
    ClientOptions, Environment, ListTransactionsOptions, ProcurosClient, RequestOptions,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "PROCUROS_API_TOKEN")]
    api_token: Option<String>,
    #[serde(rename = "PROCUROS_BASE_URL")]
    base_url: Option<String>,
}

fn load_live_credentials() -> Result<(String, Option<String>), String> {
    if let Ok(token) = std::env::var("PROCUROS_API_TOKEN") {
        return Ok((token, std::env::var("PROCUROS_BASE_URL").ok()));
    }

    let content = fs::read_to_string("secrets.json")
        .map_err(|_| "PROCUROS_API_TOKEN env or secrets.json is required".to_owned())?;
    let parsed: SecretsFile = serde_json::from_str(&content)
        .map_err(|err| format!("secrets.json could not be parsed: {err}"))?;
    let token = parsed
        .api_token
        .ok_or_else(|| "missing PROCUROS_API_TOKEN in secrets.json".to_owned())?;
    Ok((token, parsed.base_url))
}

fn live_client(token: &str, base_url: Option<&str>) -> ProcurosClient {
    let mut builder = ProcurosClient::builder(token)
        .environment(Environment::Staging)
        .options(ClientOptions {
            timeout_ms: 15_000,
            ..ClientOptions::default()
        });
    if let Some(url) = base_url {
        builder = builder.base_url(url);
    }
    builder.build().expect("live client must build")
}

#[tokio::test]
async fn live_ping_list_and_auth_failure() {
    let (token, base_url) = match load_live_credentials() {
        Ok(values) => values,
        Err(_) => {
            eprintln!("skipping live test: credentials not found in env or secrets.json");
            return;
        }
    };
    let opts = RequestOptions::default();

    let client = live_client(&token, base_url.as_deref());
    client.ping(&opts).await.expect("ping must succeed");

    let page = client
        .transactions()
        .list(
            &ListTransactionsOptions {
                per_page: Some(5),
                ..ListTransactionsOptions::default()
            },
            &opts,
        )
        .await
        .expect("first page must load");
    assert!(page.items.len() <= 5);

    let rejected = live_client("definitely-not-a-valid-token", base_url.as_deref())
        .ping(&opts)
        .await
        .expect_err("bad token must be rejected");
    assert_eq!(rejected.status(), Some(401));
}
