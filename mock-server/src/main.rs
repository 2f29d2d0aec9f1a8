use mock_server::{add_rule, Db, RuleSpec};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    let db = Db::default();
    if let Ok(path) = std::env::var("MOCK_RULES") {
        let raw = std::fs::read_to_string(&path)?;
        let rules: Vec<RuleSpec> = serde_json::from_str(&raw).map_err(std::io::Error::other)?;
        println!("loaded {} rules from {path}", rules.len());
        for rule in rules {
            add_rule(&db, rule);
        }
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}");
    mock_server::run(listener, db).await
}
