use pokerlobby::prelude::*;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What one lobby visit saw.
struct Visit {
    profile: LoginResponse,
    tables: Vec<PokerTable>,
    scores: Vec<UserScore>,
}

/// Logs in, then reads the table list and the scoreboard.
async fn visit(client: &LobbyClient, user: &str, pass: &str) -> Result<Visit, ClientError> {
    let profile = client.login(user, pass).await?;
    let tables = client.list_tables().await?;
    let scores = client.scoreboard().await?;
    Ok(Visit { profile, tables, scores })
}

fn print_visit(visit: &Visit) {
    let p = &visit.profile;
    println!("logged in as {} (#{}), balance {}", p.username, p.user_id, p.balance);

    if visit.tables.is_empty() {
        println!("no open tables");
    } else {
        println!("{:>5}  {:<24} {:>7} {:>7}", "id", "table", "seats", "min bet");
        for t in &visit.tables {
            println!(
                "{:>5}  {:<24} {:>3}/{:<3} {:>7}",
                t.id, t.table_name, t.current_players, t.max_players, t.min_bet
            );
        }
    }

    println!("scoreboard:");
    for s in &visit.scores {
        println!("  {:>3}. player #{:<6} {:>9}", s.rank, s.id, s.balance);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    pokerlobby::init_tracing();

    let mut args = std::env::args().skip(1);
    let (Some(user), Some(pass)) = (args.next(), args.next()) else {
        eprintln!("usage: lobby-cli <username> <password>");
        eprintln!("server comes from POKERLOBBY_HOST / POKERLOBBY_PORT");
        std::process::exit(2);
    };

    let config = ClientConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "connecting to lobby");

    let client = LobbyClient::builder().config(config).connect().await?;
    let result = visit(&client, &user, &pass).await;
    client.disconnect().await;

    match result {
        Ok(v) => print_visit(&v),
        Err(ClientError::Rejected { operation: Operation::Login, .. }) => {
            eprintln!("login refused: wrong username or password");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
