mod config;
mod host;

use mud::memory::MemoryHost;
use mud::{ChargenRules, Connection, GameHost};
use player_db::PlayerDb;
use session::{SessionManager, SessionOutput};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::parse_cli_args;
use crate::host::DbHost;

#[tokio::main]
async fn main() {
    observability::init_logging();

    let config = parse_cli_args();
    tracing::info!(server = %config.server.name, "console server starting");
    let rules = config.to_chargen_rules();

    if config.database.enabled {
        match PlayerDb::open(&config.database.path) {
            Ok(db) => run_console(DbHost::new(db), rules).await,
            Err(e) => {
                tracing::error!(path = %config.database.path, error = %e, "failed to open player database");
                std::process::exit(1);
            }
        }
    } else {
        tracing::warn!("database disabled, accounts last until shutdown");
        run_console(MemoryHost::new(), rules).await;
    }

    tracing::info!("Server stopped.");
}

/// Drive one connection from stdin until it closes. Ctrl-C and end of
/// input disconnect it like a dropped socket would.
async fn run_console<H: GameHost + 'static>(mut host: H, rules: ChargenRules) {
    let mut sessions = SessionManager::new();
    let id = sessions.create_session("console");
    let Some(session) = sessions.get_session_mut(id) else {
        return;
    };
    let (mut conn, greeting) = Connection::open(session, &mut host, rules);
    deliver(&greeting);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !conn.is_closed() {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C");
                deliver(&conn.disconnect(session, "Server shutting down."));
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => deliver(&conn.handle_line(session, &mut host, &line)),
                Ok(None) => deliver(&conn.disconnect(session, "Connection closed.")),
                Err(e) => {
                    tracing::error!(error = %e, "console read failed");
                    deliver(&conn.disconnect(session, "Connection lost."));
                }
            }
        }
    }

    sessions.remove_session(id);
    tracing::info!(active = sessions.active_count(), "console session ended");
}

fn deliver(outputs: &[SessionOutput]) {
    for output in outputs.iter().filter(|o| !o.text.is_empty()) {
        println!("{}", output.text);
    }
}
