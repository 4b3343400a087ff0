use financial_coach::{config::CoachConfig, Orchestrator, SessionContext};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "메시지를 입력하세요. (/help: 사용법, /reset: 초기화, /quit: 종료)";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = CoachConfig::from_env();
    let orchestrator = Orchestrator::from_config(&config)?;
    let mut session = SessionContext::new();

    info!(session_id = %session.session_id, "Chat session started");

    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    stdout
        .write_all(format!("아바타형 금융 코치\n{}\n\n> ", PROMPT).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();

        match message {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" => {
                session.clear();
                info!(session_id = %session.session_id, "Session cleared");
                stdout.write_all("대화를 초기화했습니다.\n".as_bytes()).await?;
            }
            _ => {
                let turn = orchestrator.handle_turn(&mut session, message).await;
                let output = format!("\n[{}] {}\n\n{}\n", turn.route, turn.caption, turn.body);
                stdout.write_all(output.as_bytes()).await?;
            }
        }

        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
    }

    info!(turns = session.history().len(), "Chat session ended");
    session.clear();

    Ok(())
}
