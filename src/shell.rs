//! Line-oriented chat front end: one session, send and clear.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::chat::{Chatbot, Session, Turn};
use crate::hf::{Embedder, Generator, Translator};
use crate::lang::LanguageDetector;

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Send(&'a str),
    Clear,
    Quit,
    Skip,
}

/// Trimming only classifies the line; a question is sent exactly as typed.
fn parse_command(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Skip,
        "/clear" => Command::Clear,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Send(line),
    }
}

fn banner(product: &str) -> String {
    format!(
        "## 🤖 {product} Multilingual Chatbot\n\
         Ask me anything about {product} in any language!\n\
         (/clear to start over, /quit to leave)\n"
    )
}

fn render_turn(turn: &Turn) -> String {
    format!("{}: {}\n", turn.user, turn.bot)
}

/// Reads questions from `input` until EOF or `/quit`, writing each reply to
/// `output`. Returns the session as it stood when input ended.
pub async fn run<D, E, T, G, R, W>(
    chatbot: &Chatbot<D, E, T, G>,
    input: R,
    mut output: W,
) -> std::io::Result<Session>
where
    D: LanguageDetector,
    E: Embedder,
    T: Translator,
    G: Generator,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if !chatbot.is_ready() {
        warn!("knowledge base unavailable; every question will be declined");
    }

    output.write_all(banner(chatbot.product()).as_bytes()).await?;
    let mut session = Session::new();
    for turn in &session.history {
        output.write_all(render_turn(turn).as_bytes()).await?;
    }

    let mut lines = input.lines();
    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Skip => continue,
            Command::Quit => break,
            Command::Clear => {
                debug!("session cleared");
                session.clear();
                for turn in &session.history {
                    output.write_all(render_turn(turn).as_bytes()).await?;
                }
            }
            Command::Send(text) => {
                session = chatbot.send(text, session).await;
                if let Some(turn) = session.history.last() {
                    output.write_all(format!("{}\n", turn.bot).as_bytes()).await?;
                }
            }
        }
    }

    output.flush().await?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{GREETING, NOT_READY};
    use crate::hf::HfClient;
    use crate::knowledge::KnowledgeStore;
    use crate::lang::WhatlangDetector;
    use reqwest::Client;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  /clear "), Command::Clear);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("   "), Command::Skip);
        assert_eq!(
            parse_command(" What is GUVI? "),
            Command::Send(" What is GUVI? ")
        );
    }

    #[test]
    fn banner_names_product() {
        let text = banner("Acme");
        assert!(text.starts_with("## 🤖 Acme Multilingual Chatbot"));
        assert!(text.contains("Ask me anything about Acme in any language!"));
    }

    #[tokio::test]
    async fn degraded_session_declines_and_clears() {
        let models = HfClient::with_base_url(Client::new(), "http://127.0.0.1:9");
        let chatbot = Chatbot::new(
            KnowledgeStore::Degraded {
                reason: "missing".into(),
            },
            WhatlangDetector,
            models.clone(),
            models.clone(),
            models,
        );

        let input: &[u8] = b"What is GUVI?\n\n/clear\n/quit\nnever sent\n";
        let mut output = Vec::new();
        let session = run(&chatbot, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(&format!("{NOT_READY}\n")));
        assert_eq!(text.matches(GREETING).count(), 2);
        assert_eq!(text.matches(NOT_READY).count(), 1);
        assert_eq!(session.history.len(), 1);
    }

    #[tokio::test]
    async fn history_keeps_input_as_typed() {
        let models = HfClient::with_base_url(Client::new(), "http://127.0.0.1:9");
        let chatbot = Chatbot::new(
            KnowledgeStore::Degraded {
                reason: "missing".into(),
            },
            WhatlangDetector,
            models.clone(),
            models.clone(),
            models,
        );

        let input: &[u8] = b"  What is GUVI?  \n";
        let session = run(&chatbot, input, Vec::new()).await.unwrap();

        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[1].user, "  What is GUVI?  ");
    }
}
