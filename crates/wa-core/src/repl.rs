//! Interactive chat loop and one-shot batch mode.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use futures::{Stream, StreamExt};
use thiserror::Error;

use wa_backend::AgentClient;
use wa_protocol::{ChatMessage, Role, StreamEvent};

use crate::config::Config;
use crate::display::StreamDisplay;
use crate::journal::{self, generate_chat_id, ChatJournal};
use crate::reducer::Transcript;
use crate::session::ChatSession;
use crate::style::Style;

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("stream failed: {0}")]
    Stream(String),
    #[error("no active turn")]
    NoTurn,
}

/// Drive one streamed response through the session, rendering as we go.
///
/// A fatal stream error aborts the turn: nothing is sealed or persisted.
pub async fn run_turn<S, W>(
    session: &mut ChatSession,
    stream: S,
    display: &mut StreamDisplay<W>,
) -> Result<ChatMessage, TurnError>
where
    S: Stream<Item = StreamEvent>,
    W: Write,
{
    let mut stream = std::pin::pin!(stream);
    display.reset();

    while let Some(event) = stream.next().await {
        match &event {
            StreamEvent::Error(message) => {
                session.abort_turn();
                return Err(TurnError::Stream(message.clone()));
            }
            StreamEvent::Done => break,
            _ => {}
        }

        let notice = session.handle_event(&event);
        if let Some(text) = session.turn_display() {
            display.sync(text, session.turn_transfer_seen());
        }
        if let Some(notice) = notice {
            display.notice(&notice);
        }
    }

    display.done();
    session.finish_turn().ok_or(TurnError::NoTurn)
}

fn build_client(config: &Config) -> io::Result<AgentClient> {
    let token = config.api.resolve_auth_token()?;
    let user_id = config.api.resolve_user_id()?;
    Ok(AgentClient::new(
        config.api.base_url.clone(),
        token,
        user_id,
    ))
}

fn journal_path(config: &Config, chat_id: &str) -> PathBuf {
    config
        .journal
        .resolve_sessions_dir()
        .join(format!("{chat_id}.jsonl"))
}

fn open_journal(config: &Config, chat_id: &str) -> Option<ChatJournal> {
    if !config.journal.enabled {
        return None;
    }
    match ChatJournal::new(journal_path(config, chat_id)) {
        Ok(journal) => Some(journal),
        Err(e) => {
            tracing::warn!(error = %e, "failed to open chat journal");
            None
        }
    }
}

/// Seed the transcript for a resumed chat: the server's history first,
/// falling back to the local journal when the server is unreachable.
async fn load_transcript(
    client: &AgentClient,
    config: &Config,
    chat_id: &str,
    resume: bool,
) -> Transcript {
    if !resume {
        return Transcript::new();
    }
    match client.load_history(chat_id).await {
        Ok(messages) => Transcript::from_messages(messages),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load chat history, using local journal");
            let entries = journal::read_entries(&journal_path(config, chat_id));
            Transcript::from_messages(journal::transcript_from_journal(&entries))
        }
    }
}

/// Run a single message non-interactively. Returns the exit code.
pub async fn run_batch(config: &Config, message: &str, chat_id: Option<&str>) -> i32 {
    let style = Style::new();
    let client = match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}error: {e}{}", style.red_start(), style.reset());
            return 1;
        }
    };

    let resume = chat_id.is_some();
    let chat_id = chat_id
        .map(str::to_string)
        .unwrap_or_else(generate_chat_id);
    let transcript = load_transcript(&client, config, &chat_id, resume).await;
    let mut session = ChatSession::new(transcript, open_journal(config, &chat_id));

    let first = session.is_first_message();
    session.begin_turn(message);
    let stream = client.send(&chat_id, message, first);

    let stdout = io::stdout();
    let mut display = StreamDisplay::new(stdout.lock(), style);
    match run_turn(&mut session, stream, &mut display).await {
        Ok(_) => 0,
        Err(e) => {
            drop(display);
            let style = Style::new();
            eprintln!("{}error: {e}{}", style.red_start(), style.reset());
            1
        }
    }
}

/// Run the interactive chat loop. Blocks on stdin between turns.
pub async fn run_repl(config: &Config, chat_id: Option<String>) -> io::Result<()> {
    let style = Style::new();
    let client = build_client(config)?;

    let resume = chat_id.is_some();
    let chat_id = chat_id.unwrap_or_else(generate_chat_id);
    let transcript = load_transcript(&client, config, &chat_id, resume).await;

    println!(
        "{}walletagent{} — chat {chat_id}  (/quit or ctrl-d to exit)",
        style.bold_start(),
        style.reset()
    );

    // Replay resumed history so the conversation reads continuously.
    for message in transcript.messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "agent",
        };
        println!(
            "{}{who}> {}{}",
            style.dim_start(),
            message.content,
            style.reset()
        );
    }

    let mut session = ChatSession::new(transcript, open_journal(config, &chat_id));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}you>{} ", style.cyan_start(), style.reset());
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" || input == "/exit" {
            break;
        }

        let first = session.is_first_message();
        session.begin_turn(input);
        let stream = client.send(&chat_id, input, first);

        print!("{}agent>{} ", style.green_start(), style.reset());
        io::stdout().flush()?;

        let mut display = StreamDisplay::new(io::stdout().lock(), Style::new());
        if let Err(e) = run_turn(&mut session, stream, &mut display).await {
            drop(display);
            eprintln!("{}error: {e}{}", style.red_start(), style.reset());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wa_backend::mock::{fixtures, mock_stream};

    fn display() -> StreamDisplay<Vec<u8>> {
        StreamDisplay::new(Vec::new(), Style::disabled())
    }

    #[tokio::test]
    async fn turn_with_text_stream() {
        let mut session = ChatSession::new(Transcript::new(), None);
        session.begin_turn("say hello");

        let stream = mock_stream(fixtures::streaming_text(&["Hello ", "world"]));
        let mut out = display();
        let message = run_turn(&mut session, stream, &mut out).await.unwrap();

        assert_eq!(message.content, "Hello world");
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn turn_with_transfer_stream() {
        let mut session = ChatSession::new(Transcript::new(), None);
        session.begin_turn("send 0.5 ETH");

        let call =
            fixtures::native_transfer("0.5", "0xABCDEF1234567890", Some("0xdead"), "Sent it");
        let stream = mock_stream(fixtures::text_then_transfer("Working...", call));
        let mut out = display();
        let message = run_turn(&mut session, stream, &mut out).await.unwrap();

        // Persisted content is the summary, not the card.
        assert_eq!(message.content, "Sent it");
    }

    #[tokio::test]
    async fn turn_with_stream_error_aborts() {
        let mut session = ChatSession::new(Transcript::new(), None);
        session.begin_turn("hi");

        let stream = mock_stream(fixtures::error_mid_stream("partial", "rate limited"));
        let mut out = display();
        let err = run_turn(&mut session, stream, &mut out).await.unwrap_err();

        assert!(matches!(err, TurnError::Stream(_)));
        // The partial assistant turn was discarded.
        assert_eq!(session.transcript().len(), 1);
    }
}
