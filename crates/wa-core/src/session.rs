//! One chat session: the transcript, the active turn, and the notice gate.
//!
//! A session drives exactly one stream at a time. The user message is
//! recorded up front, the streamed response accumulates in the active
//! turn, and only a `Done`-terminated stream seals and persists it —
//! a failed or abandoned stream discards the partial turn.

use wa_protocol::{AgentPayload, ChatMessage, StreamEvent, TransferNotice};

use crate::confirm;
use crate::journal::{ChatJournal, JournalEntry};
use crate::reducer::{AssistantTurn, Transcript};

pub struct ChatSession {
    transcript: Transcript,
    turn: Option<AssistantTurn>,
    notice_emitted: bool,
    journal: Option<ChatJournal>,
}

impl ChatSession {
    pub fn new(transcript: Transcript, journal: Option<ChatJournal>) -> Self {
        Self {
            transcript,
            turn: None,
            notice_emitted: false,
            journal,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the next message opens the chat. Must be read before
    /// [`begin_turn`](Self::begin_turn) records the user message.
    pub fn is_first_message(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Displayed content of the in-progress turn, if one is open.
    pub fn turn_display(&self) -> Option<&str> {
        self.turn.as_ref().map(|t| t.display())
    }

    pub fn turn_transfer_seen(&self) -> bool {
        self.turn.as_ref().is_some_and(|t| t.transfer_seen())
    }

    /// Record the user message and open a fresh assistant turn.
    pub fn begin_turn(&mut self, input: &str) {
        self.transcript.push_user(input);
        if let Some(journal) = &mut self.journal {
            journal.append(&JournalEntry::user(input));
        }
        self.turn = Some(AssistantTurn::new());
        self.notice_emitted = false;
    }

    /// Apply one stream event to the active turn.
    ///
    /// Returns a notice for the first transfer call of the stream; the
    /// confirmation surface fires at most once. `Done` and `Error` do not
    /// mutate the turn — the caller finishes or aborts explicitly.
    pub fn handle_event(&mut self, event: &StreamEvent) -> Option<TransferNotice> {
        let Some(turn) = self.turn.as_mut() else {
            return None;
        };

        match event {
            StreamEvent::TextDelta(text) => {
                turn.push_text(text);
                None
            }
            StreamEvent::Transfer(call) => {
                let payload = AgentPayload::Transfer(call.clone());
                turn.apply(&payload);
                if self.notice_emitted {
                    return None;
                }
                let notice = confirm::observe(&payload);
                if notice.is_some() {
                    self.notice_emitted = true;
                    if let Some(journal) = &mut self.journal {
                        journal.append(&JournalEntry::transfer(call));
                    }
                }
                notice
            }
            StreamEvent::Done | StreamEvent::Error(_) => None,
        }
    }

    /// The stream completed: seal the turn, persist it, append it to the
    /// transcript. Returns `None` when no turn was open.
    pub fn finish_turn(&mut self) -> Option<ChatMessage> {
        let turn = self.turn.take()?;
        let message = turn.seal();
        if let Some(journal) = &mut self.journal {
            journal.append(&JournalEntry::assistant(&message.content));
        }
        self.transcript.push(message.clone());
        Some(message)
    }

    /// The stream failed or was abandoned: drop the partial turn without
    /// persisting it.
    pub fn abort_turn(&mut self) {
        self.turn = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wa_protocol::{Role, TransferCall, TransferParams};

    fn transfer(tx_hash: Option<&str>) -> TransferCall {
        TransferCall {
            tool: "nativeTransfer".to_string(),
            summary: "Sent 0.5 ETH to alice.eth".to_string(),
            params: TransferParams {
                amount: "0.5".to_string(),
                to: "0xABCDEF1234567890".to_string(),
                tx_hash: tx_hash.map(str::to_string),
            },
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(Transcript::new(), None)
    }

    #[test]
    fn first_message_flag() {
        let mut s = session();
        assert!(s.is_first_message());
        s.begin_turn("hi");
        assert!(!s.is_first_message());
    }

    #[test]
    fn text_stream_accumulates_and_seals() {
        let mut s = session();
        s.begin_turn("say hello");

        assert_eq!(s.handle_event(&StreamEvent::TextDelta("Hello ".into())), None);
        assert_eq!(s.handle_event(&StreamEvent::TextDelta("world".into())), None);
        assert_eq!(s.turn_display(), Some("Hello world"));

        let message = s.finish_turn().unwrap();
        assert_eq!(message.content, "Hello world");
        assert_eq!(s.transcript().len(), 2);
        assert_eq!(s.transcript().messages()[1].role, Role::Assistant);
    }

    #[test]
    fn transfer_emits_notice_once() {
        let mut s = session();
        s.begin_turn("send it");

        let first = s.handle_event(&StreamEvent::Transfer(transfer(Some("0xdead"))));
        assert_eq!(first.unwrap().tx_hash, "0xdead");

        // A second transfer in the same stream stays silent.
        let second = s.handle_event(&StreamEvent::Transfer(transfer(Some("0xbeef"))));
        assert_eq!(second, None);
    }

    #[test]
    fn notice_gate_resets_per_turn() {
        let mut s = session();
        s.begin_turn("send it");
        assert!(s
            .handle_event(&StreamEvent::Transfer(transfer(None)))
            .is_some());
        s.finish_turn().unwrap();

        s.begin_turn("again");
        assert!(s
            .handle_event(&StreamEvent::Transfer(transfer(None)))
            .is_some());
    }

    #[test]
    fn transfer_seals_with_summary() {
        let mut s = session();
        s.begin_turn("send it");
        s.handle_event(&StreamEvent::TextDelta("Transferring...".into()));
        s.handle_event(&StreamEvent::Transfer(transfer(Some("0xdead"))));

        assert!(s.turn_display().unwrap().contains("**Status:** Completed"));
        let message = s.finish_turn().unwrap();
        assert_eq!(message.content, "Sent 0.5 ETH to alice.eth");
    }

    #[test]
    fn done_and_error_do_not_mutate() {
        let mut s = session();
        s.begin_turn("hi");
        s.handle_event(&StreamEvent::TextDelta("partial".into()));
        assert_eq!(s.handle_event(&StreamEvent::Done), None);
        assert_eq!(s.handle_event(&StreamEvent::Error("x".into())), None);
        assert_eq!(s.turn_display(), Some("partial"));
    }

    #[test]
    fn abort_discards_partial_turn() {
        let mut s = session();
        s.begin_turn("hi");
        s.handle_event(&StreamEvent::TextDelta("partial".into()));
        s.abort_turn();

        assert_eq!(s.finish_turn(), None);
        // Only the user message made it into the transcript.
        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.transcript().messages()[0].role, Role::User);
    }

    #[test]
    fn events_without_open_turn_are_ignored() {
        let mut s = session();
        assert_eq!(
            s.handle_event(&StreamEvent::TextDelta("stray".into())),
            None
        );
        assert_eq!(s.finish_turn(), None);
        assert!(s.transcript().is_empty());
    }
}
