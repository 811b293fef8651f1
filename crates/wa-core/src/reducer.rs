//! Conversation state: the immutable transcript and the active assistant turn.
//!
//! A streamed response accumulates in an [`AssistantTurn`] held outside the
//! log. The turn tracks two projections of the same logical message: what
//! the terminal shows (the accumulated markdown text, or the transfer
//! confirmation card) and what gets persisted (the trimmed text, or the
//! transfer summary alone). Sealing the turn appends the storage projection
//! to the transcript — displayed and persisted content are allowed to
//! differ, and for transfers they always do.

use wa_protocol::{AgentPayload, ChatMessage, HistoryEntry, TransferCall};

/// The immutable, ordered message log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the log from the chat service's history endpoint.
    pub fn from_history(entries: Vec<HistoryEntry>) -> Self {
        Self {
            messages: entries.into_iter().map(ChatMessage::from).collect(),
        }
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The assistant turn currently being streamed.
///
/// Exactly one turn is mutable at a time; everything already in the
/// transcript is sealed.
#[derive(Debug, Default)]
pub struct AssistantTurn {
    /// Untrimmed concatenation of every text delta.
    raw: String,
    /// What the terminal shows: the trimmed text, or the transfer card.
    display: String,
    /// What will be persisted when the turn seals.
    storage: String,
    transfer_seen: bool,
}

impl AssistantTurn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one decoded payload.
    pub fn apply(&mut self, payload: &AgentPayload) {
        match payload {
            AgentPayload::Text(text) => self.push_text(text),
            AgentPayload::Transfer(call) => self.apply_transfer(call),
        }
    }

    /// Append a text delta. Both projections become the trimmed
    /// concatenation of everything received so far.
    pub fn push_text(&mut self, text: &str) {
        if self.transfer_seen {
            // The card already finalized this turn; late text is dropped.
            tracing::debug!(len = text.len(), "text delta after transfer card, ignoring");
            return;
        }
        self.raw.push_str(text);
        self.display = self.raw.trim().to_string();
        self.storage.clone_from(&self.display);
    }

    /// A transfer call replaces the displayed content wholesale with the
    /// confirmation card; only the summary is kept for storage.
    pub fn apply_transfer(&mut self, call: &TransferCall) {
        self.display = format_transfer_card(call);
        self.storage.clone_from(&call.summary);
        self.transfer_seen = true;
    }

    /// What the terminal shows right now.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// What will be persisted when the turn seals.
    pub fn storage(&self) -> &str {
        &self.storage
    }

    pub fn transfer_seen(&self) -> bool {
        self.transfer_seen
    }

    /// Finalize the turn. The persisted content is the storage projection,
    /// never the displayed card.
    pub fn seal(self) -> ChatMessage {
        ChatMessage::assistant(self.storage)
    }
}

/// Render the in-conversation confirmation card for a transfer call.
pub fn format_transfer_card(call: &TransferCall) -> String {
    let status = if call.params.settled_hash().is_some() {
        "Completed"
    } else {
        "Pending"
    };
    [
        "✅ **Transaction Successful**".to_string(),
        String::new(),
        call.summary.clone(),
        String::new(),
        format!("**Amount:** {} ETH", call.params.amount),
        format!("**To:** {}", truncate_address(&call.params.to)),
        format!("**Status:** {status}"),
    ]
    .join("\n")
}

/// `0x1234...abcd` — first 6 and last 4 characters. Values short enough
/// that the halves would overlap render whole.
pub fn truncate_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 10 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wa_protocol::transfer::NATIVE_TRANSFER_TOOL;
    use wa_protocol::{Role, TransferParams};

    fn transfer(tx_hash: Option<&str>) -> TransferCall {
        TransferCall {
            tool: NATIVE_TRANSFER_TOOL.to_string(),
            summary: "Sent 0.5 ETH to alice.eth".to_string(),
            params: TransferParams {
                amount: "0.5".to_string(),
                to: "0xABCDEF1234567890".to_string(),
                tx_hash: tx_hash.map(str::to_string),
            },
        }
    }

    #[test]
    fn text_deltas_accumulate_trimmed() {
        let mut turn = AssistantTurn::new();
        turn.push_text("Hello ");
        turn.push_text("world");

        assert_eq!(turn.display(), "Hello world");
        assert_eq!(turn.storage(), "Hello world");
    }

    #[test]
    fn leading_whitespace_trimmed_from_both_projections() {
        let mut turn = AssistantTurn::new();
        turn.push_text("  answer");
        turn.push_text(" text  ");

        assert_eq!(turn.display(), "answer text");
        assert_eq!(turn.storage(), "answer text");
    }

    #[test]
    fn interior_whitespace_survives_the_trim() {
        let mut turn = AssistantTurn::new();
        turn.push_text("one ");
        turn.push_text("\ntwo ");

        assert_eq!(turn.display(), "one \ntwo");
    }

    #[test]
    fn transfer_replaces_display_and_diverges_storage() {
        let mut turn = AssistantTurn::new();
        turn.push_text("Transferring now...");
        turn.apply_transfer(&transfer(Some("0xdeadbeef")));

        assert!(turn.display().contains("✅ **Transaction Successful**"));
        assert!(turn.display().contains("**Amount:** 0.5 ETH"));
        assert!(turn.display().contains("**To:** 0xABCD...7890"));
        assert!(turn.display().contains("**Status:** Completed"));
        assert_eq!(turn.storage(), "Sent 0.5 ETH to alice.eth");
    }

    #[test]
    fn pending_transfer_status() {
        let mut turn = AssistantTurn::new();
        turn.apply_transfer(&transfer(None));
        assert!(turn.display().contains("**Status:** Pending"));
    }

    #[test]
    fn empty_hash_counts_as_pending() {
        let mut turn = AssistantTurn::new();
        turn.apply_transfer(&transfer(Some("")));
        assert!(turn.display().contains("**Status:** Pending"));
    }

    #[test]
    fn text_after_transfer_is_ignored() {
        let mut turn = AssistantTurn::new();
        turn.apply_transfer(&transfer(Some("0xdeadbeef")));
        let card = turn.display().to_string();

        turn.push_text("stray delta");

        assert_eq!(turn.display(), card);
        assert_eq!(turn.storage(), "Sent 0.5 ETH to alice.eth");
    }

    #[test]
    fn seal_uses_storage_projection() {
        let mut turn = AssistantTurn::new();
        turn.apply_transfer(&transfer(Some("0xdeadbeef")));

        let message = turn.seal();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Sent 0.5 ETH to alice.eth");
    }

    #[test]
    fn seal_plain_text_turn() {
        let mut turn = AssistantTurn::new();
        turn.push_text("plain answer");
        assert_eq!(turn.seal().content, "plain answer");
    }

    #[test]
    fn apply_dispatches_on_payload() {
        let mut turn = AssistantTurn::new();
        turn.apply(&AgentPayload::Text("hi".to_string()));
        turn.apply(&AgentPayload::Transfer(transfer(None)));
        assert!(turn.transfer_seen());
    }

    #[test]
    fn card_layout() {
        let card = format_transfer_card(&transfer(Some("0xdeadbeef")));
        let lines: Vec<&str> = card.lines().collect();
        assert_eq!(lines[0], "✅ **Transaction Successful**");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Sent 0.5 ETH to alice.eth");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "**Amount:** 0.5 ETH");
        assert_eq!(lines[5], "**To:** 0xABCD...7890");
        assert_eq!(lines[6], "**Status:** Completed");
    }

    #[test]
    fn truncate_long_address() {
        assert_eq!(truncate_address("0xABCDEF1234567890"), "0xABCD...7890");
    }

    #[test]
    fn truncate_short_value_renders_whole() {
        assert_eq!(truncate_address("0xABC"), "0xABC");
        assert_eq!(truncate_address("0x12345678"), "0x12345678");
    }

    #[test]
    fn transcript_from_history() {
        let transcript = Transcript::from_history(vec![
            HistoryEntry {
                sender: "user".to_string(),
                content: "hi".to_string(),
            },
            HistoryEntry {
                sender: "assistant".to_string(),
                content: "hello".to_string(),
            },
        ]);

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(transcript.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn transcript_push_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        transcript.push_user("first");
        transcript.push(ChatMessage::assistant("second"));
        assert_eq!(transcript.messages()[0].content, "first");
        assert_eq!(transcript.messages()[1].content, "second");
    }
}
