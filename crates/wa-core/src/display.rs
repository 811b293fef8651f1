//! Incremental terminal rendering for a streaming assistant turn.
//!
//! Text deltas print as they arrive. While text accumulates, the turn's
//! trimmed display content only ever grows by a suffix, so printing the
//! unseen tail keeps the terminal in sync. A transfer card replaces the
//! content wholesale; it is printed once, on its own lines.

use std::io::Write;

use wa_protocol::TransferNotice;

use crate::confirm;
use crate::style::Style;

pub struct StreamDisplay<W: Write> {
    writer: W,
    style: Style,
    /// Bytes of the turn's display content already written.
    printed: usize,
    card_shown: bool,
}

impl<W: Write> StreamDisplay<W> {
    pub fn new(writer: W, style: Style) -> Self {
        Self {
            writer,
            style,
            printed: 0,
            card_shown: false,
        }
    }

    /// Bring the terminal up to date with the turn's display content.
    pub fn sync(&mut self, display: &str, transfer_seen: bool) {
        if transfer_seen {
            if !self.card_shown {
                let _ = writeln!(self.writer);
                let _ = writeln!(self.writer, "{display}");
                let _ = self.writer.flush();
                self.card_shown = true;
                self.printed = display.len();
            }
            return;
        }
        if display.len() > self.printed {
            let _ = write!(self.writer, "{}", &display[self.printed..]);
            let _ = self.writer.flush();
            self.printed = display.len();
        }
    }

    /// Print the transfer confirmation panel.
    pub fn notice(&mut self, notice: &TransferNotice) {
        let panel = confirm::render_notice(notice, &self.style);
        let _ = writeln!(self.writer);
        let _ = write!(self.writer, "{panel}");
        let _ = self.writer.flush();
    }

    /// The stream finished; terminate the output line.
    pub fn done(&mut self) {
        let _ = writeln!(self.writer);
        let _ = self.writer.flush();
    }

    /// Print a fatal stream error.
    pub fn error(&mut self, message: &str) {
        let _ = writeln!(
            self.writer,
            "\n{}error: {message}{}",
            self.style.red_start(),
            self.style.reset()
        );
        let _ = self.writer.flush();
    }

    /// Reset for the next turn.
    pub fn reset(&mut self) {
        self.printed = 0;
        self.card_shown = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wa_protocol::{TransferCall, TransferParams};

    use crate::reducer::AssistantTurn;

    fn display() -> StreamDisplay<Vec<u8>> {
        StreamDisplay::new(Vec::new(), Style::disabled())
    }

    fn output(d: &StreamDisplay<Vec<u8>>) -> String {
        String::from_utf8_lossy(&d.writer).to_string()
    }

    #[test]
    fn prints_only_unseen_tail() {
        let mut turn = AssistantTurn::new();
        let mut d = display();

        turn.push_text("Hello ");
        d.sync(turn.display(), false);
        turn.push_text("world");
        d.sync(turn.display(), false);

        assert_eq!(output(&d), "Hello world");
    }

    #[test]
    fn card_printed_once() {
        let call = TransferCall {
            tool: "nativeTransfer".to_string(),
            summary: "Sent".to_string(),
            params: TransferParams {
                amount: "1".to_string(),
                to: "0xabc".to_string(),
                tx_hash: None,
            },
        };
        let mut turn = AssistantTurn::new();
        let mut d = display();

        turn.push_text("working");
        d.sync(turn.display(), false);
        turn.apply_transfer(&call);
        d.sync(turn.display(), true);
        d.sync(turn.display(), true);

        let out = output(&d);
        assert_eq!(out.matches("Transaction Successful").count(), 1);
    }

    #[test]
    fn reset_clears_progress() {
        let mut d = display();
        d.sync("first", false);
        d.reset();
        d.sync("second", false);
        assert_eq!(output(&d), "firstsecond");
    }

    #[test]
    fn error_line() {
        let mut d = display();
        d.error("connection refused");
        assert!(output(&d).contains("error: connection refused"));
    }
}
