//! Transfer confirmation surface.
//!
//! Watches decoded payloads for a native transfer and builds the one-shot
//! notice shown to the user. Emission is a pure function of payload shape;
//! the session owns the once-per-stream guarantee.

use wa_protocol::transfer::NATIVE_TRANSFER_TOOL;
use wa_protocol::{AgentPayload, TransferNotice};

use crate::style::Style;

/// A notice exists exactly for native transfer calls.
pub fn observe(payload: &AgentPayload) -> Option<TransferNotice> {
    match payload {
        AgentPayload::Transfer(call) if call.tool == NATIVE_TRANSFER_TOOL => {
            Some(TransferNotice::from_call(call))
        }
        _ => None,
    }
}

/// Render the notice as a terminal panel.
pub fn render_notice(notice: &TransferNotice, style: &Style) -> String {
    let (color, title) = if notice.is_pending() {
        (style.yellow_start(), "Transfer pending")
    } else {
        (style.green_start(), "Transfer confirmed")
    };
    let reset = style.reset();
    let dim = style.dim_start();

    let mut out = String::new();
    out.push_str(&format!("{color}┌─ {title} ─{reset}\n"));
    out.push_str(&format!(
        "{color}│{reset} Amount   {}{} ETH{}\n",
        style.bold_start(),
        notice.amount,
        reset
    ));
    out.push_str(&format!("{color}│{reset} To       {}\n", notice.recipient));
    out.push_str(&format!("{color}│{reset} Tx hash  {}\n", notice.tx_hash));
    out.push_str(&format!("{color}│{reset}\n"));
    out.push_str(&format!(
        "{color}│{reset} {dim}{}{reset}\n",
        notice.summary
    ));
    out.push_str(&format!("{color}└─{reset}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wa_protocol::{TransferCall, TransferParams};

    fn transfer_payload(tool: &str, tx_hash: Option<&str>) -> AgentPayload {
        AgentPayload::Transfer(TransferCall {
            tool: tool.to_string(),
            summary: "Sent 0.5 ETH to alice.eth".to_string(),
            params: TransferParams {
                amount: "0.5".to_string(),
                to: "0xABCDEF1234567890".to_string(),
                tx_hash: tx_hash.map(str::to_string),
            },
        })
    }

    #[test]
    fn observe_native_transfer() {
        let notice = observe(&transfer_payload("nativeTransfer", Some("0xdeadbeef"))).unwrap();
        assert_eq!(notice.amount, "0.5");
        assert_eq!(notice.recipient, "0xABCDEF1234567890");
        assert_eq!(notice.tx_hash, "0xdeadbeef");
    }

    #[test]
    fn observe_missing_hash_defaults_to_pending() {
        let notice = observe(&transfer_payload("nativeTransfer", None)).unwrap();
        assert_eq!(notice.tx_hash, "Pending...");
    }

    #[test]
    fn observe_ignores_text() {
        assert_eq!(observe(&AgentPayload::Text("hello".to_string())), None);
    }

    #[test]
    fn observe_ignores_other_tools() {
        assert_eq!(observe(&transfer_payload("swap", Some("0x1"))), None);
    }

    #[test]
    fn panel_contains_fields() {
        let notice = observe(&transfer_payload("nativeTransfer", Some("0xdeadbeef"))).unwrap();
        let panel = render_notice(&notice, &Style::disabled());
        assert!(panel.contains("Transfer confirmed"));
        assert!(panel.contains("0.5 ETH"));
        assert!(panel.contains("0xABCDEF1234567890"));
        assert!(panel.contains("0xdeadbeef"));
        assert!(panel.contains("Sent 0.5 ETH to alice.eth"));
    }

    #[test]
    fn panel_pending_title() {
        let notice = observe(&transfer_payload("nativeTransfer", None)).unwrap();
        let panel = render_notice(&notice, &Style::disabled());
        assert!(panel.contains("Transfer pending"));
        assert!(panel.contains("Pending..."));
    }

    #[test]
    fn panel_no_ansi_when_disabled() {
        let notice = observe(&transfer_payload("nativeTransfer", None)).unwrap();
        let panel = render_notice(&notice, &Style::disabled());
        assert!(!panel.contains('\x1b'));
    }
}
