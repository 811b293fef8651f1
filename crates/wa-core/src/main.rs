use std::io::{self, IsTerminal, Read};

use wa_core::config::Config;
use wa_core::repl::{run_batch, run_repl};

fn print_help() {
    println!("walletagent — terminal client for the wallet-agent chat service");
    println!();
    println!("Usage:");
    println!("  walletagent                      Interactive chat");
    println!("  walletagent \"message\"            One-shot mode (non-interactive)");
    println!("  echo \"message\" | walletagent     One-shot mode via stdin pipe");
    println!();
    println!("Options:");
    println!("  --chat <id>    Resume an existing chat");
    println!("  --no-journal   Disable the local chat journal");
    println!("  --version      Print version");
    println!("  --help         Print this help");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("WALLETAGENT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("walletagent {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let mut config = Config::load_or_default();
    if args.iter().any(|a| a == "--no-journal") {
        config.journal.enabled = false;
    }

    let chat_value_idx = args.iter().position(|a| a == "--chat").map(|i| i + 1);
    let chat_id = chat_value_idx.and_then(|i| args.get(i)).cloned();
    if chat_value_idx.is_some() && chat_id.is_none() {
        eprintln!("error: --chat requires a chat id");
        std::process::exit(2);
    }

    // One-shot mode: positional arg (non-flag, not the --chat value) or
    // piped stdin.
    let non_flag_args: Vec<&String> = args
        .iter()
        .enumerate()
        .filter(|(i, a)| !a.starts_with('-') && Some(*i) != chat_value_idx)
        .map(|(_, a)| a)
        .collect();
    let stdin_is_pipe = !io::stdin().is_terminal();

    let message = if let Some(arg) = non_flag_args.first() {
        Some((*arg).clone())
    } else if stdin_is_pipe {
        let mut buf = String::new();
        if io::stdin().read_to_string(&mut buf).is_ok() && !buf.trim().is_empty() {
            Some(buf.trim().to_string())
        } else {
            None
        }
    } else {
        None
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create async runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Some(message) = message {
        let code = runtime.block_on(run_batch(&config, &message, chat_id.as_deref()));
        std::process::exit(code);
    }

    if let Err(e) = runtime.block_on(run_repl(&config, chat_id)) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
