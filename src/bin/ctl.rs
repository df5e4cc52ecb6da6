use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use remote_exec::{
    ClientConfig, PreambleStyle, ReceiveMode, execute_with_config, report,
    sink::{OutputSink, WriterSink},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Send a script to a remote interpreter and print its reply", long_about = None)]
struct Args {
    /// Script to send; reads stdin when omitted or "-"
    file: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener hostname
    #[arg(long)]
    host: Option<String>,

    /// Listener port
    #[arg(short, long)]
    port: Option<u16>,

    /// Prepend the debugger-attach preamble
    #[arg(short, long)]
    debug: bool,

    /// Port the debugger attaches on
    #[arg(long)]
    debug_port: Option<u16>,

    /// Read until the listener closes instead of a single read
    #[arg(long)]
    until_close: bool,

    /// Close the enable_attach call in the preamble
    #[arg(long)]
    balanced_preamble: bool,

    /// Print the result as a JSON line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let payload = read_payload(args.file.as_deref())?;

    log::info!(
        "Sending {} bytes to {}:{}{}",
        payload.len(),
        config.hostname,
        config.port,
        if config.debug_enabled { " (debug)" } else { "" }
    );

    let result = execute_with_config(&config, payload);

    let mut sink = WriterSink::new(io::stdout());
    if args.json {
        let line = match &result {
            Ok(res) => serde_json::to_string(res)?,
            Err(e) => serde_json::json!({ "error": e.kind().to_string(), "message": e.to_string() })
                .to_string(),
        };
        sink.write_text(&line)?;
        sink.write_text("\n")?;
    } else {
        report(&result, &mut sink)?;
    }

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };

    if let Some(host) = &args.host {
        config.hostname = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(port) = args.debug_port {
        config.debug_port = port;
    }
    if args.debug {
        config.debug_enabled = true;
    }
    if args.until_close {
        config.receive_mode = ReceiveMode::UntilClose;
    }
    if args.balanced_preamble {
        config.preamble_style = PreambleStyle::Balanced;
    }

    config.validate()?;
    Ok(config)
}

fn read_payload(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read script from stdin")?;
            Ok(text)
        }
    }
}
