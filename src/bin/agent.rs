//! Stand-in remote listener for trying the client without the real host tool.

use std::{
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    thread,
};

use anyhow::Result;
use clap::Parser;
use remote_exec::{RECV_BUFFER_SIZE, preamble::decode_ascii};

#[derive(Parser, Debug)]
#[command(author, version, about = "Minimal script listener: one read, one reply", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    addr: String,

    /// Fixed reply; echoes the received script when omitted
    #[arg(short, long)]
    reply: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let listener = TcpListener::bind(&args.addr)?;
    log::info!("Agent listening on {}", listener.local_addr()?);

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let reply = args.reply.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_client(&mut stream, reply.as_deref()) {
                        log::error!("Error handling client: {:?}", e);
                    }
                });
            }
            Err(e) => log::error!("Connection failed: {:?}", e),
        }
    }
    Ok(())
}

fn handle_client(stream: &mut TcpStream, reply: Option<&str>) -> Result<()> {
    let peer = stream.peer_addr()?;
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let n = stream.read(&mut buf)?;
    if n == 0 {
        log::info!("{} closed without sending", peer);
        return Ok(());
    }

    log::info!("Received {} bytes from {}", n, peer);
    log::debug!("script:\n{}", decode_ascii(&buf[..n]));

    match reply {
        Some(text) => stream.write_all(text.as_bytes())?,
        None => stream.write_all(&buf[..n])?,
    }
    stream.flush()?;
    Ok(())
}
