//! CLI for exercising tether framed-messaging endpoints.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use tether::{ClientConfig, Deadline, Error, server};

/// Receive buffer for the echo server and for client replies.
const RECV_BUF: usize = 64 * 1024;

#[derive(Parser)]
#[command(name = "tether", version, about = "Framed messaging over TCP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a framed echo server.
    Serve {
        /// Port to listen on (0 picks an ephemeral port).
        #[arg(short, long, default_value_t = 7007)]
        port: u16,

        /// Seconds to wait for each client (0 = wait forever).
        #[arg(long, default_value_t = 0)]
        accept_timeout: u32,

        /// Seconds to wait for each frame in or out (0 = wait forever).
        #[arg(long, default_value_t = 30)]
        io_timeout: u32,
    },

    /// Send one framed message and print the reply.
    Send {
        /// Host to connect to.
        host: String,

        /// Port to connect to.
        port: u16,

        /// Message payload; reads stdin when omitted.
        message: Option<String>,

        /// Seconds to wait for the connect (0 = wait forever).
        #[arg(long, default_value_t = 10)]
        connect_timeout: u32,

        /// Seconds to wait for each frame in or out (0 = wait forever).
        #[arg(long, default_value_t = 30)]
        io_timeout: u32,

        /// Do not wait for a reply frame.
        #[arg(long)]
        no_reply: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve {
            port,
            accept_timeout,
            io_timeout,
        } => serve(port, accept_timeout.into(), io_timeout.into()),
        Command::Send {
            host,
            port,
            message,
            connect_timeout,
            io_timeout,
            no_reply,
        } => send(
            &host,
            port,
            message,
            ClientConfig::new(
                connect_timeout.into(),
                io_timeout.into(),
                io_timeout.into(),
            ),
            no_reply,
        ),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tether", &mut io::stdout());
            Ok(())
        }
    }
}

/// Accept clients sequentially and echo every frame back.
fn serve(port: u16, accept_deadline: Deadline, io_deadline: Deadline) -> Result<()> {
    let listener = server::listen(port).context("failed to bind")?;
    let addr = listener.local_addr().context("no local address")?;
    println!("{} {addr}", "listening".green().bold());

    loop {
        let (mut stream, peer) = match server::accept(&listener, accept_deadline) {
            Ok(conn) => conn,
            Err(e) if e.is_timeout() => {
                println!("{} no client within {accept_deadline}", "idle".yellow());
                continue;
            }
            Err(e) => return Err(e).context("accept failed"),
        };
        println!("{} {peer}", "connected".green());

        let mut buf = vec![0u8; RECV_BUF];
        loop {
            let n = match server::recv(&mut stream, &mut buf, io_deadline) {
                Ok(n) => n,
                Err(Error::PeerClosed { got: 0, .. }) => {
                    println!("{} {peer}", "closed".blue());
                    break;
                }
                Err(e) => {
                    eprintln!("{} {peer}: {e}", "error".red().bold());
                    break;
                }
            };
            if let Err(e) = server::send(&mut stream, &buf[..n], io_deadline) {
                eprintln!("{} {peer}: {e}", "error".red().bold());
                break;
            }
        }
    }
}

/// Connect, send one frame, optionally await the echoed reply.
fn send(
    host: &str,
    port: u16,
    message: Option<String>,
    config: ClientConfig,
    no_reply: bool,
) -> Result<()> {
    let payload = match message {
        Some(text) => text.into_bytes(),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            bytes
        }
    };

    let mut stream = config
        .connect(host, port)
        .with_context(|| format!("failed to connect to {host}:{port}"))?;
    let sent = config.send(&mut stream, &payload)?;
    println!("{} {sent} bytes", "sent".green());

    if !no_reply {
        let mut out = vec![0u8; RECV_BUF];
        let n = config.recv(&mut stream, &mut out)?;
        println!("{} {}", "reply".green(), String::from_utf8_lossy(&out[..n]));
    }

    tether::close(stream);
    Ok(())
}
