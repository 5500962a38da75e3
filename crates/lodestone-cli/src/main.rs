use anyhow::{bail, Context};
use clap::Parser;
use lodestone_client::{Client, Event};
use lodestone_protocol::Version;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// Join a Minecraft server and chat from the terminal.
#[derive(Parser)]
#[command(name = "lodestone", version)]
struct Args {
    /// Server address, host or host:port.
    #[arg(long, default_value = "127.0.0.1:25565")]
    host: String,

    /// Username to log in with.
    #[arg(long, default_value = "Lodestone")]
    username: String,

    /// Minecraft version string (e.g. 1.18.2), or "latest".
    #[arg(long, default_value = "latest")]
    version: String,

    /// Brand reported on the minecraft:brand channel.
    #[arg(long, default_value = "vanilla")]
    brand: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let version = if args.version == "latest" {
        Version::LATEST
    } else {
        match Version::from_release_str(&args.version) {
            Some(v) => v,
            None => bail!("unknown Minecraft version: {}", args.version),
        }
    };

    let client = Client::builder()
        .address(&args.host)
        .username(&args.username)
        .version(version)
        .brand(&args.brand)
        .build();

    let mut events = client
        .join_and_listen(100)
        .await
        .context("failed to log in")?;

    info!(
        "Logged in as {} on version {}. Type to chat, Ctrl-C to quit.",
        args.username, version
    );

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                None => {
                    info!("Event channel closed. Exiting.");
                    break;
                }
                Some(Event::Ready { username }) => info!("{} is ready", username),
                Some(Event::Disconnect { reason }) => {
                    info!("Disconnected: {}", reason);
                    break;
                }
                Some(Event::ChatMessage { message, .. }) => println!("[Chat] {}", message),
                Some(Event::KeepAlive { .. }) => {}
            },
            line = stdin.next_line() => match line {
                Ok(Some(text)) if !text.is_empty() => {
                    if let Err(e) = client.chat(&text).await {
                        error!("Failed to send chat message: {}", e);
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    client.close().await;
    Ok(())
}
