mod commands;
mod config;
mod logging;
mod output;

use commands::{HELP, Input};
use config::CliConfig;
use gallery_feed::{HttpFeedClient, spawn_runtime};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    logging::init();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let client = match HttpFeedClient::new(config.feed_config()) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to initialize feed client: {err}");
            std::process::exit(1);
        }
    };

    info!(
        feed_url = %config.feed_url,
        page_size = config.page_size(),
        "starting gallery"
    );
    let (handle, mut events) = spawn_runtime(client, config.page_size());

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{}", output::render_event(&event)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                eprintln!("Failed to read input: {err}");
                break;
            }
        };

        match commands::parse_line(&line) {
            Ok(Input::Command(command)) => {
                if let Err(err) = handle.send(command).await {
                    eprintln!("Gallery runtime stopped: {err}");
                    break;
                }
            }
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => break,
            Ok(Input::Empty) => {}
            Err(message) => println!("{message}"),
        }
    }
}
