use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use precache::application::{current_streamer, CommitService, NoopStreamer, Streamer};
use precache::domain::{CurrentlyPlaying, GitCommitService};
use precache::infrastructure::{
    serve, toml_config, AppState, GithubCommitService, HttpMusicService,
};
use tokio::io::AsyncBufReadExt;
use tokio::sync::oneshot;

#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(
        short,
        long,
        help = "Specify the config file.",
        default_value = "./config.toml"
    )]
    config_path: String,
    #[clap(short, long, help = "Override the port to listen on.")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("precache=info")).init();

    info!("config_path: {}", args.config_path);
    let config = toml_config::load(&args.config_path).await?;
    let port = args.port.unwrap_or(config.port);

    info!("initializing services.");
    let github = config.github;
    let github = GithubCommitService::new(github.api_url, github.owner, github.repo, github.token)?;
    let commits = Arc::new(CommitService::new(Arc::new(github), &config.commits)?);

    let current: Arc<dyn Streamer<Option<CurrentlyPlaying>>> = match config.music {
        Some(music) => {
            let service = Arc::new(HttpMusicService::new(music.url, music.token));
            current_streamer(service, &music.streamer)?.into()
        }
        None => Arc::new(NoopStreamer::new("music")),
    };

    let state = AppState {
        commits: commits.clone() as Arc<dyn GitCommitService>,
        current: current.clone(),
    };

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            let line = lines.next_line().await;
            match line.as_ref().map(|x| x.as_ref().map(|y| y.as_str())) {
                Ok(Some("q")) => break,
                Ok(Some(_)) => (),
                Ok(None) | Err(_) => {
                    // No usable stdin: leave shutdown to Ctrl-C.
                    std::future::pending::<()>().await;
                }
            }
        }

        tx.send(())
    });

    let shutdown = async move {
        tokio::select! {
            _ = rx => info!("quit requested."),
            _ = tokio::signal::ctrl_c() => info!("interrupted."),
        }
    };

    info!("start server.");
    if let Err(why) = serve(port, state, shutdown).await {
        error!("{why}");
    }

    info!("stopping background refreshers.");
    commits.stop();
    current.stop();

    Ok(())
}
