use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quizdeck::engine::DEFAULT_QUESTION_CAP;
use quizdeck::protocol::DEFAULT_PORT;
use quizdeck::server::ServerConfig;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve quizzes over WebSocket
    Server {
        /// Port to listen on
        #[arg(short, long, env = "QUIZDECK_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Directory holding the quiz documents
        #[arg(short, long, env = "QUIZDECK_QUIZZES", default_value = "quizzes")]
        quizzes: PathBuf,

        /// Maximum number of questions per attempt
        #[arg(short, long, env = "QUIZDECK_CAP", default_value_t = DEFAULT_QUESTION_CAP)]
        cap: usize,

        /// File to append scored attempts to, one JSON object per line
        #[arg(long, env = "QUIZDECK_HISTORY")]
        history: Option<PathBuf>,
    },

    /// Play quizzes from a server
    Client {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "quizdeck=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let result = match args.command {
        Command::Server {
            port,
            quizzes,
            cap,
            history,
        } => {
            init_tracing();
            quizdeck::server::run(ServerConfig {
                port,
                quiz_dir: quizzes,
                question_cap: cap,
                history_path: history,
            })
            .await
        }
        // The client draws to the terminal, so it installs no log subscriber.
        Command::Client { host, port } => quizdeck::client::run(host, port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
