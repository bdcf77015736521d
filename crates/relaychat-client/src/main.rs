//! relaychat terminal client.
//!
//! Run with:
//! ```not_rust
//! relaychat-client --name alice
//! relaychat-client -u ws://chat.example:5555/v1/ws -d ./inbox
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use relaychat_client::session::{run_client, ClientOptions, DEFAULT_MAX_UPLOAD_BYTES};

#[derive(Parser, Debug)]
#[command(name = "relaychat-client")]
#[command(about = "Terminal client for the relaychat server", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:5555/v1/ws")]
    url: String,

    /// Display name sent right after connecting
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Directory for downloaded files
    #[arg(short = 'd', long, default_value = "downloads")]
    downloads: PathBuf,

    /// Refuse local files larger than this before uploading
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let opts = ClientOptions {
        url: args.url,
        name: args.name,
        downloads: args.downloads,
        max_upload_bytes: args.max_upload_bytes,
    };

    match run_client(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "client error");
            eprintln!("{}", e.notice());
            ExitCode::FAILURE
        }
    }
}
