use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use rawhttp_core::{ClientConfig, HttpClient, HttpMethod};

/// Send a GET or POST over a raw TCP socket and print what comes back.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Method (GET or POST) when followed by a URL, otherwise the URL to GET
    method_or_url: String,

    /// URL to request
    url: Option<String>,

    /// Form argument sent with POST, as key=value (repeatable)
    #[arg(short, long = "data", value_name = "KEY=VALUE", value_parser = parse_pair)]
    data: Vec<(String, String)>,

    /// User-Agent header sent with GET
    #[arg(short = 'A', long)]
    user_agent: Option<String>,

    /// Bytes per socket read
    #[arg(long, default_value_t = rawhttp_core::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Connect/read/write timeout in seconds (none by default)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the parsed response as JSON instead of its body
    #[arg(long)]
    json: bool,

    /// Log to stderr; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// `(method, url)`: with a single positional the method is GET.
    fn target(&self) -> (&str, &str) {
        match &self.url {
            Some(url) => (self.method_or_url.as_str(), url.as_str()),
            None => ("GET", self.method_or_url.as_str()),
        }
    }

    /// Method to send; unknown words fall back to GET.
    fn method(&self) -> HttpMethod {
        HttpMethod::from_command(self.target().0)
    }

    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::default().with_chunk_size(self.chunk_size);
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => return Ok(()),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let (method, url) = args.target();
    if method.is_empty() || url.is_empty() {
        bail!("method and url must not be empty");
    }

    let client = HttpClient::new(args.config());
    let raw = client
        .fetch(args.method(), url, &args.data)
        .with_context(|| format!("{method} {url} failed"))?;

    println!("{raw}");

    let response = raw.parse().context("could not parse the response")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{response}");
    }

    Ok(())
}
