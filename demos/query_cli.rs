//! Command-line demo for the A2S query client. Exercises the library
//! against real endpoints, analogous to the teacher crate's own
//! `examples/info.rs` smoke test, but driving the full dispatcher instead
//! of a single hand-rolled request/response round trip.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use a2s_query::dispatcher::{run_query, QueryTarget};
use a2s_query::event::Event;
use a2s_query::resolver::TokioResolver;
use a2s_query::transport::UdpTransport;
use a2s_query::QueryConfig;

#[derive(Parser, Debug)]
#[command(about = "Query one or more A2S game servers")]
struct Args {
    /// One or more `host:port` endpoints to query.
    #[arg(required = true)]
    endpoints: Vec<String>,

    /// Overall deadline in milliseconds, covering every endpoint.
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,
}

fn parse_endpoint(raw: &str) -> Result<QueryTarget, String> {
    let (host, port) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("{raw:?} is not in host:port form"))?;
    let port: u16 = port
        .parse()
        .map_err(|_| format!("{port:?} is not a valid port"))?;
    Ok(QueryTarget::new(host, port))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let targets = args
        .endpoints
        .iter()
        .map(|s| parse_endpoint(s).map_err(anyhow::Error::msg))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let config = QueryConfig {
        timeout: Duration::from_millis(args.timeout_ms),
    };

    let resolver = Arc::new(TokioResolver);
    let transport = Arc::new(UdpTransport::bind().await?);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let run = tokio::spawn(run_query(targets, resolver, transport, config, tx));

    while let Some(event) = rx.recv().await {
        match event {
            Event::Info(id, info) => println!("[{id}] info: {info:?}"),
            Event::Player(id, players) => println!("[{id}] players: {players:?}"),
            Event::Rules(id, rules) => println!("[{id}] rules: {rules:?}"),
            Event::Ping(id, ms) => println!("[{id}] ping: {ms:.1}ms"),
            Event::Challenge(id, token) => println!("[{id}] challenge: {token:#010x}"),
            Event::Error(err) => eprintln!("error: {err}"),
            Event::Done {
                endpoints,
                timed_out,
            } => {
                println!("done (timed_out={timed_out})");
                for (id, endpoint) in endpoints.iter().enumerate() {
                    println!("  [{id}] {} complete={}", endpoint.host, endpoint.is_complete());
                }
            }
        }
    }

    run.await??;
    Ok(())
}
