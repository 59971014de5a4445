//! Example of using the catcollector node collector.

use catcollector::{
    CancellationToken, CollectorBuilder, NodeAddress, RestClient, RestClientConfiguration,
};
use clap::Parser;
use log::LevelFilter;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// REST address of the seed node, e.g. http://symbol.dev:3000.
    #[arg(short, long)]
    seed: String,

    /// Number of nodes to stop at, 0 collects everything reachable.
    #[arg(short, long, default_value = "0")]
    target: usize,

    /// Maximum number of concurrent tasks for collecting.
    #[arg(short, long, default_value = "8")]
    concurrent_tasks: usize,

    /// Nodes never to visit (host, host:port or URL). Repeatable.
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Skip health and server lookups.
    #[arg(long)]
    only_node_info: bool,

    /// Per request timeout in seconds.
    #[arg(long, default_value = "10")]
    request_timeout: u64,

    /// Overall collection timeout in seconds (optional).
    #[arg(long)]
    collect_timeout: Option<u64>,

    /// Log level.
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    // Configure fern logger
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {} - {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log_level)
        .chain(std::io::stderr())
        .apply()?;

    log::info!("COLLECTING SYMBOL NODES");

    let seed = NodeAddress::parse(&args.seed)?;
    let client = RestClient::new(
        RestClientConfiguration::default()
            .with_request_timeout(Duration::from_secs(args.request_timeout)),
    )?;

    log::debug!("Using {} concurrent tasks", args.concurrent_tasks);
    let mut builder = CollectorBuilder::new(client, seed)
        .with_max_concurrent_tasks(args.concurrent_tasks)?
        .with_excluded_nodes(&args.exclude);
    if let Some(secs) = args.collect_timeout {
        builder = builder.with_collect_timeout(Duration::from_secs(secs));
    }
    if args.only_node_info {
        builder = builder.only_node_info();
    }
    let collector = builder.build();

    // Ctrl-C stops the collection, keeping what was found so far.
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let report = collector.collect(args.target, cancel).await;

    let reachable = if args.only_node_info {
        report.nodes.clone()
    } else {
        report
            .nodes
            .selection(|node| node.health.is_some_and(|h| h.status.api_node.is_up()))
    };
    for url in reachable.take_out_urls() {
        println!("{}", url.join());
    }

    log::info!(
        "{} nodes collected, {} listed",
        report.num_collected,
        reachable.len()
    );
    if let Some(errors) = report.errors {
        log::info!("{} failures:\n{errors}", errors.len());
    }

    Ok(())
}
