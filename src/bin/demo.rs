//! aerospike-demo Binary
//!
//! Connects to a cluster (or the in-memory store) and runs the walkthrough.

use clap::Parser;
use aerospike_demo::{AerospikeStore, Config, Demo, MemoryStore, RecordStore, Result, Step};
use tracing_subscriber::{fmt, EnvFilter};

/// aerospike-demo
#[derive(Parser, Debug)]
#[command(name = "aerospike-demo")]
#[command(about = "Walk through basic Aerospike client operations")]
#[command(version)]
struct Args {
    /// Seed hosts (host:port), repeatable or comma-separated
    #[arg(short = 'H', long = "hosts", value_delimiter = ',')]
    hosts: Vec<String>,

    /// User for security-enabled clusters
    #[arg(short, long, requires = "password")]
    user: Option<String>,

    /// Password for security-enabled clusters
    #[arg(short, long, requires = "user")]
    password: Option<String>,

    /// Namespace for all demo records
    #[arg(short, long, default_value = "test")]
    namespace: String,

    /// Write timeout in milliseconds
    #[arg(long, default_value = "1000")]
    write_timeout_ms: u64,

    /// TTL of the expiring record in seconds
    #[arg(long, default_value = "2")]
    ttl_seconds: u32,

    /// How long to wait for the record to expire, in milliseconds
    #[arg(long, default_value = "4000")]
    ttl_wait_ms: u64,

    /// Number of records in the batch write/read steps
    #[arg(short, long, default_value = "1024")]
    batch_size: usize,

    /// Run against an in-process store instead of a cluster
    #[arg(long)]
    in_memory: bool,

    /// Run only these steps, in the order given
    #[arg(long, value_enum, value_delimiter = ',')]
    only: Vec<Step>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,aerospike_demo=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::info!("aerospike-demo v{}", aerospike_demo::VERSION);

    let config = build_config(&args);
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let steps: &[Step] = if args.only.is_empty() { &Step::ALL } else { &args.only };

    let result = if args.in_memory {
        tracing::info!("Using in-memory store");
        run(&MemoryStore::new(), &config, steps)
    } else {
        AerospikeStore::connect(&config).and_then(|store| run(&store, &config, steps))
    };

    if let Err(e) = result {
        tracing::error!("Demo failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Demo finished");
}

fn build_config(args: &Args) -> Config {
    let mut builder = Config::builder()
        .namespace(&args.namespace)
        .write_timeout_ms(args.write_timeout_ms)
        .ttl_seconds(args.ttl_seconds)
        .ttl_wait_ms(args.ttl_wait_ms)
        .batch_size(args.batch_size);

    if !args.hosts.is_empty() {
        builder = builder.hosts(args.hosts.iter().cloned());
    }
    if let (Some(user), Some(password)) = (&args.user, &args.password) {
        builder = builder.credentials(user, password);
    }

    builder.build()
}

fn run<S: RecordStore>(store: &S, config: &Config, steps: &[Step]) -> Result<()> {
    let demo = Demo::new(store, config).with_progress(|message| println!("{}", message));
    demo.run_steps_and_close(steps, |outcome| {
        println!("{}", outcome);
        println!();
    })?;
    Ok(())
}
