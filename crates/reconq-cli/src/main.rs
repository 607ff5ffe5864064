mod simulated;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reconq_core::{Job, QueueBuilder, QueueConfig, Reconstructor};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::simulated::{Product, ReconstructInput, SimulatedReconstructor};

/// Run simulated reconstructions through the execution queue.
#[derive(Debug, Parser)]
#[command(name = "reconq", version)]
struct Args {
    /// Number of products to reconstruct (one job each).
    #[arg(long, default_value_t = 4)]
    jobs: usize,

    /// Probability that a reconstruction fails.
    #[arg(long, default_value_t = 0.25)]
    failure_rate: f64,

    /// Iterations per reconstruction.
    #[arg(long, default_value_t = 20)]
    iterations: usize,

    /// Milliseconds per iteration.
    #[arg(long, default_value_t = 25)]
    step_ms: u64,

    /// How often the control loop drains results, in milliseconds.
    #[arg(long, default_value_t = 200)]
    tick_ms: u64,

    /// Queue config (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base seed for the simulated solver.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .try_init()
        .ok();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => QueueConfig::from_path(path)?,
        None => QueueConfig::default(),
    };
    let mut queue = QueueBuilder::from_config(config).build::<usize, Product>()?;

    // (A) product repository: owned by this (control) thread only
    let mut products: Vec<Product> = (0..args.jobs)
        .map(|i| Product::initial(format!("scan-{i:03}"), 16))
        .collect();

    let reconstructor: Arc<dyn Reconstructor<ReconstructInput, Product>> =
        Arc::new(SimulatedReconstructor {
            iterations: args.iterations,
            failure_rate: args.failure_rate,
            step: Duration::from_millis(args.step_ms),
        });

    // (B) start the worker and submit one job per product
    queue.start()?;
    for (index, product) in products.iter().enumerate() {
        let input = ReconstructInput {
            object: product.object.clone(),
            seed: args.seed.wrapping_add(index as u64),
        };
        let job_id = queue.submit(Job::from_reconstructor(
            Arc::clone(&reconstructor),
            input,
            index,
        ))?;
        info!(%job_id, product = %product.name, "submitted reconstruction");
    }

    // (C) control loop: drain on a timer, like a UI refresh
    let mut ticker = interval(Duration::from_millis(args.tick_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for report in queue.drain_completed(&mut products, false)? {
                    println!("{}", serde_json::to_string(&report)?);
                }
                info!(status = %serde_json::to_string(&queue.status())?, "queue status");
                if !queue.is_busy() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                warn!("interrupted, finishing submitted reconstructions");
                break;
            }
        }
    }

    // (D) shutdown
    for report in queue.stop(&mut products)? {
        println!("{}", serde_json::to_string(&report)?);
    }
    println!("{}", serde_json::to_string_pretty(&products)?);
    Ok(())
}
