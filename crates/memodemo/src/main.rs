//! memodemo - times a slow computation before and after memoization

use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use memocache::{
    Bounded, CacheKey, CacheStats, LimitPolicy, Memo, Ordered, StorePolicy, Unlimited, Unordered,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Upper bound of the triangular sum to compute
    #[arg(short, long, default_value_t = 100_000_000)]
    input: u64,

    /// How many times to call the memoized function
    #[arg(short, long, default_value_t = 2)]
    repeat: usize,

    /// Backing store policy
    #[arg(short, long, value_enum, default_value_t = StoreKind::Unordered)]
    store: StoreKind,

    /// Cache capacity (0 = unlimited)
    #[arg(short, long, default_value_t = 0)]
    capacity: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum StoreKind {
    Ordered,
    Unordered,
}

/// One timed call
#[derive(Serialize, Debug)]
struct Run {
    call: usize,
    result: u64,
    elapsed_ms: u64,
    cached: bool,
}

/// Everything printed at the end
#[derive(Serialize, Debug)]
struct Report {
    input: u64,
    store: StoreKind,
    capacity: Option<usize>,
    runs: Vec<Run>,
    hits: u64,
    misses: u64,
    hit_ratio: f64,
}

/// Deliberately slow sum of `0..=n`
fn triangular((n,): (u64,)) -> u64 {
    let mut total = 0u64;
    for i in 0..=n {
        total = total.wrapping_add(std::hint::black_box(i));
    }
    total
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting memodemo v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {}", args.input);
    info!("Store: {:?}", args.store);
    info!("Capacity: {}", describe_capacity(args.capacity));

    let report = match (args.store, args.capacity) {
        (StoreKind::Ordered, 0) => {
            time_calls(Memo::<_, _, Ordered, Unlimited>::new(triangular), &args)
        }
        (StoreKind::Unordered, 0) => {
            time_calls(Memo::<_, _, Unordered, Unlimited>::new(triangular), &args)
        }
        (StoreKind::Ordered, cap) => time_calls(
            Memo::<_, _, Ordered, Bounded>::with_capacity(triangular, cap)
                .context("Failed to create bounded memo")?,
            &args,
        ),
        (StoreKind::Unordered, cap) => time_calls(
            Memo::<_, _, Unordered, Bounded>::with_capacity(triangular, cap)
                .context("Failed to create bounded memo")?,
            &args,
        ),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn time_calls<O, L>(mut memo: Memo<(u64,), u64, O, L>, args: &Args) -> Report
where
    O: StorePolicy<CacheKey<(u64,)>>,
    L: LimitPolicy<CacheKey<(u64,)>>,
{
    let mut runs = Vec::with_capacity(args.repeat);

    for call in 1..=args.repeat {
        let cached = memo.contains(&(args.input,));
        let start = Instant::now();
        let result = memo.call((args.input,));
        let elapsed = start.elapsed();

        info!(
            "Call {}: {} -> {} in {} ms ({})",
            call,
            args.input,
            result,
            elapsed.as_millis(),
            if cached { "cached" } else { "computed" }
        );
        debug!(?memo, "after call {}", call);

        runs.push(Run {
            call,
            result,
            elapsed_ms: elapsed.as_millis() as u64,
            cached,
        });
    }

    summarize(args, memo.capacity(), memo.stats(), runs)
}

fn summarize(args: &Args, capacity: Option<usize>, stats: &CacheStats, runs: Vec<Run>) -> Report {
    Report {
        input: args.input,
        store: args.store,
        capacity,
        runs,
        hits: stats.hits(),
        misses: stats.misses(),
        hit_ratio: stats.hit_ratio(),
    }
}

fn describe_capacity(capacity: usize) -> String {
    if capacity == 0 {
        "unlimited".to_string()
    } else {
        format!("{} entries", capacity)
    }
}

fn print_report(report: &Report) {
    println!("\nMEMODEMO REPORT");
    println!("   Input:      {}", report.input);
    println!("   Store:      {:?}", report.store);
    println!(
        "   Capacity:   {}",
        describe_capacity(report.capacity.unwrap_or(0))
    );
    for run in &report.runs {
        println!(
            "   Call {:<3}    {} ms{}",
            run.call,
            run.elapsed_ms,
            if run.cached { " (cached)" } else { "" }
        );
    }
    println!(
        "   Hits/Misses: {}/{} ({:.0}% hit rate)",
        report.hits,
        report.misses,
        report.hit_ratio * 100.0
    );
    if let Some(speedup) = speedup(&report.runs) {
        println!("   Speedup:    {:.1}x", speedup);
    }
}

/// Ratio of the first (computed) call to the fastest cached call
fn speedup(runs: &[Run]) -> Option<f64> {
    let first = runs.first().filter(|run| !run.cached)?;
    let fastest = runs
        .iter()
        .filter(|run| run.cached)
        .map(|run| run.elapsed_ms)
        .min()?;
    Some(first.elapsed_ms as f64 / fastest.max(1) as f64)
}
