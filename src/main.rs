use knightnet::board::{Board, BoardConfig, ExecutionTier};
use knightnet::observer::BoardAdapter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_STEPS: u64 = 10_000;

struct Options {
    cfg: BoardConfig,
    max_steps: u64,
    runs: u64,
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opts = parse_args();

    let mut board = Board::new(opts.cfg)?;
    select_execution_tier(&mut board);
    info!(
        size = board.size(),
        connections = board.connections().len(),
        seed = ?board.config().seed,
        "knight's tour network ready"
    );

    let results = run_batch(&mut board, opts.runs, opts.max_steps);
    if results.len() > 1 {
        let stable = results.iter().filter(|r| r.is_some()).count();
        info!("{}/{} runs reached a fixed point", stable, results.len());
    }

    let adapter = BoardAdapter::new(&board);
    if opts.json {
        println!("{}", adapter.snapshot().to_json()?);
    } else {
        let diag = board.diagnostics();
        println!(
            "tick={} active={}/{} degree2={}/{} stable={} tour_candidate={}",
            diag.tick,
            diag.active_connections,
            diag.connection_count,
            diag.squares_with_degree_two,
            diag.square_count,
            diag.stable,
            diag.tour_candidate
        );
        print!("{}", adapter.degree_grid());
    }

    Ok(())
}

/// Run the board to stability `runs` times, resetting to a fresh random
/// pattern between runs. The final run's state is left on the board.
fn run_batch(board: &mut Board, runs: u64, max_steps: u64) -> Vec<Option<u64>> {
    let mut results = Vec::with_capacity(runs as usize);
    for run in 1..=runs {
        if run > 1 {
            board.reset();
        }
        let outcome = board.run_until_stable(max_steps);
        match outcome {
            Some(steps) => info!(run, "Stable after {} updates", steps),
            None => warn!(run, "Not stable after {} updates", max_steps),
        }
        results.push(outcome);
    }
    results
}

// Values: scalar|parallel. Unset means scalar.
fn select_execution_tier(board: &mut Board) {
    let Ok(v) = std::env::var("KNIGHTNET_EXEC_TIER") else {
        return;
    };
    let requested = match v.trim().to_ascii_lowercase().as_str() {
        "scalar" => ExecutionTier::Scalar,
        "parallel" => ExecutionTier::Parallel,
        _ => {
            warn!("Unknown KNIGHTNET_EXEC_TIER value: {}", v);
            return;
        }
    };

    board.set_execution_tier(requested);
    let effective = board.effective_execution_tier();
    if effective != requested {
        warn!(
            "Requested execution tier {:?} but using {:?} (feature unavailable)",
            requested, effective
        );
    }
}

fn print_help() {
    println!("knightnet (knight's tour threshold network)");
    println!("usage:");
    println!("  knightnet [-s|--size N] [--seed S] [--max-steps N] [--runs N] [--json]");
    println!("  knightnet --help");
    println!();
    println!("  -s, --size N      board side length (default 6)");
    println!("  --seed S          seed for the initial outputs (default: clock)");
    println!("  --max-steps N     give up after N updates (default {DEFAULT_MAX_STEPS})");
    println!("  --runs N          reset and rerun N times (default 1)");
    println!("  --json            print the final snapshot as JSON");
    println!();
    println!("env: KNIGHTNET_EXEC_TIER=scalar|parallel, RUST_LOG=<filter>");
}

fn usage_error(msg: &str) -> ! {
    eprintln!("{msg}");
    print_help();
    std::process::exit(2);
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> T {
    let Some(value) = value else {
        usage_error(&format!("Missing value for {flag}"));
    };
    value
        .parse()
        .unwrap_or_else(|_| usage_error(&format!("Invalid value for {flag}: {value}")))
}

fn parse_args() -> Options {
    let mut cfg = BoardConfig::default();
    let mut max_steps = DEFAULT_MAX_STEPS;
    let mut runs = 1;
    let mut json = false;
    let mut seed = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => {
                print_help();
                std::process::exit(0);
            }
            "-s" | "--size" => cfg.size = parse_number(&arg, args.next()),
            "--seed" => seed = Some(parse_number(&arg, args.next())),
            "--max-steps" => max_steps = parse_number(&arg, args.next()),
            "--runs" => runs = parse_number(&arg, args.next()),
            "--json" => json = true,
            other => {
                if let Some(v) = other.strip_prefix("--size=") {
                    cfg.size = parse_number("--size", Some(v.to_string()));
                } else {
                    usage_error(&format!("Unknown argument: {other}"));
                }
            }
        }
    }

    // Without an explicit seed, every run starts from a different pattern.
    let seed = seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    });

    Options {
        cfg: cfg.with_seed(seed),
        max_steps,
        runs: runs.max(1),
        json,
    }
}
