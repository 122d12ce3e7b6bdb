mod cache;
mod config;
mod map;
mod trace;

use std::{
    error::Error,
    fs,
    io::{self, BufRead},
    process::ExitCode,
};

use log::info;

use crate::{cache::CacheStats, config::Config, trace::Trace};

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error! {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = pico_args::Arguments::from_env();
    let heartbeat_int: u64 = args
        .opt_value_from_str("-h")
        .expect("-h should be an integer")
        .unwrap_or(0);
    let addrs_per_block: usize = args
        .opt_value_from_str("--buffer-size")
        .expect("--buffer-size must be an integer")
        .unwrap_or(1024);
    let blocks_per_queue: usize = args
        .opt_value_from_str("--queue-size")
        .expect("--queue-size must be an integer")
        .unwrap_or(32);
    let config_json: Option<String> = args.opt_value_from_str("--config").unwrap();
    let config_path: Option<String> = args.opt_value_from_str("-p").unwrap();
    let trace_path: Option<String> = args.opt_value_from_str("-t").unwrap();
    let stats_path: Option<String> = args.opt_value_from_str("--json").unwrap();

    let config: Config = if let Some(json) = config_json {
        serde_json::from_str(&json)?
    } else if let Some(path) = config_path {
        serde_json::from_str(&fs::read_to_string(path)?)?
    } else {
        // No config flag: the first line of stdin carries it, as in
        // `ways blocks block_size`, with the trace following.
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line)?;
        Config::from_line(&line)?
    };
    config.validate()?;
    info!(
        "simulating {} blocks of {} words, {} way(s)",
        config.blocks, config.block_size, config.ways
    );

    let mut cache = config.to_cache();

    let trace = match trace_path {
        Some(path) => Trace::open(path.into(), addrs_per_block, blocks_per_queue)?,
        None => Trace::from_stream(Box::new(io::stdin()), addrs_per_block, blocks_per_queue),
    };

    let mut next_heartbeat = heartbeat_int;
    for block in trace.rec.iter() {
        for addr in &block {
            let _ = cache.access(addr)?;
        }
        if heartbeat_int != 0 {
            let accesses = cache.report().accesses;
            if accesses > next_heartbeat {
                println!("Addresses: {accesses}");
                while next_heartbeat < accesses {
                    next_heartbeat += heartbeat_int;
                }
            }
        }
    }

    let stats = cache.report();
    info!("trace exhausted after {} accesses", stats.accesses);
    print_report(&stats);

    if let Some(path) = stats_path {
        let stats_file = fs::File::create(path)?;
        serde_json::to_writer_pretty(stats_file, &stats)?;
    }
    Ok(())
}

fn print_report(stats: &CacheStats) {
    println!("Accesses: {}", stats.accesses);
    println!("Hits: {}", stats.hits);
    println!("Misses: {}", stats.misses);
    println!("Hit rate: {:.3}%", stats.hit_rate);
    println!("Miss rate: {:.3}%", stats.miss_rate);
}
