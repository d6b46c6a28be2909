use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::Parser;
use common::log_setup::{LogTarget, setup_logging};
use filterbench::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "filterbench", version, about = "Benchmark image filters across backends")]
struct Cli {
    /// Image width in pixels (also the height unless --height is given).
    size: Option<u32>,

    /// Filter to run.
    filter: Option<String>,

    /// Backend to run it on.
    method: Option<String>,

    /// Image height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Device as PLATFORM:DEVICE, see --list-devices.
    #[arg(long, default_value = "0:0")]
    device: DeviceSelector,

    /// Only count devices of this type when indexing.
    #[arg(long, default_value_t = DeviceType::All)]
    device_type: DeviceType,

    /// Timed iterations after the warm-up.
    #[arg(long, default_value_t = 8)]
    iterations: u32,

    /// Skip verification against the reference.
    #[arg(long)]
    no_verify: bool,

    /// Largest accepted per-byte difference.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u8,

    /// Compute-kernel workgroup shape, e.g. 16x8.
    #[arg(long)]
    workgroup: Option<WorkgroupSize>,

    /// Seed of the random input image; repeat to run once per seed.
    #[arg(long = "seed", default_values_t = [0u64])]
    seeds: Vec<u64>,

    /// Report progress while computing the reference.
    #[arg(long)]
    reference_progress: bool,

    /// Print platforms and devices, then exit.
    #[arg(long)]
    list_devices: bool,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write a daily rolling log file into this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_target = match &cli.log_dir {
        Some(dir) => LogTarget::ConsoleAndFile {
            dir,
            prefix: "filterbench",
        },
        None => LogTarget::ConsoleOnly,
    };
    setup_logging(&cli.log_level, log_target);

    if cli.list_devices {
        let platforms = list_platforms();
        if platforms.is_empty() {
            println!("No platforms found.");
        }
        for platform in platforms {
            print!("{platform}");
        }
        return Ok(());
    }

    let mut registry = Registry::new(Status::default());

    let (Some(width), Some(filter), Some(method)) = (cli.size, cli.filter, cli.method) else {
        bail!(
            "usage: filterbench SIZE FILTER METHOD\n  filters: {}\n  methods: {}",
            registry.filter_names().collect::<Vec<_>>().join(", "),
            Registry::method_names().collect::<Vec<_>>().join(", ")
        );
    };
    let height = cli.height.unwrap_or(width);

    let params = ExecutionParams {
        verify: !cli.no_verify,
        iterations: cli.iterations,
        tolerance: cli.tolerance,
        device: cli.device.device_type(cli.device_type),
        workgroup: cli.workgroup,
    };
    registry.set_reference_progress(cli.reference_progress);

    let mut passed = true;
    for seed in cli.seeds {
        let input = Image::new_random(width, height, seed).context("creating input image")?;
        let mut output = input.new_like();
        tracing::info!("{} with {} on {} (seed {})", filter, method, input, seed);

        registry.invalidate_references();
        passed &= registry.run(&filter, &method, &input, &mut output, &params);
    }

    if !passed {
        std::process::exit(1);
    }

    Ok(())
}
