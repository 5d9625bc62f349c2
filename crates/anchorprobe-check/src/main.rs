//! CLI entry point for the anchorprobe connectivity checker.
//!
//! Prints a one-line report on stdout and exits non-zero when fewer
//! targets than `--fail-threshold` were reachable. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use anchorprobe_core::{AddressFilter, AnchorprobeConfig, CountSpec};
use anchorprobe_discover::{AtlasDirectory, DiscoveryCache};

use anchorprobe_check::report::{self, OutputFormat};
use anchorprobe_check::{run_check, CheckPlan, HttpProber, ProbeEngine, SampleSize};

#[derive(Parser)]
#[command(name = "anchorprobe")]
#[command(about = "Test network connectivity against public measurement anchors")]
#[command(version)]
struct Cli {
    /// Test against all available targets.
    #[arg(long, conflicts_with = "count")]
    all: bool,

    /// Number of targets to test against (e.g. 10 or 5%).
    #[arg(long, value_name = "N|P%")]
    count: Option<CountSpec>,

    /// Exit non-zero when fewer targets than this are reachable (e.g. 8 or 50%).
    #[arg(long, value_name = "N|P%")]
    fail_threshold: Option<CountSpec>,

    /// Test only IPv4 targets.
    #[arg(long, conflicts_with = "ipv6")]
    ipv4: bool,

    /// Test only IPv6 targets.
    #[arg(long)]
    ipv6: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Verbose)]
    output: OutputFormat,

    /// Override the maximum number of concurrent probes.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_parallel: Option<u32>,

    /// Override the anchor cache file location.
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Config file prefix (default: anchorprobe).
    #[arg(short, long, default_value = "anchorprobe")]
    config: String,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn address_filter(&self) -> AddressFilter {
        match (self.ipv4, self.ipv6) {
            (true, _) => AddressFilter::V4Only,
            (false, true) => AddressFilter::V6Only,
            (false, false) => AddressFilter::Any,
        }
    }

    fn apply_overrides(&self, config: &mut AnchorprobeConfig) {
        if let Some(n) = self.max_parallel {
            config.probe.max_parallel = n as usize;
        }
        if let Some(path) = &self.cache_file {
            config.cache.file = path.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = AnchorprobeConfig::load(&cli.config)?;
    cli.apply_overrides(&mut config);

    let directory = AtlasDirectory::new(&config.directory)?;
    let mut cache = DiscoveryCache::new(directory, &config.cache.file, config.cache.ttl_secs);
    let engine = ProbeEngine::new(HttpProber::new(&config.probe)?, config.probe.max_parallel);

    let plan = CheckPlan {
        filter: cli.address_filter(),
        size: SampleSize::from_flags(cli.all, cli.count, config.probe.default_sample_percent),
    };

    let results = run_check(&mut cache, &engine, &plan).await?;
    let summary = results.summary();
    println!("{}", report::render(&summary, cli.output));

    Ok(report::exit_code(&summary, cli.fail_threshold.as_ref()))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
