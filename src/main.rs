//! AutoShade - predicts sun glare for the driver and places a shading spot
//!
//! Usage:
//!   autoshade                              # gpsd on localhost:2947, full screen
//!   autoshade --config autoshade.json      # load settings
//!   autoshade --replay drive.json          # replay recorded fixes instead of gpsd
//!   autoshade 40 80 50                     # test mode: azimuth zenith heading

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use autoshade::config::AutoshadeConfig;
use autoshade::core::{logging, time::TickTimer, Result};
use autoshade::display::{self, WindowConfig};
use autoshade::driver::{self, ShadeLoop};
use autoshade::sensor::{GpsdFeed, ReplayFeed};
use autoshade::solar::{SpaProvider, SystemClock};
use autoshade_gpsd::GpsdClient;

#[derive(Parser)]
#[command(name = "autoshade")]
#[command(about = "Predict sun glare and place a shading spot on the windshield display")]
struct Args {
    /// Test mode: evaluate AZIMUTH ZENITH HEADING (degrees) and exit
    #[arg(num_args = 3, value_names = ["AZIMUTH", "ZENITH", "HEADING"], allow_negative_numbers = true)]
    sun: Option<Vec<f64>>,

    /// JSON config file; defaults apply to anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// gpsd host (overrides config)
    #[arg(long)]
    gpsd_host: Option<String>,

    /// gpsd port (overrides config)
    #[arg(long)]
    gpsd_port: Option<u16>,

    /// Replay a JSON array of fixes, one per tick, instead of reading gpsd
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Open a window instead of going full screen
    #[arg(long)]
    windowed: bool,

    /// Print the test mode result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(values) = &args.sun {
        let &[azimuth, zenith, heading] = values.as_slice() else {
            eprintln!("test mode takes exactly three values: azimuth zenith heading");
            return ExitCode::FAILURE;
        };
        let glare = driver::evaluate_once(&config, azimuth, zenith, heading);
        if args.json {
            match serde_json::to_string(&glare) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    log::error!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
        } else if glare.visible {
            println!("Glare: spot at ({}, {})", glare.spot_x, glare.spot_y);
        } else {
            println!("No glare");
        }
        return ExitCode::SUCCESS;
    }

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<AutoshadeConfig> {
    let mut config = match &args.config {
        Some(path) => AutoshadeConfig::load(path)?,
        None => AutoshadeConfig::default(),
    };
    if let Some(host) = &args.gpsd_host {
        config.gpsd.host = host.clone();
    }
    if let Some(port) = args.gpsd_port {
        config.gpsd.port = port;
    }
    if args.windowed {
        config.display.fullscreen = false;
    }
    Ok(config)
}

fn run(args: &Args, config: &AutoshadeConfig) -> Result<()> {
    log::info!("AutoShade starting...");
    let timer = TickTimer::new(config.tick_period());
    let window_config = WindowConfig::from(&config.display);
    let provider = Box::new(SpaProvider::new());
    let clock = Box::new(SystemClock::new(config.atmosphere.timezone_hours));

    if let Some(path) = &args.replay {
        let feed = ReplayFeed::load(path)?;
        let shade = ShadeLoop::from_config(config, feed, provider, clock).with_fix_budget(1);
        return display::run(window_config, shade, timer);
    }

    // gpsd I/O lives on its own runtime; the window loop only ever try_recv's
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("gpsd")
        .enable_all()
        .build()?;

    let client = runtime.block_on(GpsdClient::connect(&config.gpsd.host, config.gpsd.port))?;
    let reports = client.spawn_reports(runtime.handle());
    let shade = ShadeLoop::from_config(config, GpsdFeed::new(reports), provider, clock);

    let result = display::run(window_config, shade, timer);
    runtime.shutdown_background();
    result
}
