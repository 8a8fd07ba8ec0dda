use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use galton_cascade::app::App;
use galton_cascade::cli::Args;
use galton_cascade::error::AppError;

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.sim_config();
    log::info!(
        "Multiplicative factor {:.2} (max {:.2}), {} boxes",
        config.factor,
        config.max_factor,
        config.box_count
    );
    if let Some(seed) = config.seed {
        log::info!("RNG seed: {}", seed);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
