mod game;

use cadence_engine::core::LoopConfig;
use cadence_engine::device::GpuInit;
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::window::Runtime;

use crate::game::RacketBall;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = LoopConfig::default()
        .with_title("Racket Ball")
        .with_size(game::FIELD_WIDTH, game::FIELD_HEIGHT);

    log::info!("Up/Down move the racket, Escape quits");

    Runtime::run(config, GpuInit::default(), RacketBall::new())
}
