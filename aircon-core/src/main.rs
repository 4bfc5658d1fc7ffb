//! aircon-sim: generate a synthetic site, train surrogates, and compare the
//! standard and chaotic power schedules.
//!
//! Usage: aircon-sim [config.json]
//! Environment: AIRCON_CONFIG (config path), AIRCON_LOG (log filter)

use aircon_core::core::storage::synthetic::generate_site;
use aircon_core::evaluate::{SOLUTION_PSO, SOLUTION_PSO_CHAOS};
use aircon_core::{
    setup_logging, AppConfig, Evaluator, ModelRegistry, MultiThreadTrainer, PsoScheduler, Solution,
    UserGeoSource,
};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

const SAMPLES_PER_SENSOR: usize = 60;
const SAMPLE_NOISE_STD: f32 = 0.3;

fn load_config() -> Result<AppConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("AIRCON_CONFIG").ok());
    match path {
        Some(path) => AppConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {}", path)),
        None => Ok(AppConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging(std::env::var("AIRCON_LOG").ok());
    let config = Arc::new(load_config()?);
    info!("[Sim] Starting aircon-sim v{}", env!("CARGO_PKG_VERSION"));

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let site = generate_site(&config, &mut rng).context("generating site")?;
    site.generate_samples(&config, SAMPLES_PER_SENSOR, SAMPLE_NOISE_STD, &mut rng)
        .context("generating samples")?;
    let store = Arc::new(site.store);

    let trainer = MultiThreadTrainer::new(config.clone(), store.clone())?;
    let models = trainer.train_all(&store.sensor_ids(), config.site.outside_temp);
    let registry = ModelRegistry::new();
    registry.register_models(models);

    let evaluator = Arc::new(Evaluator::new(config.clone(), &registry, store.as_ref()).context("building evaluator")?);
    let scheduler = Arc::new(PsoScheduler::new(config.clone(), evaluator.clone())?);

    let particles = config.pso.particle_count;
    let standard = {
        let scheduler = scheduler.clone();
        tokio::task::spawn_blocking(move || scheduler.schedule(particles, false))
    };
    let chaotic = {
        let scheduler = scheduler.clone();
        tokio::task::spawn_blocking(move || scheduler.schedule(particles, true))
    };
    let (standard, chaotic) = tokio::try_join!(standard, chaotic).context("scheduling task failed")?;

    let reports = vec![
        evaluator.report(Solution::new(SOLUTION_PSO, standard?))?,
        evaluator.report(Solution::new(SOLUTION_PSO_CHAOS, chaotic?))?,
    ];
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
