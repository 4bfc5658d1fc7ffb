//! Synthetic site and sample generation
//!
//! Lays out users, sensors and air-conditioning units uniformly in the site
//! area and simulates what each sensor would read for a given power vector.

use super::InMemoryDataStore;
use crate::core::config::AppConfig;
use crate::core::error::{AirconError, Result};
use crate::domain::{ComfortFunction, GeoPoint, TempRange, TrainingSample};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::info;

/// Width of every generated comfort range, in degrees
const COMFORT_WIDTH: f32 = 4.0;
/// Comfort range centres are drawn from this interval
const COMFORT_CENTRE_RANGE: (f32, f32) = (22.0, 27.0);
/// Distance (metres) at which a unit's effect halves
const ATTENUATION_DISTANCE: f32 = 8.0;

/// A generated site: populated store plus the unit layout used to simulate readings
#[derive(Debug)]
pub struct SyntheticSite {
    pub store: InMemoryDataStore,
    pub unit_locations: Vec<GeoPoint>,
}

fn random_point<R: Rng + ?Sized>(config: &AppConfig, rng: &mut R) -> GeoPoint {
    GeoPoint::new(
        rng.gen::<f32>() * config.site.area_length,
        rng.gen::<f32>() * config.site.area_width,
    )
}

/// Places users, sensors and units uniformly over the area.
pub fn generate_site<R: Rng + ?Sized>(config: &AppConfig, rng: &mut R) -> Result<SyntheticSite> {
    let site = &config.site;
    let store = InMemoryDataStore::new(site.max_distance);

    for i in 0..site.user_count {
        let centre = rng.gen_range(COMFORT_CENTRE_RANGE.0..COMFORT_CENTRE_RANGE.1);
        let half = COMFORT_WIDTH / 2.0;
        let range = TempRange::new(centre - half, centre + half)?;
        let comfort = ComfortFunction::new(format!("user_{}", i), range, config.comfort.min_value)?;
        store.add_user(random_point(config, rng), comfort);
    }
    for i in 0..site.sensor_count {
        store.add_sensor(format!("sensor_{}", i), random_point(config, rng));
    }
    let unit_locations = (0..site.unit_count)
        .map(|_| random_point(config, rng))
        .collect();

    info!(
        "[Synthetic] Generated site with {} users, {} sensors, {} units",
        site.user_count, site.sensor_count, site.unit_count
    );
    Ok(SyntheticSite {
        store,
        unit_locations,
    })
}

impl SyntheticSite {
    /// Noise-free temperature a sensor at `location` would read.
    ///
    /// Each unit lowers the temperature by `sqrt(power)`, attenuated by
    /// distance. Several units do not simply add up: the strongest effect
    /// dominates, pulled toward the mean when the spread is large.
    pub fn sensor_temperature(&self, config: &AppConfig, location: GeoPoint, powers: &[f32]) -> Result<f32> {
        AirconError::check_len(self.unit_locations.len(), powers.len())?;
        let effects: Vec<f32> = self
            .unit_locations
            .iter()
            .zip(powers)
            .map(|(unit, &power)| {
                let utility = power.max(0.0).sqrt();
                ATTENUATION_DISTANCE * utility / (location.distance(unit) + ATTENUATION_DISTANCE)
            })
            .collect();

        let max = effects.iter().copied().fold(f32::MIN, f32::max);
        let mean = effects.iter().sum::<f32>() / effects.len() as f32;
        let spread = max - mean;
        let combined = if spread >= 1.0 {
            max - spread.powf(0.25) + 1.0
        } else {
            max
        };
        Ok(config.site.outside_temp - combined)
    }

    /// Draws `per_sensor` random power vectors for every sensor and stores
    /// the noisy readings at the configured outside temperature.
    pub fn generate_samples<R: Rng + ?Sized>(
        &self,
        config: &AppConfig,
        per_sensor: usize,
        noise_std: f32,
        rng: &mut R,
    ) -> Result<usize> {
        let Ok(noise) = Normal::new(0.0f32, noise_std) else {
            return Err(AirconError::config(format!("invalid noise std {}", noise_std)));
        };
        let site = &config.site;
        let mut samples = Vec::new();

        for sensor_id in super::UserGeoSource::sensor_ids(&self.store) {
            let Some(location) = self.store.sensor_location(&sensor_id) else {
                continue;
            };
            for _ in 0..per_sensor {
                let powers: Vec<f32> = (0..site.unit_count)
                    .map(|_| rng.gen_range(site.min_power..=site.max_power))
                    .collect();
                let clean = self.sensor_temperature(config, location, &powers)?;
                let reading = (clean + noise.sample(rng)).clamp(site.min_temp, site.max_temp);
                samples.push(TrainingSample::new(
                    sensor_id.clone(),
                    powers,
                    reading,
                    site.outside_temp,
                ));
            }
        }

        let count = samples.len();
        self.store.add_samples(samples);
        info!(
            "[Synthetic] Generated {} samples at outside temp {:.1}",
            count, site.outside_temp
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{TrainingDataSource, UserGeoSource};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn site_has_configured_population() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let site = generate_site(&config, &mut rng).unwrap();
        assert_eq!(site.store.user_comfort_functions().len(), 16);
        assert_eq!(site.store.sensor_ids().len(), 10);
        assert_eq!(site.unit_locations.len(), 8);
        for comfort in site.store.user_comfort_functions().values() {
            let range = comfort.range();
            assert!((range.to - range.from - 4.0).abs() < 1e-4);
            assert!(range.midpoint() >= 22.0 && range.midpoint() <= 27.0);
        }
    }

    #[test]
    fn more_power_means_cooler_readings() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let site = generate_site(&config, &mut rng).unwrap();
        let here = GeoPoint::new(5.0, 5.0);
        let off = site.sensor_temperature(&config, here, &[0.0; 8]).unwrap();
        let low = site.sensor_temperature(&config, here, &[50.0; 8]).unwrap();
        let high = site.sensor_temperature(&config, here, &[400.0; 8]).unwrap();
        assert_eq!(off, 35.0);
        assert!(low < off);
        assert!(high < low);
    }

    #[test]
    fn samples_land_in_store_within_temp_bounds() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(21);
        let site = generate_site(&config, &mut rng).unwrap();
        let count = site.generate_samples(&config, 12, 0.5, &mut rng).unwrap();
        assert_eq!(count, 120);

        let samples = site.store.fetch_samples_by_sensor_id("sensor_3", 35.0).unwrap();
        assert_eq!(samples.len(), 12);
        for sample in samples {
            assert_eq!(sample.features.len(), 8);
            assert!((15.0..=35.0).contains(&sample.target_temperature));
        }
    }

    #[test]
    fn wrong_power_length_is_rejected() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let site = generate_site(&config, &mut rng).unwrap();
        assert!(site
            .sensor_temperature(&config, GeoPoint::new(0.0, 0.0), &[1.0; 3])
            .is_err());
    }
}
