use std::collections::{BTreeMap, HashMap};

use ndarray::Array1;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

use crate::align::AlignmentPolicy;
use crate::error::{CoreError, Result};
use crate::records::{DatasetSnapshot, EmissionRecord, Species};

/// Provinces, territories and the national aggregate, as shown on the map.
pub const REGIONS: [&str; 14] = [
    "Alberta",
    "British Columbia",
    "Manitoba",
    "New Brunswick",
    "Newfoundland and Labrador",
    "Northwest Territories",
    "Nova Scotia",
    "Nunavut",
    "Ontario",
    "Prince Edward Island",
    "Quebec",
    "Saskatchewan",
    "Yukon",
    "Canada",
];

/// Share of a region's emissions contributed by each gas, in `Gas::ALL` order.
const GAS_SHARES: [f64; 7] = [0.78, 0.13, 0.05, 0.025, 0.008, 0.005, 0.002];

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticParams {
    /// Standard deviation of the noise, relative to each value.
    pub noise: f64,
    /// First year of bird data.
    pub bird_start: i32,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            noise: 0.03,
            bird_start: 1970,
        }
    }
}

/// Datasets in the shape the core receives them from its caller.
#[derive(Debug, Clone)]
pub struct RawDatasets {
    pub emissions: HashMap<String, Vec<EmissionRecord>>,
    pub birds: BTreeMap<i32, Vec<String>>,
}

impl RawDatasets {
    pub fn snapshot(&self) -> Result<DatasetSnapshot> {
        DatasetSnapshot::from_raw(&self.emissions, &self.birds)
    }
}

/// Generates reproducible emission and bird datasets.
///
/// Each region's records start at the policy's start year for that region and
/// end at the policy's end year; bird rows cover `bird_start..=end`.
pub fn generate(
    params: &SyntheticParams,
    policy: &AlignmentPolicy,
    seed: u64,
) -> Result<RawDatasets> {
    let normal = Normal::new(0.0, params.noise)
        .map_err(|e| CoreError::Config(format!("noise {}: {e}", params.noise)))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut emissions = HashMap::new();
    for (r, &region) in REGIONS.iter().enumerate() {
        let first = policy.start_year(region);
        let n = (policy.end - first + 1).max(0) as usize;
        let scale = 2_000.0 * (r as f64 + 1.0);

        // One noise path per gas.
        let noise: Vec<Array1<f64>> = (0..GAS_SHARES.len())
            .map(|_| Array1::random_using(n, normal, &mut rng))
            .collect();

        let records = (0..n)
            .map(|i| {
                let year = first + i as i32;
                let t = (year - policy.default_start) as f64;
                let mut gases = [0.0; 7];
                for (g, share) in GAS_SHARES.iter().enumerate() {
                    let shape = gas_trend(g, t);
                    gases[g] = (scale * share * shape * (1.0 + noise[g][i])).max(0.0);
                }
                EmissionRecord {
                    year,
                    region: region.to_string(),
                    co2: gases[0],
                    ch4: gases[1],
                    n2o: gases[2],
                    hfc: gases[3],
                    pfc: gases[4],
                    sf6: gases[5],
                    nf3: gases[6],
                    total: gases.iter().sum(),
                }
            })
            .collect();
        emissions.insert(region.to_string(), records);
    }

    let years = (policy.end - params.bird_start + 1).max(0) as usize;
    let mut birds: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    let columns: Vec<Array1<f64>> = Species::ALL
        .iter()
        .map(|_| Array1::random_using(years, normal, &mut rng))
        .collect();
    for i in 0..years {
        let year = params.bird_start + i as i32;
        let t = (year - params.bird_start) as f64;
        let row = Species::ALL
            .iter()
            .map(|species| {
                let drift = 1.5 - 0.4 * species.index() as f64;
                let change = drift * t + 100.0 * columns[species.index()][i];
                format!("{change:.2}")
            })
            .collect();
        birds.insert(year, row);
    }

    Ok(RawDatasets { emissions, birds })
}

/// Relative level of gas `g` after `t` years.
fn gas_trend(g: usize, t: f64) -> f64 {
    match g {
        0 => 1.0 + 0.012 * t,
        1 => 1.0 + 0.0004 * t * t,
        2 => 1.0 + 0.1 * (0.5 * t).sin(),
        3 => 0.2 + 0.06 * t,
        4 => (1.0 - 0.025 * t).max(0.3),
        5 => 1.0 + 0.08 * (0.3 * t).cos(),
        _ => 0.5 + 0.5 * (0.05 * t).exp() - 0.3 * (0.9 * t).sin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_reproducible() {
        let policy = AlignmentPolicy::default();
        let a = generate(&SyntheticParams::default(), &policy, 7).unwrap();
        let b = generate(&SyntheticParams::default(), &policy, 7).unwrap();
        assert_eq!(a.emissions["Alberta"], b.emissions["Alberta"]);
        assert_eq!(a.birds, b.birds);
    }

    #[test]
    fn test_regions_follow_policy_start_years() {
        let policy = AlignmentPolicy::default();
        let raw = generate(&SyntheticParams::default(), &policy, 1).unwrap();
        assert_eq!(raw.emissions.len(), REGIONS.len());
        assert_eq!(raw.emissions["Nunavut"].len(), 18);
        assert_eq!(raw.emissions["Nunavut"][0].year, 1999);
        assert_eq!(raw.emissions["Ontario"].len(), 27);
        assert_eq!(raw.birds.len(), 47);
        assert!(raw.birds.values().all(|row| row.len() == 9));

        let record = &raw.emissions["Quebec"][3];
        let sum: f64 = record.columns()[..7].iter().sum();
        assert!((record.total - sum).abs() < 1e-9);
        assert!(raw.snapshot().is_ok());
    }

    #[test]
    fn test_negative_noise_rejected() {
        let params = SyntheticParams {
            noise: -1.0,
            ..SyntheticParams::default()
        };
        assert!(matches!(
            generate(&params, &AlignmentPolicy::default(), 0),
            Err(CoreError::Config(_))
        ));
    }
}
