#[cfg(feature = "log")]
use log::LevelFilter;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};

pub fn init_logger() {
    #[cfg(feature = "log")]
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .filter(Some("beam_diagnostics"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Uncorrelated gaussian bunch around `pz = 1000` (roughly 500 MeV
/// electrons), unit weights.
pub struct SyntheticBeam {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub px: Vec<f64>,
    pub py: Vec<f64>,
    pub pz: Vec<f64>,
    pub w: Vec<f64>,
}

pub const SIGMA_X: f64 = 1e-6;
pub const SIGMA_PX: f64 = 1.0;
pub const SIGMA_Z: f64 = 2e-6;
pub const PZ_CENTER: f64 = 1000.0;

impl SyntheticBeam {
    pub fn gaussian(n: usize, seed: u64, sigma_pz: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let position = Normal::new(0.0, SIGMA_X).unwrap();
        let length = Normal::new(0.0, SIGMA_Z).unwrap();
        let transverse_momentum = Normal::new(0.0, SIGMA_PX).unwrap();
        let longitudinal_momentum = Normal::new(PZ_CENTER, sigma_pz).unwrap();

        Self {
            x: (0..n).map(|_| position.sample(&mut rng)).collect(),
            y: (0..n).map(|_| position.sample(&mut rng)).collect(),
            z: (0..n).map(|_| length.sample(&mut rng)).collect(),
            px: (0..n).map(|_| transverse_momentum.sample(&mut rng)).collect(),
            py: (0..n).map(|_| transverse_momentum.sample(&mut rng)).collect(),
            pz: (0..n)
                .map(|_| longitudinal_momentum.sample(&mut rng))
                .collect(),
            w: vec![1.0; n],
        }
    }

    /// Replaces the unit weights with weights drawn from `0.5..1.5`.
    pub fn with_random_weights(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let weight = Uniform::new(0.5, 1.5);
        self.w = (0..self.x.len()).map(|_| weight.sample(&mut rng)).collect();
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }
}
