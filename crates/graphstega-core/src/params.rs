//! Engine parameters and presets.
//!
//! All knobs are instance state on [`Parameters`]; nothing is process-global.
//! Range clamping is centralised in [`ParametersBuilder::build`] so the rest
//! of the engine can rely on every value being in range.

use serde::Serialize;

/// Default permutation seed.
pub const DEFAULT_SEED: u64 = 42;

/// Tuning parameters for one embed or extract call.
///
/// Construct via [`Parameters::builder`] or a [`Preset`]; every field is
/// clamped into its documented range at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Parameters {
    samples_per_vertex: u8,
    message_bits_per_vertex: u8,
    distance_max: u8,
    /// Stored as the right-shift exponent; the public surface is the quantum.
    distance_precision: u8,
    vertices_per_matching: usize,
    reserve_matching: u8,
    seed: u64,
}

impl Parameters {
    /// Start a builder pre-populated with the default preset.
    #[must_use]
    pub fn builder() -> ParametersBuilder {
        Preset::Default.builder()
    }

    /// Number of samples aggregated per vertex (`1..=4`).
    #[must_use]
    pub const fn samples_per_vertex(&self) -> usize {
        self.samples_per_vertex as usize
    }

    /// Payload bits carried per vertex (1, 2 or 4).
    #[must_use]
    pub const fn message_bits_per_vertex(&self) -> u8 {
        self.message_bits_per_vertex
    }

    /// `2^bits`, the modulus of all mod-value arithmetic.
    #[must_use]
    pub const fn mod_factor(&self) -> u8 {
        1 << self.message_bits_per_vertex
    }

    /// `mod_factor - 1`, the AND mask implementing the modulus.
    #[must_use]
    pub const fn mask(&self) -> u8 {
        self.mod_factor() - 1
    }

    /// Maximum per-channel Chebyshev distance for an edge to be valid (`2..=128`).
    #[must_use]
    pub const fn distance_max(&self) -> u8 {
        self.distance_max
    }

    /// Colour quantisation step, a power of two in `{1, 2, 4, 8, 16, 32}`.
    #[must_use]
    pub const fn quantum(&self) -> u8 {
        1 << self.distance_precision
    }

    /// Right-shift applied to colour channels and `distance_max` when bucketising.
    #[must_use]
    pub(crate) const fn precision_shift(&self) -> u8 {
        self.distance_precision
    }

    /// Batch size of the matching loop (`>= 10_000`).
    #[must_use]
    pub const fn vertices_per_matching(&self) -> usize {
        self.vertices_per_matching
    }

    /// Maximum number of reserve-matching passes (`0..=8`).
    #[must_use]
    pub const fn reserve_matching(&self) -> u8 {
        self.reserve_matching
    }

    /// Seed of the pseudo-random sample permutation.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Preset::Default.parameters()
    }
}

/// Builder for [`Parameters`]; out-of-range inputs are clamped, not rejected.
#[derive(Debug, Clone, Copy)]
pub struct ParametersBuilder {
    samples_per_vertex: u8,
    message_bits_per_vertex: u8,
    distance_max: u8,
    quantum: u8,
    vertices_per_matching: usize,
    reserve_matching: u8,
    seed: u64,
}

impl ParametersBuilder {
    #[must_use]
    pub fn samples_per_vertex(mut self, s: u8) -> Self {
        self.samples_per_vertex = s;
        self
    }

    #[must_use]
    pub fn message_bits_per_vertex(mut self, b: u8) -> Self {
        self.message_bits_per_vertex = b;
        self
    }

    #[must_use]
    pub fn distance_max(mut self, d: u8) -> Self {
        self.distance_max = d;
        self
    }

    /// Colour quantisation step. Values that are not a power of two are
    /// rounded down to the previous one.
    #[must_use]
    pub fn quantum(mut self, q: u8) -> Self {
        self.quantum = q;
        self
    }

    #[must_use]
    pub fn vertices_per_matching(mut self, v: usize) -> Self {
        self.vertices_per_matching = v;
        self
    }

    #[must_use]
    pub fn reserve_matching(mut self, passes: u8) -> Self {
        self.reserve_matching = passes;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Clamp every knob into its documented range and freeze the result.
    #[must_use]
    pub fn build(self) -> Parameters {
        let bits = match self.message_bits_per_vertex {
            0..=1 => 1,
            2..=3 => 2,
            _ => 4,
        };
        // Quantum is clamped to {1..32} then rounded down to a power of two;
        // ilog2 of the clamped value is the stored shift exponent.
        let quantum = self.quantum.clamp(1, 32) as u32;
        Parameters {
            samples_per_vertex: self.samples_per_vertex.clamp(1, 4),
            message_bits_per_vertex: bits,
            distance_max: self.distance_max.clamp(2, 128),
            distance_precision: quantum.ilog2() as u8,
            vertices_per_matching: self.vertices_per_matching.max(10_000),
            reserve_matching: self.reserve_matching.min(8),
            seed: self.seed,
        }
    }
}

/// Named parameter bundles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Balanced quality and speed.
    #[default]
    Default,
    /// Smaller per-sample perturbation at the cost of capacity and speed.
    Imperceptibility,
    /// Larger batches and chunks for throughput.
    Performance,
}

impl Preset {
    /// Parse from string (case-insensitive, loose aliases).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "balanced" => Some(Self::Default),
            "imperceptibility" | "stealth" | "quality" => Some(Self::Imperceptibility),
            "performance" | "fast" | "speed" => Some(Self::Performance),
            _ => None,
        }
    }

    /// Builder seeded with this preset's values.
    #[must_use]
    pub fn builder(self) -> ParametersBuilder {
        let (s, bits, d, quantum, vpm, reserve) = match self {
            Self::Default => (2, 2, 8, 4, 50_000, 1),
            Self::Imperceptibility => (4, 1, 4, 2, 50_000, 2),
            Self::Performance => (1, 4, 16, 8, 150_000, 1),
        };
        ParametersBuilder {
            samples_per_vertex: s,
            message_bits_per_vertex: bits,
            distance_max: d,
            quantum,
            vertices_per_matching: vpm,
            reserve_matching: reserve,
            seed: DEFAULT_SEED,
        }
    }

    /// The preset's parameters, unmodified.
    #[must_use]
    pub fn parameters(self) -> Parameters {
        self.builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_values() {
        let p = Parameters::default();
        assert_eq!(p.samples_per_vertex(), 2);
        assert_eq!(p.message_bits_per_vertex(), 2);
        assert_eq!(p.mod_factor(), 4);
        assert_eq!(p.mask(), 3);
        assert_eq!(p.distance_max(), 8);
        assert_eq!(p.quantum(), 4);
        assert_eq!(p.vertices_per_matching(), 50_000);
        assert_eq!(p.reserve_matching(), 1);
        assert_eq!(p.seed(), 42);
    }

    #[test]
    fn test_clamping_is_centralised_in_build() {
        let p = Parameters::builder()
            .samples_per_vertex(9)
            .message_bits_per_vertex(3)
            .distance_max(1)
            .quantum(33)
            .vertices_per_matching(5)
            .reserve_matching(200)
            .build();
        assert_eq!(p.samples_per_vertex(), 4);
        assert_eq!(p.message_bits_per_vertex(), 2);
        assert_eq!(p.distance_max(), 2);
        assert_eq!(p.quantum(), 32);
        assert_eq!(p.vertices_per_matching(), 10_000);
        assert_eq!(p.reserve_matching(), 8);
    }

    #[test]
    fn test_quantum_rounds_down_to_power_of_two() {
        for (input, expected) in [(1, 1), (2, 2), (3, 2), (5, 4), (8, 8), (31, 16), (32, 32)] {
            let p = Parameters::builder().quantum(input).build();
            assert_eq!(p.quantum(), expected, "quantum({input})");
        }
    }

    #[test]
    fn test_bits_round_down_to_power_of_two() {
        for (input, expected) in [(0, 1), (1, 1), (2, 2), (3, 2), (4, 4), (200, 4)] {
            let p = Parameters::builder().message_bits_per_vertex(input).build();
            assert_eq!(p.message_bits_per_vertex(), expected, "bits({input})");
        }
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str_loose("default"), Some(Preset::Default));
        assert_eq!(Preset::from_str_loose("BALANCED"), Some(Preset::Default));
        assert_eq!(
            Preset::from_str_loose("stealth"),
            Some(Preset::Imperceptibility)
        );
        assert_eq!(Preset::from_str_loose("fast"), Some(Preset::Performance));
        assert_eq!(Preset::from_str_loose("bogus"), None);
    }

    #[test]
    fn test_performance_preset() {
        let p = Preset::Performance.parameters();
        assert_eq!(p.samples_per_vertex(), 1);
        assert_eq!(p.mod_factor(), 16);
        assert_eq!(p.vertices_per_matching(), 150_000);
    }
}
