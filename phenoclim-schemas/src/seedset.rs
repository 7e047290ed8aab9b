use serde::{Deserialize, Serialize};

/// Flower and seed-set counts of one plot in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowerPlotObservation {
    pub plot: String,
    pub year: i32,
    pub flowers: u32,
    pub seedset: u32,
}

impl FlowerPlotObservation {
    /// Percentage of flowers that set seed. A plot without flowers has 0 %.
    pub fn rel_seedset(&self) -> f64 {
        if self.flowers == 0 {
            0.0
        } else {
            f64::from(self.seedset) / f64::from(self.flowers) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(flowers: u32, seedset: u32) -> FlowerPlotObservation {
        FlowerPlotObservation {
            plot: "P1".to_string(),
            year: 2020,
            flowers,
            seedset,
        }
    }

    #[test]
    fn rel_seedset_without_flowers_is_zero() {
        assert_eq!(observation(0, 0).rel_seedset(), 0.0);
    }

    #[test]
    fn rel_seedset_is_a_percentage() {
        assert!((observation(8, 2).rel_seedset() - 25.0).abs() < 1e-12);
    }
}
