//! Feedforward models
//!
//! The feedforward term is added to the drive demand of a joint to hold it
//! against gravity. It depends only on the joint position.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A feedforward strategy, mapping a joint position to a normalised output.
pub trait FeedforwardModel {
    fn output(&self, position: f64) -> f64;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Gravity compensation models which can be selected from the parameter files.
///
/// In TOML: `gravity = { type = "Sinusoidal", k_g = 0.05, units_per_rev = 100.0, zero_offset = 0.0 }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GravityModel {
    /// No compensation, for joints with no gravity load.
    None,

    /// Constant output, for a vertical stage such as the elevator.
    Constant {
        k_g: f64
    },

    /// Output proportional to the sine of the joint angle, for a pivot. The
    /// output peaks a quarter turn away from `zero_offset`.
    Sinusoidal {
        k_g: f64,

        /// Sensor units in one full revolution of the joint
        units_per_rev: f64,

        /// Sensor position at which the gravity torque is zero
        zero_offset: f64
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<F> FeedforwardModel for F
where
    F: Fn(f64) -> f64
{
    fn output(&self, position: f64) -> f64 {
        self(position)
    }
}

impl FeedforwardModel for GravityModel {
    fn output(&self, position: f64) -> f64 {
        match *self {
            GravityModel::None => 0.0,
            GravityModel::Constant { k_g } => k_g,
            GravityModel::Sinusoidal { k_g, units_per_rev, zero_offset } => {
                k_g * (2.0 * PI * (position - zero_offset) / units_per_rev).sin()
            }
        }
    }
}

impl GravityModel {
    /// Check the model's coefficients, returning a description of the first
    /// problem found.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            GravityModel::None => Ok(()),
            GravityModel::Constant { k_g } => {
                if k_g.is_finite() {
                    Ok(())
                }
                else {
                    Err(format!("gravity k_g must be finite, got {}", k_g))
                }
            },
            GravityModel::Sinusoidal { k_g, units_per_rev, zero_offset } => {
                if !k_g.is_finite() || !zero_offset.is_finite() {
                    Err(String::from("gravity k_g and zero_offset must be finite"))
                }
                else if !units_per_rev.is_finite() || units_per_rev <= 0.0 {
                    Err(format!(
                        "gravity units_per_rev must be positive, got {}",
                        units_per_rev
                    ))
                }
                else {
                    Ok(())
                }
            }
        }
    }
}

impl Default for GravityModel {
    fn default() -> Self {
        GravityModel::None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_gravity_models() {
        assert_eq!(GravityModel::None.output(12.0), 0.0);
        assert_eq!(GravityModel::Constant { k_g: 0.07 }.output(-3.0), 0.07);

        let pivot = GravityModel::Sinusoidal {
            k_g: 0.1,
            units_per_rev: 100.0,
            zero_offset: 10.0,
        };

        assert!(approx(pivot.output(10.0), 0.0));
        assert!(approx(pivot.output(35.0), 0.1));
        assert!(approx(pivot.output(60.0), 0.0));
        assert!(approx(pivot.output(85.0), -0.1));
    }

    #[test]
    fn test_closure_model() {
        let linear = |p: f64| 0.01 * p;
        assert!(approx(linear.output(4.0), 0.04));

        let boxed: Box<dyn FeedforwardModel> = Box::new(|_: f64| 0.2);
        assert_eq!(boxed.output(100.0), 0.2);
    }

    #[test]
    fn test_validate() {
        assert!(GravityModel::None.validate().is_ok());
        assert!(GravityModel::Constant { k_g: f64::NAN }.validate().is_err());
        assert!(GravityModel::Sinusoidal {
            k_g: 0.1,
            units_per_rev: 0.0,
            zero_offset: 0.0
        }.validate().is_err());
    }

    #[test]
    fn test_parse() {
        #[derive(Deserialize)]
        struct P {
            gravity: GravityModel
        }

        let p: P = util::params::parse(
            "gravity = { type = \"Constant\", k_g = 0.03 }"
        ).unwrap();
        assert_eq!(p.gravity, GravityModel::Constant { k_g: 0.03 });

        let p: P = util::params::parse(
            "[gravity]\ntype = \"Sinusoidal\"\nk_g = 0.05\nunits_per_rev = 200.0\nzero_offset = -5.0"
        ).unwrap();
        assert_eq!(p.gravity, GravityModel::Sinusoidal {
            k_g: 0.05,
            units_per_rev: 200.0,
            zero_offset: -5.0
        });

        let p: P = util::params::parse("gravity = { type = \"None\" }").unwrap();
        assert_eq!(p.gravity, GravityModel::None);
    }
}
