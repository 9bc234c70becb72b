//! Parameters structure for JointCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::JointId;
use serde::{Deserialize, Serialize};

use super::{GravityModel, JointCtrlError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control law parameters of a single joint.
///
/// All positions are in the units of the joint's position sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {

    // ---- GAINS ----

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Gravity compensation model, defaults to none.
    #[serde(default)]
    pub gravity: GravityModel,

    // ---- LIMITS ----

    /// Maximum distance from the target at which the joint is at its setpoint.
    pub tolerance: f64,

    /// Highest allowed position.
    pub forward_limit: f64,

    /// Lowest allowed position.
    pub reverse_limit: f64,

    /// Supply current limit applied to the motor controller on construction.
    ///
    /// Units: amps
    pub current_limit_a: f64,
}

/// Parameters for all joints, as found in `joints.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointsParams {
    pub elevator: Params,
    pub elbow: Params,
    pub wrist: Params,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters can be used to control a joint.
    pub fn validate(&self) -> Result<(), JointCtrlError> {
        let invalid = |msg: String| Err(JointCtrlError::InvalidParams(msg));

        let finite = [
            ("k_p", self.k_p),
            ("k_i", self.k_i),
            ("k_d", self.k_d),
            ("tolerance", self.tolerance),
            ("forward_limit", self.forward_limit),
            ("reverse_limit", self.reverse_limit),
            ("current_limit_a", self.current_limit_a),
        ];
        for (name, val) in finite.iter() {
            if !val.is_finite() {
                return invalid(format!("{} must be finite, got {}", name, val));
            }
        }

        if self.reverse_limit > self.forward_limit {
            return invalid(format!(
                "reverse limit ({}) is above the forward limit ({})",
                self.reverse_limit, self.forward_limit
            ));
        }

        if self.tolerance < 0.0 {
            return invalid(format!("tolerance must not be negative, got {}", self.tolerance));
        }

        self.gravity.validate().or_else(invalid)
    }
}

impl JointsParams {
    pub fn get(&self, id: JointId) -> &Params {
        match id {
            JointId::Elevator => &self.elevator,
            JointId::Elbow => &self.elbow,
            JointId::Wrist => &self.wrist,
        }
    }
}

#[cfg(test)]
impl Params {
    /// Plain proportional parameters with limits at +/-100.
    pub(crate) fn p_only(k_p: f64) -> Self {
        Self {
            k_p,
            k_i: 0.0,
            k_d: 0.0,
            gravity: GravityModel::None,
            tolerance: 0.5,
            forward_limit: 100.0,
            reverse_limit: -100.0,
            current_limit_a: 40.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Params::p_only(0.1).validate().is_ok());

        // Equal limits pin the joint but are allowed
        let mut p = Params::p_only(0.1);
        p.forward_limit = 0.0;
        p.reverse_limit = 0.0;
        assert!(p.validate().is_ok());

        let mut p = Params::p_only(0.1);
        p.reverse_limit = 101.0;
        assert!(matches!(p.validate(), Err(JointCtrlError::InvalidParams(_))));

        let mut p = Params::p_only(0.1);
        p.tolerance = -0.1;
        assert!(p.validate().is_err());

        let mut p = Params::p_only(f64::NAN);
        assert!(p.validate().is_err());
        p.k_p = 0.1;
        p.forward_limit = f64::INFINITY;
        assert!(p.validate().is_err());

        let mut p = Params::p_only(0.1);
        p.gravity = GravityModel::Sinusoidal { k_g: 0.1, units_per_rev: -1.0, zero_offset: 0.0 };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_shipped_params() {
        let params: JointsParams = util::params::parse(
            include_str!("../../../params/joints.toml")
        ).unwrap();

        for &id in JointId::all() {
            params.get(id).validate().unwrap();
            assert_eq!(params.get(id).current_limit_a, 30.0);
        }

        assert_eq!(params.elevator.gravity, GravityModel::Constant { k_g: 0.0791015625 });
    }
}
