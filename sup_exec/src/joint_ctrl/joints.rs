//! The set of joints making up the superstructure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::{JointId, MotorDriver};

use super::{JointCtrl, JointCtrlError, JointsParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One controller per superstructure joint.
pub struct Joints<D> {
    pub elevator: JointCtrl<D>,
    pub elbow: JointCtrl<D>,
    pub wrist: JointCtrl<D>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: MotorDriver> Joints<D> {
    /// Build all joint controllers, taking each driver from `make_driver`.
    ///
    /// On error the ID of the joint which failed is returned with the error.
    pub fn new<F>(
        params: &JointsParams,
        update_interval_s: f64,
        mut make_driver: F
    ) -> Result<Self, (JointId, JointCtrlError)>
    where
        F: FnMut(JointId) -> D
    {
        let mut build = |id: JointId| {
            JointCtrl::new(id, params.get(id).clone(), update_interval_s, make_driver(id))
                .map_err(|e| (id, e))
        };

        Ok(Self {
            elevator: build(JointId::Elevator)?,
            elbow: build(JointId::Elbow)?,
            wrist: build(JointId::Wrist)?,
        })
    }

    pub fn get(&self, id: JointId) -> &JointCtrl<D> {
        match id {
            JointId::Elevator => &self.elevator,
            JointId::Elbow => &self.elbow,
            JointId::Wrist => &self.wrist,
        }
    }

    pub fn get_mut(&mut self, id: JointId) -> &mut JointCtrl<D> {
        match id {
            JointId::Elevator => &mut self.elevator,
            JointId::Elbow => &mut self.elbow,
            JointId::Wrist => &mut self.wrist,
        }
    }

    /// Iterate over the joints in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &JointCtrl<D>> {
        vec![&self.elevator, &self.elbow, &self.wrist].into_iter()
    }

    /// Mutably iterate over the joints in processing order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut JointCtrl<D>> {
        vec![&mut self.elevator, &mut self.elbow, &mut self.wrist].into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{joint_ctrl::Params, sim_mech::SimMotor};

    fn params() -> JointsParams {
        JointsParams {
            elevator: Params::p_only(0.1),
            elbow: Params::p_only(0.2),
            wrist: Params::p_only(0.3),
        }
    }

    #[test]
    fn test_new() {
        let mut built = Vec::new();
        let joints = Joints::new(&params(), 0.05, |id| {
            built.push(id);
            SimMotor::new(10.0)
        }).unwrap();

        assert_eq!(built, JointId::all().to_vec());

        let ids: Vec<JointId> = joints.iter().map(|j| j.id()).collect();
        assert_eq!(ids, built);
        assert_eq!(joints.get(JointId::Wrist).params().k_p, 0.3);
    }

    #[test]
    fn test_new_reports_failed_joint() {
        let mut p = params();
        p.elbow.tolerance = -1.0;

        match Joints::new(&p, 0.05, |_| SimMotor::new(10.0)) {
            Err((JointId::Elbow, JointCtrlError::InvalidParams(_))) => (),
            Err((id, e)) => panic!("Expected the elbow to fail, got {}: {}", id, e),
            Ok(_) => panic!("Expected the elbow to fail"),
        }
    }

    #[test]
    fn test_get_mut() {
        let mut joints = Joints::new(&params(), 0.05, |_| SimMotor::new(10.0)).unwrap();

        joints.get_mut(JointId::Elbow).set_desired_position(12.0);
        for j in joints.iter_mut() {
            j.adjust_offset(1.0);
        }

        assert_eq!(joints.elbow.target(), 13.0);
        assert_eq!(joints.elevator.target(), 1.0);
    }
}
