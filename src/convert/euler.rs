//! Euler XYZ decomposition with rotation-continuity filtering.
//!
//! A rotation matrix has two Euler XYZ decompositions. Converting a
//! frame sequence by always taking the principal branch produces jumps
//! when the rotation sweeps past a branch boundary; seeding each
//! conversion with the previous frame's result keeps the output
//! continuous (anti-gimbal-flip).

use crate::util::{DMat3, DQuat, DVec3};

const CY_EPS: f64 = 1.0e-7;

/// Compose a quaternion from Euler XYZ angles (radians): rotation about
/// X, then Y, then Z in the fixed frame.
pub fn euler_to_quat(euler: DVec3) -> DQuat {
    DQuat::from_rotation_z(euler.z)
        * DQuat::from_rotation_y(euler.y)
        * DQuat::from_rotation_x(euler.x)
}

/// Principal Euler XYZ decomposition.
pub fn quat_to_euler(q: DQuat) -> DVec3 {
    euler_branches(q).0
}

/// Both Euler XYZ decompositions of a rotation.
///
/// Matrix layout: `m = Rz * Ry * Rx`, glam column-major, so
/// `col(0)[2] = -sin(y)`.
pub fn euler_branches(q: DQuat) -> (DVec3, DVec3) {
    let m = DMat3::from_quat(q.normalize());
    let cy = m.col(0)[0].hypot(m.col(0)[1]);

    if cy > CY_EPS {
        let e1 = DVec3::new(
            m.col(1)[2].atan2(m.col(2)[2]),
            (-m.col(0)[2]).atan2(cy),
            m.col(0)[1].atan2(m.col(0)[0]),
        );
        let e2 = DVec3::new(
            (-m.col(1)[2]).atan2(-m.col(2)[2]),
            (-m.col(0)[2]).atan2(-cy),
            (-m.col(0)[1]).atan2(-m.col(0)[0]),
        );
        (e1, e2)
    } else {
        // gimbal lock: x and z axes coincide, fold everything into x
        let e = DVec3::new(
            (-m.col(2)[1]).atan2(m.col(1)[1]),
            (-m.col(0)[2]).atan2(cy),
            0.0,
        );
        (e, e)
    }
}

/// Fold each axis of `euler` by whole turns so it lands within half a
/// turn of `reference`.
pub fn compatible_euler(euler: DVec3, reference: DVec3) -> DVec3 {
    let fold = |v: f64, r: f64| v - ((v - r) / std::f64::consts::TAU).round() * std::f64::consts::TAU;
    DVec3::new(
        fold(euler.x, reference.x),
        fold(euler.y, reference.y),
        fold(euler.z, reference.z),
    )
}

/// Decompose a quaternion into Euler XYZ, choosing the branch continuous
/// with `reference` when one is given. Without a reference the principal
/// branch is returned.
pub fn quat_to_euler_with_reference(q: DQuat, reference: Option<DVec3>) -> DVec3 {
    let (e1, e2) = euler_branches(q);
    let Some(reference) = reference else { return e1 };

    let c1 = compatible_euler(e1, reference);
    let c2 = compatible_euler(e2, reference);
    let dist = |e: DVec3| (e - reference).abs().element_sum();
    if dist(c2) < dist(c1) {
        c2
    } else {
        c1
    }
}
