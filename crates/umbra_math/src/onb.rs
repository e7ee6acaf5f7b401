use crate::Vec3;

/// Orthonormal basis with `w` as the "up" axis of a local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    /// Build a right-handed basis whose `w` axis points along `n`.
    pub fn from_w(n: Vec3) -> Self {
        let w = n.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = v.cross(w);
        Self { u, v, w }
    }

    pub fn u(&self) -> Vec3 {
        self.u
    }

    pub fn v(&self) -> Vec3 {
        self.v
    }

    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Map local coordinates `(a.x, a.y, a.z)` to world space.
    #[inline]
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u + a.y * self.v + a.z * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onb_is_orthonormal() {
        for n in [Vec3::X, Vec3::new(1.0, 2.0, 3.0), Vec3::new(-0.2, -5.0, 0.1)] {
            let onb = Onb::from_w(n);

            assert!((onb.u().length() - 1.0).abs() < 1e-12);
            assert!((onb.v().length() - 1.0).abs() < 1e-12);
            assert!(onb.u().dot(onb.v()).abs() < 1e-12);
            assert!(onb.u().dot(onb.w()).abs() < 1e-12);
            assert!(onb.v().dot(onb.w()).abs() < 1e-12);
            assert!((onb.w() - n.normalize()).length() < 1e-12);
        }
    }

    #[test]
    fn test_onb_local_maps_z_to_w() {
        let onb = Onb::from_w(Vec3::new(0.0, 3.0, 4.0));
        let mapped = onb.local(Vec3::Z);

        assert!((mapped - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-12);
    }
}
