use std::fmt::Display;

use auto_ops::{impl_op_ex, impl_op_ex_commutative};
use serde::{Deserialize, Serialize};

/// Added to `E - pz` in the rapidity denominator so a particle moving exactly along `+z` does not
/// divide by zero.
pub const RAPIDITY_EPSILON: f64 = 1e-13;
/// The value of [`Vec4::rapidity`] when it cannot be computed.
pub const RAPIDITY_SENTINEL: f64 = -100.0;

/// A three-vector, used for momenta and spatial positions (creation vertices, primary vertices).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// The $`x`$-component
    pub x: f64,
    /// The $`y`$-component
    pub y: f64,
    /// The $`z`$-component
    pub z: f64,
}

impl Vec3 {
    /// Create a new three-vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
    /// The origin.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
    /// The dot product with another three-vector.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
    /// The squared magnitude.
    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }
    /// The magnitude.
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }
    /// The magnitude of the component transverse to the $`z`$-axis.
    pub fn pt(&self) -> f64 {
        self.x.hypot(self.y)
    }
    /// Treat the three-vector as a momentum and attach an energy computed from the given mass.
    pub fn with_mass(&self, mass: f64) -> Vec4 {
        let e = (mass.powi(2) + self.mag2()).sqrt();
        Vec4::new(self.x, self.y, self.z, e)
    }
    /// Treat the three-vector as a momentum and attach the given energy.
    pub fn with_energy(&self, energy: f64) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, energy)
    }
    fn add(&self, other: &Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
    fn sub(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
    fn mul(&self, other: f64) -> Self {
        Self::new(self.x * other, self.y * other, self.z * other)
    }
    fn neg(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:6.3}, {:6.3}, {:6.3}]", self.x, self.y, self.z)
    }
}

impl_op_ex!(+ |a: &Vec3, b: &Vec3| -> Vec3 { a.add(b) });
impl_op_ex!(-|a: &Vec3, b: &Vec3| -> Vec3 { a.sub(b) });
impl_op_ex!(-|a: &Vec3| -> Vec3 { a.neg() });
impl_op_ex_commutative!(*|a: &Vec3, b: &f64| -> Vec3 { a.mul(*b) });

/// A four-momentum $`(p_x, p_y, p_z, E)`$.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    /// The $`x`$-component of the momentum
    pub x: f64,
    /// The $`y`$-component of the momentum
    pub y: f64,
    /// The $`z`$-component of the momentum
    pub z: f64,
    /// The energy
    pub t: f64,
}

impl Vec4 {
    /// Create a new four-momentum from $`(p_x, p_y, p_z, E)`$.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            x: px,
            y: py,
            z: pz,
            t: e,
        }
    }
    /// The $`x`$-component of the momentum
    pub fn px(&self) -> f64 {
        self.x
    }
    /// The $`y`$-component of the momentum
    pub fn py(&self) -> f64 {
        self.y
    }
    /// The $`z`$-component of the momentum
    pub fn pz(&self) -> f64 {
        self.z
    }
    /// The energy
    pub fn e(&self) -> f64 {
        self.t
    }
    /// The three-momentum
    pub fn vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
    /// The magnitude of the three-momentum
    pub fn p(&self) -> f64 {
        self.vec3().mag()
    }
    /// The transverse momentum
    pub fn pt(&self) -> f64 {
        self.vec3().pt()
    }
    /// The squared invariant mass
    pub fn m2(&self) -> f64 {
        self.t * self.t - self.vec3().mag2()
    }
    /// The invariant mass
    pub fn m(&self) -> f64 {
        self.m2().sqrt()
    }
    /// The rapidity $`y = \frac{1}{2}\ln\frac{E + p_z}{E - p_z + \epsilon}`$ with
    /// $`\epsilon = `$ [`RAPIDITY_EPSILON`].
    ///
    /// Returns [`RAPIDITY_SENTINEL`] when either side of the fraction vanishes, which is the case
    /// for the all-zero four-momenta some generators emit as placeholders.
    pub fn rapidity(&self) -> f64 {
        let num = self.t + self.z;
        let den = self.t - self.z + RAPIDITY_EPSILON;
        if den != 0.0 && num != 0.0 {
            0.5 * (num / den).ln()
        } else {
            RAPIDITY_SENTINEL
        }
    }
    /// The pseudorapidity $`\eta = \frac{1}{2}\ln\frac{|p| + p_z}{|p| - p_z}`$. Momenta parallel to
    /// the beam axis give $`\pm 10^{30}`$.
    pub fn eta(&self) -> f64 {
        let p = self.p();
        if p != self.z.abs() {
            0.5 * ((p + self.z) / (p - self.z)).ln()
        } else if self.z >= 0.0 {
            1e30
        } else {
            -1e30
        }
    }
    /// A compact string representation of the four-momentum.
    pub fn to_p4_string(&self) -> String {
        format!(
            "[e = {:.5}; p = ({:.5}, {:.5}, {:.5}); m = {:.5}]",
            self.t,
            self.x,
            self.y,
            self.z,
            self.m()
        )
    }
    fn add(&self, other: &Self) -> Self {
        Self::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.t + other.t,
        )
    }
    fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.t - other.t,
        )
    }
    fn neg(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.t)
    }
}

impl Display for Vec4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_p4_string())
    }
}

impl_op_ex!(+ |a: &Vec4, b: &Vec4| -> Vec4 { a.add(b) });
impl_op_ex!(-|a: &Vec4, b: &Vec4| -> Vec4 { a.sub(b) });
impl_op_ex!(-|a: &Vec4| -> Vec4 { a.neg() });

impl std::iter::Sum for Vec4 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Vec4::default(), |a, b| a + b)
    }
}
