use std::array;
use std::ops::{Add, Mul};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A quantity that can be advanced by an integrator: it supports addition and
/// scaling by a time step.
pub trait State: Copy + Add<Output = Self> + Mul<f32, Output = Self> {}

impl<T> State for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> {}

/// Derivative of one state variable as a function of time and the whole state
pub type Derivative<'a, S, const N: usize> = &'a dyn Fn(f32, &[S; N]) -> S;

/// Integration methods for physics simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IntegrationMethod {
    /// Explicit Euler (simple, least stable)
    ForwardEuler,
    /// Semi-implicit Euler (stable, fast)
    SemiImplicitEuler,
    /// Classical fourth-order Runge-Kutta
    #[default]
    RungeKutta4,
}

impl IntegrationMethod {
    /// Advances `state` from `time` by `dt` using this method
    pub fn integrate<S: State, const N: usize>(
        self,
        state: &[S; N],
        time: f32,
        dt: f32,
        derivatives: &[Derivative<'_, S, N>; N],
    ) -> [S; N] {
        match self {
            IntegrationMethod::ForwardEuler => forward_euler(state, time, dt, derivatives),
            IntegrationMethod::SemiImplicitEuler => {
                semi_implicit_euler(state, time, dt, derivatives)
            }
            IntegrationMethod::RungeKutta4 => runge_kutta_4(state, time, dt, derivatives),
        }
    }
}

/// Forward Euler: every variable is advanced from the old state
pub fn forward_euler<S: State, const N: usize>(
    state: &[S; N],
    time: f32,
    dt: f32,
    derivatives: &[Derivative<'_, S, N>; N],
) -> [S; N] {
    array::from_fn(|i| state[i] + derivatives[i](time, state) * dt)
}

/// Semi-implicit Euler.
///
/// Variables are advanced from last to first, each derivative seeing the
/// already-updated later variables. For a `[position, velocity]` pair this
/// updates the velocity from the old state, then the position from the new
/// velocity.
pub fn semi_implicit_euler<S: State, const N: usize>(
    state: &[S; N],
    time: f32,
    dt: f32,
    derivatives: &[Derivative<'_, S, N>; N],
) -> [S; N] {
    let mut next = *state;
    for i in (0..N).rev() {
        next[i] = state[i] + derivatives[i](time, &next) * dt;
    }
    next
}

/// Classical fourth-order Runge-Kutta
pub fn runge_kutta_4<S: State, const N: usize>(
    state: &[S; N],
    time: f32,
    dt: f32,
    derivatives: &[Derivative<'_, S, N>; N],
) -> [S; N] {
    let half = dt * 0.5;

    let k1: [S; N] = array::from_fn(|i| derivatives[i](time, state));

    let s2: [S; N] = array::from_fn(|i| state[i] + k1[i] * half);
    let k2: [S; N] = array::from_fn(|i| derivatives[i](time + half, &s2));

    let s3: [S; N] = array::from_fn(|i| state[i] + k2[i] * half);
    let k3: [S; N] = array::from_fn(|i| derivatives[i](time + half, &s3));

    let s4: [S; N] = array::from_fn(|i| state[i] + k3[i] * dt);
    let k4: [S; N] = array::from_fn(|i| derivatives[i](time + dt, &s4));

    array::from_fn(|i| {
        let slope =
            k1[i] * (1.0 / 6.0) + k2[i] * (1.0 / 3.0) + k3[i] * (1.0 / 3.0) + k4[i] * (1.0 / 6.0);
        state[i] + slope * dt
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use approx::assert_relative_eq;

    const METHODS: [IntegrationMethod; 3] = [
        IntegrationMethod::ForwardEuler,
        IntegrationMethod::SemiImplicitEuler,
        IntegrationMethod::RungeKutta4,
    ];

    #[test]
    fn test_default_is_rk4() {
        assert_eq!(IntegrationMethod::default(), IntegrationMethod::RungeKutta4);
    }

    #[test]
    fn test_forward_euler_uses_old_state() {
        let velocity: Derivative<'_, f32, 2> = &|_, s| s[1];
        let acceleration: Derivative<'_, f32, 2> = &|_, _| 2.0;

        let [x, v] = forward_euler(&[0.0, 1.0], 0.0, 0.5, &[velocity, acceleration]);
        assert_relative_eq!(x, 0.5);
        assert_relative_eq!(v, 2.0);
    }

    #[test]
    fn test_semi_implicit_euler_uses_new_velocity() {
        let velocity: Derivative<'_, f32, 2> = &|_, s| s[1];
        let acceleration: Derivative<'_, f32, 2> = &|_, _| 2.0;

        let [x, v] = semi_implicit_euler(&[0.0, 1.0], 0.0, 0.5, &[velocity, acceleration]);
        assert_relative_eq!(v, 2.0);
        assert_relative_eq!(x, 1.0);
    }

    #[test]
    fn test_constant_velocity_is_exact() {
        let velocity: Derivative<'_, Vec3, 2> = &|_, s| s[1];
        let acceleration: Derivative<'_, Vec3, 2> = &|_, _| Vec3::ZERO;
        let start = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, -1.0, 2.0)];

        for method in METHODS {
            let mut state = start;
            for _ in 0..10 {
                state = method.integrate(&state, 0.0, 0.1, &[velocity, acceleration]);
            }
            let expected = start[0] + start[1];
            assert_relative_eq!(state[0].x, expected.x, epsilon = 1e-5);
            assert_relative_eq!(state[0].y, expected.y, epsilon = 1e-5);
            assert_relative_eq!(state[0].z, expected.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rk4_exponential_decay() {
        // dy/dt = -y, y(0) = 1
        let decay: Derivative<'_, f32, 1> = &|_, s| -s[0];
        let mut state = [1.0_f32];
        for _ in 0..10 {
            state = runge_kutta_4(&state, 0.0, 0.1, &[decay]);
        }
        assert_relative_eq!(state[0], (-1.0_f32).exp(), epsilon = 1e-5);
    }

    #[test]
    fn test_rk4_uses_time() {
        // dy/dt = t, y(0) = 0 => y(1) = 0.5
        let ramp: Derivative<'_, f32, 1> = &|t, _| t;
        let [y] = runge_kutta_4(&[0.0], 0.0, 1.0, &[ramp]);
        assert_relative_eq!(y, 0.5, epsilon = 1e-6);
    }
}
