//! Atmospheric drag from resolved NRLMSISE-00 density
//!
//! Acceleration in the Earth-fixed frame:
//!
//! a = -½ ρ |v| v (Cd × A / m)
//!
//! with ρ in kg/m³, v in km/s, A in m² and m in kg. The result is in km/s²,
//! which folds a factor of 1000 into the ½: a = -500 (Cd A / m) ρ |v| v.

use crate::atmosphere::{AtmosphereDensity, DragDensityResolver, GeodeticPosition};
use crate::epoch::Epoch;
use crate::errors::ResolveResult;
use nalgebra::Vector3;

/// ½ with the m → km conversion of the result
const HALF_KM_PER_M: f64 = 500.0;

/// Drag acceleration (km/s²) for a density (kg/m³), velocity (km/s) and Cd·A/m (m²/kg)
pub fn drag_acceleration(rho: f64, velocity: &Vector3<f64>, cd_area_over_mass: f64) -> Vector3<f64> {
    velocity.scale(-HALF_KM_PER_M * cd_area_over_mass * rho * velocity.norm())
}

/// Where the spacecraft is, and how fast it moves through the atmosphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub epoch: Epoch,
    pub geodetic: GeodeticPosition,
    /// Earth-fixed velocity, km/s
    pub ecef_velocity: Vector3<f64>,
}

/// Result of one drag evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAcceleration {
    /// km/s², Earth-fixed
    pub acceleration: Vector3<f64>,
    /// Density the acceleration was computed from
    pub density: AtmosphereDensity,
}

/// Drag force backed by a [`DragDensityResolver`]
pub struct AtmosphericDrag {
    resolver: DragDensityResolver,

    /// Cd × A / m, m²/kg
    cd_area_over_mass: f64,

    enabled: bool,
}

impl AtmosphericDrag {
    /// Drag with a precomputed Cd·A/m, m²/kg
    pub fn new(resolver: DragDensityResolver, cd_area_over_mass: f64) -> Self {
        Self {
            resolver,
            cd_area_over_mass,
            enabled: true,
        }
    }

    /// Build from drag coefficient, cross-section (m²) and mass (kg)
    pub fn from_properties(resolver: DragDensityResolver, cd: f64, area_m2: f64, mass_kg: f64) -> Self {
        Self::new(resolver, cd * area_m2 / mass_kg)
    }

    /// Switch drag on or off without dropping the resolver
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether drag is currently applied
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Cd·A/m, m²/kg
    pub fn cd_area_over_mass(&self) -> f64 {
        self.cd_area_over_mass
    }

    /// Resolver used for each density
    pub fn resolver(&self) -> &DragDensityResolver {
        &self.resolver
    }

    /// Resolve density at the state and compute the drag acceleration
    ///
    /// Disabled drag returns zero acceleration without running the model.
    /// Low altitudes are reported through the resolver's diagnostics and
    /// still computed.
    pub fn compute_acceleration(&self, state: &DragState) -> ResolveResult<Option<DragAcceleration>> {
        if !self.enabled {
            return Ok(None);
        }

        let density = self
            .resolver
            .resolve_epoch(&state.epoch, &state.geodetic)?
            .density;
        let acceleration = drag_acceleration(density.rho, &state.ecef_velocity, self.cd_area_over_mass);

        log::debug!(
            "Drag at {} km: rho={:e} kg/m³ |a|={:e} km/s²",
            state.geodetic.altitude_km,
            density.rho,
            acceleration.norm()
        );

        Ok(Some(DragAcceleration {
            acceleration,
            density,
        }))
    }
}
