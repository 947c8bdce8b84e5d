//! Global configuration constants and the tunable simulation parameters.

use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Default gravity vector (screen space, Y grows downward).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, 1000.0];

/// Default integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Number of impulse iterations performed per frame.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 8;

/// Coulomb-style friction coefficient shared by every contact.
pub const DEFAULT_FRICTION: f32 = 0.2;

/// Fraction of accumulated penetration corrected per second of `1/dt`.
pub const DEFAULT_BIAS_FACTOR: f32 = 0.2;

/// Decay applied to a contact's accumulated penetration each frame.
pub const DEFAULT_PENETRATION_DECAY: f32 = 0.5;

/// Gap under which two atoms keep (or start) a contact.
pub const DEFAULT_PERSISTENCE_MARGIN: f32 = 1.0;

/// Ceiling on a single normal impulse step.
pub const DEFAULT_MAX_IMPULSE: f32 = 1.0e6;

/// Radius used by builders that do not specify one.
pub const DEFAULT_ATOM_RADIUS: f32 = 8.0;

/// Default cell size for the broad-phase uniform grid (one atom diameter).
pub const DEFAULT_GRID_CELL_SIZE: f32 = 2.0 * DEFAULT_ATOM_RADIUS;

/// Default grid extent in cells.
pub const DEFAULT_GRID_WIDTH: usize = 100;
pub const DEFAULT_GRID_HEIGHT: usize = 60;

/// Impulse added in one frame above which an impact sound is requested.
pub const DEFAULT_IMPACT_LOUDNESS: f32 = 400.0;

/// Resolved normal impulse that breaks a recently split body.
pub const DEFAULT_BREAK_THRESHOLD: f32 = 5000.0;

/// Resolved normal impulse that breaks a body outside its cooldown.
pub const DEFAULT_FRAGILE_THRESHOLD: f32 = 2500.0;

/// Frames a freshly split body (and its fragment) stays on the higher threshold.
pub const DEFAULT_FRACTURE_COOLDOWN: u32 = 30;

/// Frame time above which a warning is logged.
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 16.0;

/// Broad-phase grid extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: f32,
    pub width: usize,
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_GRID_CELL_SIZE,
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        }
    }
}

/// Impulse thresholds that split bodies apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractureConfig {
    pub enabled: bool,
    pub break_threshold: f32,
    pub fragile_threshold: f32,
    pub cooldown_frames: u32,
}

impl Default for FractureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            break_threshold: DEFAULT_BREAK_THRESHOLD,
            fragile_threshold: DEFAULT_FRAGILE_THRESHOLD,
            cooldown_frames: DEFAULT_FRACTURE_COOLDOWN,
        }
    }
}

/// Every tunable of the simulation. Missing JSON fields fall back to the
/// defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub gravity: Vec2,
    pub time_step: f32,
    pub solver_iterations: u32,
    pub friction: f32,
    pub bias_factor: f32,
    pub penetration_decay: f32,
    pub persistence_margin: f32,
    pub max_impulse: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub impact_loudness: f32,
    pub frame_budget_ms: f32,
    pub grid: GridConfig,
    pub fracture: FractureConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::from_array(DEFAULT_GRAVITY),
            time_step: DEFAULT_TIME_STEP,
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            friction: DEFAULT_FRICTION,
            bias_factor: DEFAULT_BIAS_FACTOR,
            penetration_decay: DEFAULT_PENETRATION_DECAY,
            persistence_margin: DEFAULT_PERSISTENCE_MARGIN,
            max_impulse: DEFAULT_MAX_IMPULSE,
            linear_damping: 0.0,
            angular_damping: 0.0,
            impact_loudness: DEFAULT_IMPACT_LOUDNESS,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
            grid: GridConfig::default(),
            fracture: FractureConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_grid(mut self, cell_size: f32, width: usize, height: usize) -> Self {
        self.grid = GridConfig {
            cell_size,
            width,
            height,
        };
        self
    }

    pub fn with_solver_iterations(mut self, iterations: u32) -> Self {
        self.solver_iterations = iterations;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn without_fracture(mut self) -> Self {
        self.fracture.enabled = false;
        self
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(PhysicsError::InvalidConfig(msg))
        }

        if !self.gravity.is_finite() {
            return invalid(format!("gravity must be finite, got {}", self.gravity));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return invalid(format!("time_step must be > 0, got {}", self.time_step));
        }
        if self.solver_iterations == 0 {
            return invalid("solver_iterations must be at least 1".into());
        }
        if !(self.friction >= 0.0) {
            return invalid(format!("friction must be >= 0, got {}", self.friction));
        }
        if !(0.0..=1.0).contains(&self.bias_factor) {
            return invalid(format!("bias_factor must be in [0, 1], got {}", self.bias_factor));
        }
        if !(0.0..1.0).contains(&self.penetration_decay) {
            return invalid(format!(
                "penetration_decay must be in [0, 1), got {}",
                self.penetration_decay
            ));
        }
        if !(self.persistence_margin >= 0.0) {
            return invalid(format!(
                "persistence_margin must be >= 0, got {}",
                self.persistence_margin
            ));
        }
        if !(self.max_impulse > 0.0) {
            return invalid(format!("max_impulse must be > 0, got {}", self.max_impulse));
        }
        if !(self.linear_damping >= 0.0 && self.angular_damping >= 0.0) {
            return invalid("damping must be >= 0".into());
        }
        if !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0) {
            return invalid(format!("grid cell_size must be > 0, got {}", self.grid.cell_size));
        }
        if self.grid.width == 0 || self.grid.height == 0 {
            return invalid(format!(
                "grid must have at least one cell, got {}x{}",
                self.grid.width, self.grid.height
            ));
        }
        let fracture = &self.fracture;
        if !(fracture.fragile_threshold > 0.0 && fracture.break_threshold > 0.0) {
            return invalid("fracture thresholds must be > 0".into());
        }
        if fracture.fragile_threshold > fracture.break_threshold {
            warn!(
                "fragile_threshold {} is above break_threshold {}; fragments will break first",
                fracture.fragile_threshold, fracture.break_threshold
            );
        }
        Ok(())
    }
}
