//! Cloud layer: a diffusing density field with a damped random-walk
//! velocity field.
//!
//! Velocities are perturbed and damped every step but never displace
//! the density field; they are published for observers only.

use crate::grid::Grid;
use crate::rng::SimRng;

/// Moisture injected into the field spreads this many cells out.
const MOISTURE_SPREAD: i32 = 2;
/// Velocity damping applied every step.
const VELOCITY_DAMPING: f32 = 0.98;

#[derive(Debug, Clone, PartialEq)]
pub struct CloudField {
    density: Grid<f32>,
    velocity_x: Grid<f32>,
    velocity_y: Grid<f32>,
}

impl CloudField {
    /// Seed a fresh field. `density_param` is the 0..=10 tunable; the
    /// initial per-cell density is uniform in `[0, density_param/10)`.
    pub fn generate(width: usize, height: usize, density_param: f32, rng: &mut SimRng) -> Self {
        let mut density = Grid::fill(width, height, 0.0f32);
        let mut velocity_x = Grid::fill(width, height, 0.0f32);
        let mut velocity_y = Grid::fill(width, height, 0.0f32);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                density.set(x, y, rng.uniform(0.0, density_param / 10.0));
                velocity_x.set(x, y, rng.uniform(-0.05, 0.05));
                velocity_y.set(x, y, rng.uniform(-0.05, 0.05));
            }
        }
        Self {
            density,
            velocity_x,
            velocity_y,
        }
    }

    pub fn from_parts(density: Grid<f32>, velocity_x: Grid<f32>, velocity_y: Grid<f32>) -> Self {
        Self {
            density,
            velocity_x,
            velocity_y,
        }
    }

    pub fn width(&self) -> usize {
        self.density.width()
    }

    pub fn height(&self) -> usize {
        self.density.height()
    }

    pub fn density(&self) -> &Grid<f32> {
        &self.density
    }

    pub fn velocity_x(&self) -> &Grid<f32> {
        &self.velocity_x
    }

    pub fn velocity_y(&self) -> &Grid<f32> {
        &self.velocity_y
    }

    pub fn density_at(&self, x: i32, y: i32) -> f32 {
        self.density.at(x, y)
    }

    /// Fractional light attenuation overhead; clouds block at most
    /// half the light. Zero outside the grid.
    pub fn shadow_at(&self, x: i32, y: i32) -> f32 {
        self.density.at(x, y) * 0.5
    }

    /// One diffusion step. Skipped entirely when the speed tunable is
    /// zero. The new field is computed wholly from the old one before
    /// being swapped in.
    pub fn step(&mut self, cloud_speed: f32, rng: &mut SimRng) {
        if cloud_speed == 0.0 {
            return;
        }

        let width = self.width() as i32;
        let height = self.height() as i32;
        let mut next = self.density.clone();

        for y in 0..height {
            for x in 0..width {
                // Neighborhood average; the centre cell is counted
                // once up front and once more in the 3x3 sweep, so it
                // carries double weight.
                let mut sum = self.density.at(x, y);
                let mut count = 1u32;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (x + dx, y + dy);
                        if self.density.in_bounds(nx, ny) {
                            sum += self.density.at(nx, ny);
                            count += 1;
                        }
                    }
                }
                let average = sum / count as f32;

                let noise = rng.uniform(-0.005, 0.005);
                next.set(x, y, (average + noise).clamp(0.0, 1.0));

                // Velocities wander and decay; they never advect the
                // density field.
                let vx = (self.velocity_x.at(x, y) + rng.uniform(-0.01, 0.01)) * VELOCITY_DAMPING;
                let vy = (self.velocity_y.at(x, y) + rng.uniform(-0.01, 0.01)) * VELOCITY_DAMPING;
                self.velocity_x.set(x, y, vx);
                self.velocity_y.set(x, y, vy);
            }
        }

        self.density = next;
    }

    /// Re-inject moisture (transpiration, evaporation) around a cell
    /// with inverse-distance falloff over a radius-2 window.
    pub fn add_moisture(&mut self, x: i32, y: i32, amount: f32) {
        for dy in -MOISTURE_SPREAD..=MOISTURE_SPREAD {
            for dx in -MOISTURE_SPREAD..=MOISTURE_SPREAD {
                let (nx, ny) = (x + dx, y + dy);
                if let Some(cell) = self.density.get_mut(nx, ny) {
                    let distance = ((dx * dx + dy * dy) as f32).sqrt();
                    let contribution = amount / (1.0 + distance);
                    *cell = (*cell + contribution).min(1.0);
                }
            }
        }
    }
}
