//! Ground and water heights for the region (Z-up).
//!
//! Either a flat ground plane or a regular height grid sampled bilinearly.
//! Queries outside the grid clamp to its edge. Water is a single level.
// terrain.rs
use tracing::warn;

use crate::config::{GridConfig, TerrainConfig};
use crate::vehicle::TerrainSource;

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMap {
    ground_height: f32,
    water_level: f32,
    grid: Option<HeightGrid>,
}

#[derive(Debug, Clone, PartialEq)]
struct HeightGrid {
    origin: [f32; 2],
    cell_size: f32,
    columns: usize,
    rows: usize,
    heights: Vec<f32>,
}

impl HeightGrid {
    fn from_config(cfg: &GridConfig) -> Option<Self> {
        let expected = cfg.columns * cfg.rows;
        if cfg.columns < 2 || cfg.rows < 2 || cfg.cell_size <= 0.0 || cfg.heights.len() != expected {
            return None;
        }
        Some(Self {
            origin: cfg.origin,
            cell_size: cfg.cell_size,
            columns: cfg.columns,
            rows: cfg.rows,
            heights: cfg.heights.clone(),
        })
    }

    fn at(&self, col: usize, row: usize) -> f32 {
        self.heights[row * self.columns + col]
    }

    fn sample(&self, x: f32, y: f32) -> f32 {
        let max_u = (self.columns - 1) as f32;
        let max_v = (self.rows - 1) as f32;
        let u = ((x - self.origin[0]) / self.cell_size).clamp(0.0, max_u);
        let v = ((y - self.origin[1]) / self.cell_size).clamp(0.0, max_v);

        let c0 = (u.floor() as usize).min(self.columns - 2);
        let r0 = (v.floor() as usize).min(self.rows - 2);
        let fu = u - c0 as f32;
        let fv = v - r0 as f32;

        let h00 = self.at(c0, r0);
        let h10 = self.at(c0 + 1, r0);
        let h01 = self.at(c0, r0 + 1);
        let h11 = self.at(c0 + 1, r0 + 1);

        let bottom = h00 + (h10 - h00) * fu;
        let top = h01 + (h11 - h01) * fu;
        bottom + (top - bottom) * fv
    }
}

impl TerrainMap {
    pub fn flat(ground_height: f32, water_level: f32) -> Self {
        Self { ground_height, water_level, grid: None }
    }

    pub fn from_config(cfg: &TerrainConfig) -> Self {
        let grid = cfg.grid.as_ref().and_then(|g| {
            let grid = HeightGrid::from_config(g);
            if grid.is_none() {
                warn!(
                    columns = g.columns,
                    rows = g.rows,
                    samples = g.heights.len(),
                    "terrain grid is malformed, using flat ground"
                );
            }
            grid
        });
        Self { ground_height: cfg.ground_height, water_level: cfg.water_level, grid }
    }

    /// Height used for the solver's ground plane.
    pub fn base_height(&self) -> f32 {
        match &self.grid {
            Some(g) => g.heights.iter().copied().fold(f32::INFINITY, f32::min),
            None => self.ground_height,
        }
    }
}

impl TerrainSource for TerrainMap {
    fn height_at(&self, x: f32, y: f32) -> f32 {
        match &self.grid {
            Some(g) => g.sample(x, y),
            None => self.ground_height,
        }
    }

    fn water_level_at(&self, _x: f32, _y: f32) -> f32 {
        self.water_level
    }
}
