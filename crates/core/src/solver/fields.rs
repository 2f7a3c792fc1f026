//! Receptor grid geometry and concentration fields
//!
//! The receptor grid is a square of `(N + 1) × (N + 1)` nodes centred on the
//! source. Fields are stored as flat `Vec<f64>` in row-major order, one row
//! per northing, one column per easting.

use crate::core_types::params::SourceParams;
use crate::solver::transform::{GeoOffset, LocalProjection};
use serde::{Deserialize, Serialize};

/// Receptor layout shared by every hour of a run
///
/// Node `k` on either axis sits at `(k − N/2) · spacing` meters from the
/// source. Receptors are held as geographic offsets and converted back to
/// meters with the source's projection when the plume is evaluated.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    /// Easting of each column (m); the downwind axis for a westerly wind
    x: Vec<f64>,
    /// Northing of each row (m); the crosswind axis for a westerly wind
    y: Vec<f64>,
    /// Receptor offsets in row-major order
    receptors: Vec<GeoOffset>,
    projection: LocalProjection,
    receptor_height: f64,
}

impl GridGeometry {
    /// Build the receptor grid for a source
    ///
    /// # Arguments
    ///
    /// * `source` - Validated source parameters (grid size, spacing, latitude)
    #[must_use]
    pub fn new(source: &SourceParams) -> Self {
        let n = source.grid_size;
        let half = n as f64 / 2.0;
        let axis: Vec<f64> = (0..=n)
            .map(|k| (k as f64 - half) * source.grid_spacing)
            .collect();

        let projection = LocalProjection::new(source.latitude);
        let mut receptors = Vec::with_capacity(axis.len() * axis.len());
        for &north in &axis {
            for &east in &axis {
                receptors.push(projection.to_offset(east, north));
            }
        }

        Self {
            x: axis.clone(),
            y: axis,
            receptors,
            projection,
            receptor_height: source.receptor_height,
        }
    }

    /// Number of columns
    #[must_use]
    pub fn width(&self) -> usize {
        self.x.len()
    }

    /// Number of rows
    #[must_use]
    pub fn height(&self) -> usize {
        self.y.len()
    }

    /// Column coordinates (m east of the source)
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Row coordinates (m north of the source)
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Receptor offsets, row-major
    #[must_use]
    pub fn receptors(&self) -> &[GeoOffset] {
        &self.receptors
    }

    /// Projection centred on the source
    #[must_use]
    pub fn projection(&self) -> &LocalProjection {
        &self.projection
    }

    /// Receptor height above ground (m)
    #[must_use]
    pub fn receptor_height(&self) -> f64 {
        self.receptor_height
    }

    /// Empty field matching this geometry
    #[must_use]
    pub fn zeroed_field(&self) -> ConcentrationGrid {
        ConcentrationGrid::from_values(
            vec![0.0; self.width() * self.height()],
            self.x.clone(),
            self.y.clone(),
        )
    }
}

/// Ground-level concentration field for one hour (g/m³)
///
/// Every value is non-negative. The peak is cached and kept in step with
/// the data by every mutating method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationGrid {
    /// Field values in row-major order (row * width + column)
    data: Vec<f64>,
    /// Grid width in columns
    width: usize,
    /// Grid height in rows
    height: usize,
    /// Column coordinates (m)
    x: Vec<f64>,
    /// Row coordinates (m)
    y: Vec<f64>,
    /// Largest value in `data`
    peak: f64,
}

impl ConcentrationGrid {
    /// Wrap computed values; negative or NaN entries are clamped to zero
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != x.len() * y.len()`
    #[must_use]
    pub fn from_values(mut values: Vec<f64>, x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            x.len() * y.len(),
            "Field size does not match coordinate axes"
        );
        for v in &mut values {
            if v.is_nan() || *v < 0.0 {
                *v = 0.0;
            }
        }
        let peak = values.iter().copied().fold(0.0, f64::max);
        Self {
            width: x.len(),
            height: y.len(),
            data: values,
            x,
            y,
            peak,
        }
    }

    /// Largest concentration in the field
    #[must_use]
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Grid width in columns
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in rows
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Column coordinates (m east of the source)
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Row coordinates (m north of the source)
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Field values, row-major
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Value at column `x`, row `y`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        assert!(
            x < self.width && y < self.height,
            "Coordinates out of bounds"
        );
        self.data[y * self.width + x]
    }

    /// Iterate rows, southernmost first
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.width)
    }

    /// Column and row of the peak (first occurrence in row-major order)
    #[must_use]
    pub fn peak_index(&self) -> (usize, usize) {
        let idx = self
            .data
            .iter()
            .position(|&v| v == self.peak)
            .unwrap_or(0);
        (idx % self.width, idx / self.width)
    }

    /// Multiply every value by `factor` (clamped to ≥ 0) and update the peak
    pub fn scale(&mut self, factor: f64) {
        let factor = if factor.is_nan() { 0.0 } else { factor.max(0.0) };
        for v in &mut self.data {
            *v *= factor;
        }
        self.peak *= factor;
    }

    /// Copy into nested rows, the layout charting front ends expect
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}
