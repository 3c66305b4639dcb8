use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identity for a splat surface, assigned by the owning scene.
///
/// The cache keys derived data by this id rather than by reference, so the
/// scene stays responsible for keeping ids stable and for invalidating the
/// cache when it repaints a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("weight buffer holds {actual} floats but {width}x{height}x{layers} needs {expected}")]
    WeightLengthMismatch {
        width: usize,
        height: usize,
        layers: usize,
        expected: usize,
        actual: usize,
    },
}

/// Read side of a splat-weight surface, as the dominant-layer cache sees it.
///
/// Implementors expose the alphamap dimensions and per-cell layer weights;
/// weights in one cell are expected to sum to at most 1.0 but nothing here
/// enforces that.
pub trait SplatSource {
    fn id(&self) -> SurfaceId;

    /// `(width, height, layers)` of the weight grid.
    fn alpha_dimensions(&self) -> (usize, usize, usize);

    fn weight(&self, row: usize, col: usize, layer: usize) -> f32;
}

/// In-memory splat map: a `width x height` grid holding `layers` coverage
/// weights per cell, stored row-major with the layer index varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatMap {
    id: SurfaceId,
    width: usize,
    height: usize,
    layers: usize,
    weights: Vec<f32>,
}

impl SplatMap {
    pub fn new(
        id: SurfaceId,
        width: usize,
        height: usize,
        layers: usize,
        weights: Vec<f32>,
    ) -> Result<Self, SurfaceError> {
        let expected = width * height * layers;
        if weights.len() != expected {
            return Err(SurfaceError::WeightLengthMismatch {
                width,
                height,
                layers,
                expected,
                actual: weights.len(),
            });
        }
        Ok(SplatMap {
            id,
            width,
            height,
            layers,
            weights,
        })
    }

    /// Grid with every weight set to `value`.
    pub fn filled(id: SurfaceId, width: usize, height: usize, layers: usize, value: f32) -> Self {
        SplatMap {
            id,
            width,
            height,
            layers,
            weights: vec![value; width * height * layers],
        }
    }

    /// Builds a one-hot map: `pick(row, col)` names the fully covering layer
    /// for each cell. Picks outside `0..layers` leave the cell unpainted.
    pub fn from_dominant_layers<F>(
        id: SurfaceId,
        width: usize,
        height: usize,
        layers: usize,
        pick: F,
    ) -> Self
    where
        F: Fn(usize, usize) -> usize,
    {
        let mut map = Self::filled(id, width, height, layers, 0.0);
        for row in 0..height {
            for col in 0..width {
                let layer = pick(row, col);
                if layer < layers {
                    map.set_weight(row, col, layer, 1.0);
                }
            }
        }
        map
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn set_weight(&mut self, row: usize, col: usize, layer: usize, value: f32) {
        let index = self.index(row, col, layer);
        self.weights[index] = value;
    }

    fn index(&self, row: usize, col: usize, layer: usize) -> usize {
        debug_assert!(row < self.height && col < self.width && layer < self.layers);
        (row * self.width + col) * self.layers + layer
    }
}

impl SplatSource for SplatMap {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn alpha_dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.layers)
    }

    fn weight(&self, row: usize, col: usize, layer: usize) -> f32 {
        self.weights[(row * self.width + col) * self.layers + layer]
    }
}

#[cfg(test)]
mod tests {
    use super::{SplatMap, SplatSource, SurfaceError, SurfaceId};

    #[test]
    fn new_rejects_mismatched_weight_buffer() {
        let err = SplatMap::new(SurfaceId(1), 4, 4, 2, vec![0.0; 31]).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::WeightLengthMismatch {
                width: 4,
                height: 4,
                layers: 2,
                expected: 32,
                actual: 31,
            }
        );
    }

    #[test]
    fn weights_are_layer_fastest() {
        let mut map = SplatMap::filled(SurfaceId(2), 3, 2, 2, 0.0);
        map.set_weight(1, 2, 1, 0.75);
        assert_eq!(map.weight(1, 2, 1), 0.75);
        assert_eq!(map.weight(1, 2, 0), 0.0);
        assert_eq!(map.weight(0, 2, 1), 0.0);
    }

    #[test]
    fn from_dominant_layers_paints_one_hot_cells() {
        let map = SplatMap::from_dominant_layers(SurfaceId(3), 4, 4, 3, |row, _| {
            if row < 2 {
                0
            } else {
                2
            }
        });
        assert_eq!(map.weight(0, 1, 0), 1.0);
        assert_eq!(map.weight(0, 1, 2), 0.0);
        assert_eq!(map.weight(3, 1, 2), 1.0);
        assert_eq!(map.weight(3, 1, 0), 0.0);
    }

    #[test]
    fn degenerate_dimensions_are_representable() {
        let map = SplatMap::new(SurfaceId(4), 0, 0, 0, Vec::new()).expect("empty map is legal");
        assert_eq!(map.alpha_dimensions(), (0, 0, 0));
    }
}
