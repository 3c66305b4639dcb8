use std::collections::HashMap;

use serde::Serialize;

use crate::surface::{SplatSource, SurfaceId};

/// Linear block size used when a cache is built with `SplatCache::default`.
pub const DEFAULT_DOWNSAMPLE: usize = 8;

/// Downsampled view of one surface: each cell holds the index of the layer
/// whose summed weight dominates the corresponding block of source cells.
///
/// The grid is `max(1, ceil(W/k)) x max(1, ceil(H/k))`, so even a surface
/// narrower than one block still yields a 1x1 map. Ties go to the lowest
/// layer index; only a strictly greater sum displaces an earlier layer.
#[derive(Debug, Clone, Serialize)]
pub struct DominantMap {
    width: usize,
    height: usize,
    cells: Vec<usize>,
}

impl DominantMap {
    /// Scans the full weight grid once. This is the expensive step the
    /// cache amortizes: O(W * H * L) for a factor-independent result size
    /// of roughly `(W/k) * (H/k)` cells.
    pub fn build<S: SplatSource + ?Sized>(source: &S, factor: usize) -> Self {
        let factor = factor.max(1);
        let (full_w, full_h, layers) = source.alpha_dimensions();

        if full_w == 0 || full_h == 0 || layers == 0 {
            // Degenerate surface: report layer 0 everywhere rather than fail.
            return DominantMap {
                width: 1,
                height: 1,
                cells: vec![0],
            };
        }

        let width = full_w.div_ceil(factor).max(1);
        let height = full_h.div_ceil(factor).max(1);
        let mut cells = vec![0usize; width * height];
        let mut sums = vec![0.0f32; layers];

        for cz in 0..height {
            let row_start = cz * factor;
            let row_end = (row_start + factor).min(full_h);

            for cx in 0..width {
                let col_start = cx * factor;
                let col_end = (col_start + factor).min(full_w);

                sums.iter_mut().for_each(|sum| *sum = 0.0);
                for row in row_start..row_end {
                    for col in col_start..col_end {
                        for (layer, sum) in sums.iter_mut().enumerate() {
                            *sum += source.weight(row, col, layer);
                        }
                    }
                }

                let mut best_layer = 0;
                let mut best_sum = sums[0];
                for (layer, sum) in sums.iter().enumerate().skip(1) {
                    if *sum > best_sum {
                        best_sum = *sum;
                        best_layer = layer;
                    }
                }

                cells[cz * width + cx] = best_layer;
            }
        }

        DominantMap {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Dominant layer for the cache cell at `(cx, cz)`.
    pub fn at(&self, cx: usize, cz: usize) -> usize {
        self.cells[cz * self.width + cx]
    }

    /// Dominant layer at normalized `[0, 1]` coordinates. Inputs outside
    /// the range clamp; 1.0 lands in the last column/row, never past it.
    pub fn at_normalized(&self, normalized_x: f32, normalized_z: f32) -> usize {
        let nx = normalized_x.clamp(0.0, 1.0);
        let nz = normalized_z.clamp(0.0, 1.0);
        let cx = ((nx * self.width as f32).floor() as usize).min(self.width - 1);
        let cz = ((nz * self.height as f32).floor() as usize).min(self.height - 1);
        self.at(cx, cz)
    }
}

/// Per-scene cache of dominant-layer maps, keyed by surface id.
///
/// Maps are built lazily on first lookup and kept until `clear` or
/// `invalidate`; there is no change detection, so whoever repaints a
/// surface's weights must drop the stale entry themselves.
#[derive(Debug)]
pub struct SplatCache {
    factor: usize,
    maps: HashMap<SurfaceId, DominantMap>,
}

impl Default for SplatCache {
    fn default() -> Self {
        SplatCache::new(DEFAULT_DOWNSAMPLE)
    }
}

impl SplatCache {
    pub fn new(downsample_factor: usize) -> Self {
        SplatCache {
            factor: downsample_factor.max(1),
            maps: HashMap::new(),
        }
    }

    /// Dominant layer under normalized `[0, 1]` coordinates on `source`.
    ///
    /// Builds and stores the surface's dominant map on the first query, so
    /// the first call per surface pays the full scan and later calls are a
    /// grid lookup. Results are stable until the entry is invalidated.
    pub fn dominant_layer<S: SplatSource + ?Sized>(
        &mut self,
        source: &S,
        normalized_x: f32,
        normalized_z: f32,
    ) -> usize {
        let factor = self.factor;
        let map = self
            .maps
            .entry(source.id())
            .or_insert_with(|| DominantMap::build(source, factor));
        map.at_normalized(normalized_x, normalized_z)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.maps.contains_key(&id)
    }

    /// Drops the cached map for one surface.
    pub fn invalidate(&mut self, id: SurfaceId) {
        self.maps.remove(&id);
    }

    /// Drops every cached map. Call after repainting or resizing any
    /// surface the cache has seen.
    pub fn clear(&mut self) {
        self.maps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{DominantMap, SplatCache};
    use crate::surface::{SplatMap, SurfaceId};

    fn checkerboard_16(id: u64) -> SplatMap {
        // Left half layer 0, right half layer 1.
        SplatMap::from_dominant_layers(SurfaceId(id), 16, 16, 2, |_, col| {
            if col < 8 {
                0
            } else {
                1
            }
        })
    }

    #[test]
    fn sixteen_by_sixteen_downsamples_to_two_by_two() {
        let map = DominantMap::build(&checkerboard_16(1), 8);
        assert_eq!((map.width(), map.height()), (2, 2));
        assert_eq!(map.at(0, 0), 0);
        assert_eq!(map.at(1, 0), 1);
        assert_eq!(map.at(0, 1), 0);
        assert_eq!(map.at(1, 1), 1);
    }

    #[test]
    fn partial_tail_blocks_get_their_own_cells() {
        let map = SplatMap::from_dominant_layers(SurfaceId(2), 17, 9, 2, |_, col| {
            if col < 16 {
                0
            } else {
                1
            }
        });
        let dominant = DominantMap::build(&map, 8);
        assert_eq!((dominant.width(), dominant.height()), (3, 2));
        // The lone 17th column is its own block and keeps its layer.
        assert_eq!(dominant.at(2, 0), 1);
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let surface = checkerboard_16(3);
        let mut cache = SplatCache::default();
        let first = cache.dominant_layer(&surface, 0.9, 0.4);
        for _ in 0..16 {
            assert_eq!(cache.dominant_layer(&surface, 0.9, 0.4), first);
        }
    }

    #[test]
    fn coordinate_one_maps_into_last_cell() {
        let surface = checkerboard_16(4);
        let mut cache = SplatCache::default();
        assert_eq!(cache.dominant_layer(&surface, 1.0, 1.0), 1);
        assert_eq!(cache.dominant_layer(&surface, 0.999, 1.0), 1);
        assert_eq!(cache.dominant_layer(&surface, -3.0, 7.5), 0);
    }

    #[test]
    fn near_ties_go_to_the_greater_sum_not_the_lower_index() {
        // One block where layer 0 sums to 3.0 and layer 1 to 2.9.
        let mut weights = Vec::new();
        for cell in 0..4 {
            weights.push(if cell < 3 { 1.0 } else { 0.0 });
            weights.push(if cell < 2 { 1.0 } else if cell == 2 { 0.9 } else { 0.0 });
        }
        let surface = SplatMap::new(SurfaceId(5), 2, 2, 2, weights).unwrap();
        let dominant = DominantMap::build(&surface, 2);
        assert_eq!(dominant.at(0, 0), 0);
    }

    #[test]
    fn exact_ties_keep_the_lowest_layer_index() {
        let surface = SplatMap::filled(SurfaceId(6), 8, 8, 3, 0.25);
        let dominant = DominantMap::build(&surface, 8);
        assert_eq!(dominant.at(0, 0), 0);
    }

    #[test]
    fn single_layer_surface_is_always_layer_zero() {
        let surface = SplatMap::filled(SurfaceId(7), 12, 12, 1, 1.0);
        let mut cache = SplatCache::default();
        for (nx, nz) in [(0.0, 0.0), (0.5, 0.25), (1.0, 1.0)] {
            assert_eq!(cache.dominant_layer(&surface, nx, nz), 0);
        }
    }

    #[test]
    fn degenerate_surfaces_report_layer_zero() {
        let zero_layers = SplatMap::new(SurfaceId(8), 4, 4, 0, Vec::new()).unwrap();
        let zero_sized = SplatMap::new(SurfaceId(9), 0, 0, 3, Vec::new()).unwrap();
        let mut cache = SplatCache::default();
        assert_eq!(cache.dominant_layer(&zero_layers, 0.5, 0.5), 0);
        assert_eq!(cache.dominant_layer(&zero_sized, 0.5, 0.5), 0);
    }

    #[test]
    fn clear_forces_a_rebuild_that_sees_new_weights() {
        let mut surface = SplatMap::from_dominant_layers(SurfaceId(10), 8, 8, 2, |_, _| 0);
        let mut cache = SplatCache::default();
        assert_eq!(cache.dominant_layer(&surface, 0.5, 0.5), 0);

        // Repaint everything to layer 1; the stale entry still answers 0.
        for row in 0..8 {
            for col in 0..8 {
                surface.set_weight(row, col, 0, 0.0);
                surface.set_weight(row, col, 1, 1.0);
            }
        }
        assert_eq!(cache.dominant_layer(&surface, 0.5, 0.5), 0);

        cache.clear();
        assert_eq!(cache.dominant_layer(&surface, 0.5, 0.5), 1);
    }

    #[test]
    fn invalidate_drops_only_the_named_surface() {
        let a = checkerboard_16(11);
        let b = checkerboard_16(12);
        let mut cache = SplatCache::default();
        cache.dominant_layer(&a, 0.0, 0.0);
        cache.dominant_layer(&b, 0.0, 0.0);
        cache.invalidate(SurfaceId(11));
        assert!(!cache.contains(SurfaceId(11)));
        assert!(cache.contains(SurfaceId(12)));
    }

    #[test]
    fn factor_larger_than_surface_yields_single_cell() {
        let surface = checkerboard_16(13);
        let dominant = DominantMap::build(&surface, 64);
        assert_eq!((dominant.width(), dominant.height()), (1, 1));
    }
}
