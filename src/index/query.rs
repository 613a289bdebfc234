//! Read-only queries over a built [`ClusterIndex`].

use super::{ClusterIndex, ClusterRecord, Level, ProjectedEntry};
use crate::compute::kdtree::{Region, Window};
use crate::compute::{projection, validation};
use crate::error::Result;
use crate::index::feature::{ClusterFeature, ClusterSummary, TileFeature};
use crate::point::InputPoint;
use geocluster_types::{ClusterId, EntryId, LngLatBounds, TileCoord};
use rustc_hash::FxHashSet;
use std::iter::FusedIterator;

/// A displayed feature with its projected position.
type Placed<'a> = (ClusterFeature<'a>, f64, f64);

impl ClusterIndex {
    /// Features visible inside `bounds` at `zoom`.
    ///
    /// The zoom is clamped to `[min_zoom, max_zoom + 1]`. Boxes crossing the
    /// antimeridian are split in two; each feature is reported once. Clusters
    /// lighter than `min_points` are replaced by those of their points that
    /// lie inside the box.
    pub fn get_clusters(
        &self,
        bounds: impl Into<LngLatBounds>,
        zoom: u8,
    ) -> Result<Vec<ClusterFeature<'_>>> {
        let bounds = bounds.into();
        validation::validate_bounds(&bounds)?;

        let level = self.level(zoom);
        let spread = self.light_cluster_spread(zoom);
        let mut seen = FxHashSet::default();
        let mut features = Vec::new();

        for part in bounds.parts() {
            // Projected y grows southwards.
            let window = Window {
                min_x: projection::lng_x(part.min().x),
                min_y: projection::lat_y(part.max().y),
                max_x: projection::lng_x(part.max().x),
                max_y: projection::lat_y(part.min().y),
            };

            for (feature, _, _) in self.visible_in(level, window, spread)? {
                if seen.insert(feature.id()) {
                    features.push(feature);
                }
            }
        }

        Ok(features)
    }

    /// Features of tile `z/x/y` in tile-local pixel coordinates.
    ///
    /// The tile is extended by the tile buffer on every side; tiles on the
    /// western or eastern edge of the world also collect the strip that wraps
    /// around from the opposite edge.
    pub fn get_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<TileFeature<'_>>> {
        let tile = TileCoord::new(z, x, y);
        validation::validate_tile(&tile)?;

        let level = self.level(z);
        let spread = self.light_cluster_spread(z);
        let z2 = tile.grid_size() as f64;
        let p = self.options.tile_buffer_px() / self.options.extent;
        let (tx, ty) = (f64::from(x), f64::from(y));
        let top = (ty - p) / z2;
        let bottom = (ty + 1.0 + p) / z2;

        let mut tile_features = Vec::new();
        let mut add = |min_x: f64, max_x: f64, origin_x: f64| -> Result<()> {
            let window = Window {
                min_x,
                min_y: top,
                max_x,
                max_y: bottom,
            };
            for (feature, px, py) in self.visible_in(level, window, spread)? {
                tile_features.push(TileFeature {
                    x: (self.options.extent * (px * z2 - origin_x)).round() as i64,
                    y: (self.options.extent * (py * z2 - ty)).round() as i64,
                    feature,
                });
            }
            Ok(())
        };

        add((tx - p) / z2, (tx + 1.0 + p) / z2, tx)?;
        if tile.is_west_edge() {
            add(1.0 - p / z2, 1.0, z2)?;
        }
        if tile.is_east_edge() {
            add(0.0, p / z2, -1.0)?;
        }

        Ok(tile_features)
    }

    /// Direct members of a cluster, in the order they were merged.
    pub fn get_children(&self, id: ClusterId) -> Result<Vec<ClusterFeature<'_>>> {
        let record = self.cluster(id)?;
        let entries = &self.level(id.zoom() + 1).entries;
        record
            .children()
            .iter()
            .map(|&slot| self.feature_for(&entries[slot as usize]))
            .collect()
    }

    /// Lazy depth-first iterator over the points below a cluster.
    ///
    /// Each call starts a fresh traversal, and the iterator can be cloned to
    /// replay from its current position.
    pub fn leaves(&self, id: ClusterId) -> Result<Leaves<'_>> {
        Ok(Leaves::new(self, self.cluster(id)?))
    }

    /// Page of the points below a cluster: skip `offset`, then take at most
    /// `limit`.
    pub fn get_leaves(
        &self,
        id: ClusterId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ClusterFeature<'_>>> {
        Ok(self
            .leaves(id)?
            .offset(offset)
            .take(limit)
            .map(ClusterFeature::Leaf)
            .collect())
    }

    /// Lowest zoom at which the cluster breaks apart.
    pub fn get_cluster_expansion_zoom(&self, id: ClusterId) -> Result<u8> {
        Ok(self.expansion_zoom_of(self.cluster(id)?))
    }

    fn expansion_zoom_of(&self, record: &ClusterRecord) -> u8 {
        *record.expansion_zoom.get_or_init(|| {
            let max_zoom = self.options.max_zoom;
            let mut current = record;
            loop {
                let zoom = current.zoom() + 1;
                if current.children.len() != 1 || zoom > max_zoom {
                    return zoom.min(max_zoom + 1);
                }
                let child = &self.level(zoom).entries[current.children[0] as usize];
                match child.id {
                    EntryId::Cluster(next) => {
                        // Every cluster entry of a level is registered at build.
                        let next = self.registry.get(&next);
                        debug_assert!(next.is_some(), "child cluster missing from the registry");
                        match next {
                            Some(next) => current = next,
                            None => return zoom,
                        }
                    }
                    EntryId::Leaf(_) => return zoom,
                }
            }
        })
    }

    fn summarize(&self, record: &ClusterRecord) -> ClusterSummary {
        ClusterSummary {
            id: record.id(),
            point_count: record.weight(),
            position: record.centroid(),
            expansion_zoom: self.expansion_zoom_of(record),
            properties: record.properties.clone(),
        }
    }

    fn feature_for(&self, entry: &ProjectedEntry) -> Result<ClusterFeature<'_>> {
        Ok(match entry.id {
            EntryId::Leaf(index) => ClusterFeature::Leaf(&self.points[index]),
            EntryId::Cluster(id) => ClusterFeature::Cluster(self.summarize(self.cluster(id)?)),
        })
    }

    /// Upper bound on the projected distance between a light cluster shown
    /// at `zoom` and any of its points.
    ///
    /// A cluster created at zoom `c` has its members within `2 * r(c)` of its
    /// centroid, and each member's own points within `2 * r(c + 1)` of the
    /// member, so the whole subtree fits in `4 * r(c) <= 4 * r(zoom)`.
    fn light_cluster_spread(&self, zoom: u8) -> f64 {
        if self.options.min_points <= 2 {
            // Every merge has weight >= 2, so nothing is light.
            return 0.0;
        }
        4.0 * self.options.radius_at(self.options.clamp_zoom(zoom))
    }

    /// Displayed features of `level` whose position lies inside `window`.
    ///
    /// Leaves and regular clusters are matched by their own position. Light
    /// clusters are looked up in a window widened by `spread` and replaced by
    /// those of their points that fall inside `window`.
    fn visible_in<'a>(
        &'a self,
        level: &Level,
        window: Window,
        spread: f64,
    ) -> Result<Vec<Placed<'a>>> {
        let mut placed = Vec::new();
        let hits = level.tree.range(
            window.min_x - spread,
            window.min_y - spread,
            window.max_x + spread,
            window.max_y + spread,
        );

        for slot in hits {
            let entry = &level.entries[slot];
            match entry.id {
                EntryId::Leaf(index) => {
                    if window.contains(entry.x, entry.y) {
                        placed.push((ClusterFeature::Leaf(&self.points[index]), entry.x, entry.y));
                    }
                }
                EntryId::Cluster(id) => {
                    let record = self.cluster(id)?;
                    if record.is_below_min_points() {
                        for point in Leaves::new(self, record) {
                            let leaf = self.leaf_entry(point.index());
                            if window.contains(leaf.x, leaf.y) {
                                placed.push((ClusterFeature::Leaf(point), leaf.x, leaf.y));
                            }
                        }
                    } else if window.contains(entry.x, entry.y) {
                        placed.push((
                            ClusterFeature::Cluster(self.summarize(record)),
                            entry.x,
                            entry.y,
                        ));
                    }
                }
            }
        }

        Ok(placed)
    }
}

/// Depth-first iterator over the points below a cluster.
///
/// Children are visited in stored order. [`Leaves::offset`] skips whole
/// subtrees whose weight fits inside the remaining offset without descending
/// into them.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    index: &'a ClusterIndex,
    stack: Vec<(&'a ClusterRecord, usize)>,
    skip: usize,
}

impl<'a> Leaves<'a> {
    fn new(index: &'a ClusterIndex, root: &'a ClusterRecord) -> Self {
        Self {
            index,
            stack: vec![(root, 0)],
            skip: 0,
        }
    }

    /// Skip the next `count` points.
    pub fn offset(mut self, count: usize) -> Self {
        self.skip += count;
        self
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a InputPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        loop {
            let (record, cursor) = self.stack.last_mut()?;
            let record: &'a ClusterRecord = *record;
            let Some(&slot) = record.children.get(*cursor) else {
                self.stack.pop();
                continue;
            };
            *cursor += 1;

            let entry = &index.level(record.zoom() + 1).entries[slot as usize];
            match entry.id {
                EntryId::Leaf(point) => {
                    if self.skip > 0 {
                        self.skip -= 1;
                        continue;
                    }
                    return Some(&index.points[point]);
                }
                EntryId::Cluster(id) => {
                    let weight = entry.weight as usize;
                    if self.skip >= weight {
                        self.skip -= weight;
                        continue;
                    }
                    // Every cluster entry of a level is registered at build.
                    let child = index.registry.get(&id);
                    debug_assert!(child.is_some(), "child cluster missing from the registry");
                    if let Some(child) = child {
                        self.stack.push((child, 0));
                    }
                }
            }
        }
    }
}

impl FusedIterator for Leaves<'_> {}
