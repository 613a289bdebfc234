//! Bottom-up construction of the zoom hierarchy.
//!
//! Level `max_zoom + 1` holds one entry per input point. Each lower level is
//! produced from the one above it: entries are visited in slot order, and an
//! unvisited entry absorbs every unvisited neighbour within the zoom's merge
//! radius into a new cluster. Entries without neighbours are carried down
//! unchanged, keeping their id, weight and position.

use super::{ClusterIndex, ClusterRecord, Level, ProjectedEntry};
use crate::compute::{projection, validation};
use crate::config::ClusterOptions;
use crate::error::{ClusterError, Result};
use crate::point::InputPoint;
use crate::reduce::PropertyReducer;
use geocluster_types::{ClusterId, EntryId};
use geojson::JsonObject;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::time::Instant;

type Registry = FxHashMap<ClusterId, ClusterRecord>;

impl ClusterIndex {
    /// Build the hierarchy for `points`.
    ///
    /// Fails with `InvalidConfiguration` for bad options and with
    /// `InvalidCoordinates` for the first point outside the valid
    /// longitude/latitude range.
    pub fn build(options: ClusterOptions, points: Vec<InputPoint>) -> Result<Self> {
        Self::build_with_reducer(options, points, None)
    }

    /// Build the hierarchy, aggregating point properties into every cluster
    /// with `reducer`.
    pub fn build_with_reducer(
        options: ClusterOptions,
        mut points: Vec<InputPoint>,
        reducer: Option<&dyn PropertyReducer>,
    ) -> Result<Self> {
        options.validate()?;
        validation::validate_points(&points)?;

        if u32::try_from(points.len()).is_err() {
            return Err(ClusterError::InvalidInput(format!(
                "Cannot index {} points, at most {} are supported",
                points.len(),
                u32::MAX
            )));
        }

        let log_level = if options.log {
            log::Level::Info
        } else {
            log::Level::Trace
        };
        let total = Instant::now();

        for (index, point) in points.iter_mut().enumerate() {
            point.assign_index(index, options.generate_id);
        }

        let leaves: Vec<ProjectedEntry> = points
            .iter()
            .map(|point| {
                let (x, y) = projection::project(&point.position());
                ProjectedEntry {
                    x,
                    y,
                    weight: 1,
                    id: EntryId::Leaf(point.index()),
                }
            })
            .collect();

        let level_count = usize::from(options.max_zoom - options.min_zoom) + 2;
        let mut levels = Vec::with_capacity(level_count);
        levels.push(Level::new(leaves, options.node_size));
        log::log!(
            log_level,
            "prepared {} points in {:?}",
            points.len(),
            total.elapsed()
        );

        let mut registry = Registry::default();

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let started = Instant::now();
            let previous = &levels[levels.len() - 1];
            let entries = cluster_level(&options, previous, zoom, &points, &mut registry, reducer);
            log::log!(
                log_level,
                "z{}: {} entries in {:?}",
                zoom,
                entries.len(),
                started.elapsed()
            );
            levels.push(Level::new(entries, options.node_size));
        }

        // Built top-down from max_zoom + 1; stored by ascending zoom.
        levels.reverse();

        log::log!(
            log_level,
            "indexed {} points into {} clusters over {} zoom levels in {:?}",
            points.len(),
            registry.len(),
            levels.len(),
            total.elapsed()
        );

        Ok(Self {
            options,
            points,
            levels,
            registry,
        })
    }
}

/// Merge the entries of `previous` (zoom + 1) into the entry list for `zoom`.
fn cluster_level(
    options: &ClusterOptions,
    previous: &Level,
    zoom: u8,
    points: &[InputPoint],
    registry: &mut Registry,
    reducer: Option<&dyn PropertyReducer>,
) -> Vec<ProjectedEntry> {
    let radius = options.radius_at(zoom);
    let entries = &previous.entries;
    let mut visited = vec![false; entries.len()];
    let mut next = Vec::with_capacity(entries.len());

    for (slot, entry) in entries.iter().enumerate() {
        if visited[slot] {
            continue;
        }
        visited[slot] = true;

        let mut members: SmallVec<[u32; 4]> = SmallVec::new();
        members.push(slot as u32);
        let mut weight = entry.weight;

        for neighbor in previous.tree.within(entry.x, entry.y, radius) {
            if visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            members.push(neighbor as u32);
            weight += entries[neighbor].weight;
        }

        if members.len() == 1 {
            next.push(*entry);
            continue;
        }

        let mut wx = 0.0;
        let mut wy = 0.0;
        for &member in &members {
            let m = &entries[member as usize];
            wx += m.x * f64::from(m.weight);
            wy += m.y * f64::from(m.weight);
        }
        let centroid = (wx / f64::from(weight), wy / f64::from(weight));

        let properties = reducer.map(|reducer| {
            let mut accumulated = member_properties(&entries[slot], points, registry, reducer);
            for &member in &members[1..] {
                let props = member_properties(&entries[member as usize], points, registry, reducer);
                reducer.reduce(&mut accumulated, &props);
            }
            accumulated
        });

        let id = ClusterId::new(zoom, next.len() as u32);
        registry.insert(
            id,
            ClusterRecord::new(id, weight, centroid, members, options.min_points, properties),
        );
        next.push(ProjectedEntry {
            x: centroid.0,
            y: centroid.1,
            weight,
            id: EntryId::Cluster(id),
        });
    }

    next
}

fn member_properties(
    entry: &ProjectedEntry,
    points: &[InputPoint],
    registry: &Registry,
    reducer: &dyn PropertyReducer,
) -> JsonObject {
    match entry.id {
        EntryId::Leaf(index) => reducer.map(points[index].properties()),
        EntryId::Cluster(id) => registry
            .get(&id)
            .and_then(|record| record.properties.clone())
            .unwrap_or_default(),
    }
}
