use conv::ValueFrom;
use log::{debug, trace};
use ordered_float::OrderedFloat;

use crate::beam::BeamSamples;
use crate::config::{MapConfig, OccupancyParams};
use crate::error::Error;
use crate::node::Node;
use crate::point::Point3;

/// Probabilistic 3D occupancy map over an adaptive octree.
///
/// The mapped volume is an axis-aligned cube of edge `resolution *
/// 2^max_depth` centered at `center`. Evidence is fed in either as whole
/// sensor beams ([`OctoTree::ray_cast`]) or as single observations
/// ([`OctoTree::insert_point`]); occupancy is read back with
/// [`OctoTree::get_probability`].
///
/// The tree is a single mutable structure with no internal synchronization:
/// mutators take `&mut self`, queries take `&self`, and embedders that need
/// concurrent access must serialize around the whole tree themselves.
pub struct OctoTree {
    center: Point3,
    resolution: f64,
    max_depth: u32,
    params: OccupancyParams,
    root: Node,
}

/// Saturated leaves of a tree at a moment in time, as cell-center
/// coordinates sorted by (x, y, z). A pruned subtree contributes the single
/// center of its coarse cell. Export formats are the caller's concern.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub occupied: Vec<Point3>,
    pub free: Vec<Point3>,
}

impl OctoTree {
    pub fn new(config: MapConfig) -> Result<OctoTree, Error> {
        config.validate()?;
        let tree = OctoTree {
            center: config.center,
            resolution: config.resolution,
            max_depth: config.max_depth,
            params: config.occupancy,
            root: Node::new(),
        };
        debug!(
            "new occupancy octree: center={}, resolution={}, max_depth={}, width={}",
            tree.center,
            tree.resolution,
            tree.max_depth,
            tree.width()
        );
        Ok(tree)
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        self.center
    }

    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Half the edge length of the mapped cube.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.resolution * f64::value_from(1u32 << (self.max_depth - 1)).unwrap()
    }

    /// Edge length of the mapped cube.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.resolution * f64::value_from(1u32 << self.max_depth).unwrap()
    }

    /// Minimum corner of the mapped cube.
    #[must_use]
    pub fn origin(&self) -> Point3 {
        let radius = self.radius();
        Point3::new(
            self.center.x - radius,
            self.center.y - radius,
            self.center.z - radius,
        )
    }

    /// Whether `point` lies inside `[origin, origin + width)` on every axis.
    #[must_use]
    pub fn contains(&self, point: Point3) -> bool {
        Node::contains(point, self.origin(), self.width())
    }

    /// Number of allocated tree nodes, root included. Diagnostic only.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.root.count_nodes()
    }

    /// Apply a single observation with an explicit log-odds delta.
    ///
    /// No bounds pre-check: a point outside the mapped volume is absorbed as
    /// a no-op by the recursive bounds guard, so sensor noise that lands
    /// slightly outside the map cannot fail an otherwise valid scan.
    pub fn insert_point(&mut self, point: Point3, delta: f64) -> Result<(), Error> {
        if !point.is_finite() {
            return Err(Error::InvalidArgument("point coordinates must be finite"));
        }
        if !delta.is_finite() {
            return Err(Error::InvalidArgument("log-odds delta must be finite"));
        }
        let origin = self.origin();
        let width = self.width();
        self.root
            .update(point, delta, origin, width, self.max_depth, &self.params);
        Ok(())
    }

    /// Apply one sensor beam: free-space evidence for every voxel-sized step
    /// from the sensor to the measured endpoint, then occupied evidence at
    /// the endpoint itself, strictly in traversal order.
    pub fn ray_cast(&mut self, beam_origin: Point3, beam_end: Point3) -> Result<(), Error> {
        if !beam_origin.is_finite() || !beam_end.is_finite() {
            return Err(Error::InvalidArgument("beam endpoints must be finite"));
        }
        let samples = BeamSamples::new(
            beam_origin,
            beam_end,
            self.resolution,
            self.params.miss_log_odds,
            self.params.hit_log_odds,
        );
        trace!(
            "ray cast: {} samples over {:.3} map units",
            samples.len(),
            beam_origin.distance(beam_end)
        );
        let origin = self.origin();
        let width = self.width();
        for (point, delta) in samples {
            self.root
                .update(point, delta, origin, width, self.max_depth, &self.params);
        }
        Ok(())
    }

    /// Occupancy probability of the voxel containing `point`, in (0, 1).
    pub fn get_probability(&self, point: Point3) -> Result<f64, Error> {
        if !point.is_finite() {
            return Err(Error::InvalidArgument("point coordinates must be finite"));
        }
        if !self.contains(point) {
            return Err(Error::OutOfRange { point });
        }
        Ok(self.root.probability_at(point, self.origin(), self.width()))
    }

    /// Collect all clamp-saturated leaves for export or visualization.
    /// Leaves holding intermediate evidence are omitted.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut occupied = Vec::new();
        let mut free = Vec::new();
        self.root.collect_saturated(
            self.origin(),
            self.width(),
            &self.params,
            &mut occupied,
            &mut free,
        );
        let key = |p: &Point3| (OrderedFloat(p.x), OrderedFloat(p.y), OrderedFloat(p.z));
        occupied.sort_by_key(key);
        free.sort_by_key(key);
        Snapshot { occupied, free }
    }
}

impl Default for OctoTree {
    fn default() -> Self {
        OctoTree::new(MapConfig::default()).expect("Invalid default config")
    }
}
