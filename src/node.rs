use crate::config::{OccupancyParams, DEFAULT_LOG_ODDS};
use crate::point::Point3;

/// A cube of space inside the octree.
///
/// A node is either a leaf carrying accumulated occupancy evidence in
/// log-odds, or an internal node owning exactly eight children (one per
/// octant). Nodes never store their own origin or width; the tree derives both
/// per level while recursing, so stored and derived geometry cannot drift.
pub(crate) struct Node {
    log_odds: f64,
    children: Option<Box<[Node; 8]>>,
}

impl Node {
    pub fn new() -> Node {
        Node {
            log_odds: DEFAULT_LOG_ODDS,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn log_odds(&self) -> f64 {
        self.log_odds
    }

    /// Occupancy probability of this leaf, always in the open interval (0, 1).
    pub fn probability(&self) -> f64 {
        1.0 / (1.0 + (-self.log_odds).exp())
    }

    pub fn contains(point: Point3, origin: Point3, width: f64) -> bool {
        origin.x <= point.x
            && point.x < origin.x + width
            && origin.y <= point.y
            && point.y < origin.y + width
            && origin.z <= point.z
            && point.z < origin.z + width
    }

    /// Index of the child octant containing `point`, as a 3-bit mask:
    /// bit 0 for the upper half in x, bit 1 for y, bit 2 for z.
    fn child_index(point: Point3, origin: Point3, width: f64) -> usize {
        let half = width / 2.0;
        usize::from(point.x >= origin.x + half)
            | usize::from(point.y >= origin.y + half) << 1
            | usize::from(point.z >= origin.z + half) << 2
    }

    /// Origin of the child octant at `index`, derived from this node's frame.
    fn child_origin(index: usize, origin: Point3, width: f64) -> Point3 {
        let half = width / 2.0;
        Point3::new(
            origin.x + if index & 1 != 0 { half } else { 0.0 },
            origin.y + if index & 2 != 0 { half } else { 0.0 },
            origin.z + if index & 4 != 0 { half } else { 0.0 },
        )
    }

    /// Materialize all eight children at the neutral prior.
    fn split(&mut self) {
        self.children = Some(Box::new(std::array::from_fn(|_| Node::new())));
        self.log_odds = DEFAULT_LOG_ODDS;
    }

    /// Collapse the children back into this node if all eight are leaves
    /// holding the same clamp-saturated value.
    fn try_prune(&mut self, params: &OccupancyParams) {
        let saturated = match &self.children {
            Some(children) => {
                let value = children[0].log_odds;
                let unanimous = (value == params.free_log_odds
                    || value == params.occupied_log_odds)
                    && children.iter().all(|c| c.is_leaf() && c.log_odds == value);
                unanimous.then_some(value)
            }
            None => None,
        };
        if let Some(value) = saturated {
            self.log_odds = value;
            self.children = None;
        }
    }

    /// Apply one observation to the subtree rooted at this node.
    ///
    /// A point outside `[origin, origin + width)` is dropped silently: beam
    /// endpoints land arbitrarily close to voxel boundaries, and a reading
    /// that rounds into the wrong cell must not abort an otherwise valid beam.
    pub fn update(
        &mut self,
        point: Point3,
        delta: f64,
        origin: Point3,
        width: f64,
        depth: u32,
        params: &OccupancyParams,
    ) {
        if !Self::contains(point, origin, width) {
            return;
        }
        if depth == 0 {
            self.log_odds =
                (self.log_odds + delta).clamp(params.free_log_odds, params.occupied_log_odds);
            return;
        }
        if self.is_leaf() {
            self.split();
        }
        let index = Self::child_index(point, origin, width);
        let child_origin = Self::child_origin(index, origin, width);
        if let Some(children) = &mut self.children {
            children[index].update(point, delta, child_origin, width / 2.0, depth - 1, params);
        }
        self.try_prune(params);
    }

    /// Occupancy probability at `point`. The tree checks bounds before the
    /// first call; recursion below that always stays inside this node's cube.
    pub fn probability_at(&self, point: Point3, origin: Point3, width: f64) -> f64 {
        match &self.children {
            None => self.probability(),
            Some(children) => {
                let index = Self::child_index(point, origin, width);
                children[index].probability_at(
                    point,
                    Self::child_origin(index, origin, width),
                    width / 2.0,
                )
            }
        }
    }

    pub fn count_nodes(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(Node::count_nodes).sum::<usize>())
    }

    /// Collect the cell centers of saturated leaves. A pruned leaf stands for
    /// its whole cube and contributes a single (coarse) center.
    pub fn collect_saturated(
        &self,
        origin: Point3,
        width: f64,
        params: &OccupancyParams,
        occupied: &mut Vec<Point3>,
        free: &mut Vec<Point3>,
    ) {
        match &self.children {
            None => {
                let half = width / 2.0;
                let center = Point3::new(origin.x + half, origin.y + half, origin.z + half);
                if self.log_odds == params.occupied_log_odds {
                    occupied.push(center);
                } else if self.log_odds == params.free_log_odds {
                    free.push(center);
                }
            }
            Some(children) => {
                for (index, child) in children.iter().enumerate() {
                    child.collect_saturated(
                        Self::child_origin(index, origin, width),
                        width / 2.0,
                        params,
                        occupied,
                        free,
                    );
                }
            }
        }
    }
}
