use crate::point::Point3;

/// Discretization of one sensor beam into evidence samples.
///
/// Walks from the sensor origin toward the measured endpoint in fixed
/// increments of the map resolution, yielding `ceil(length / resolution)`
/// miss samples (free-space evidence, starting at the origin itself) followed
/// by exactly one hit sample at the unrounded endpoint. A zero-length beam
/// yields the hit sample only.
///
/// Samples are not deduplicated per voxel: a beam at a shallow angle may
/// visit the same voxel twice, which simply counts as two pieces of
/// free-space evidence.
pub(crate) struct BeamSamples {
    origin: Point3,
    end: Point3,
    step: Point3,
    misses: u32,
    emitted: u32,
    hit_emitted: bool,
    miss_log_odds: f64,
    hit_log_odds: f64,
}

impl BeamSamples {
    pub fn new(
        origin: Point3,
        end: Point3,
        resolution: f64,
        miss_log_odds: f64,
        hit_log_odds: f64,
    ) -> BeamSamples {
        let length = origin.distance(end);
        let misses = if length == 0.0 {
            0
        } else {
            (length / resolution).ceil() as u32
        };
        let step = if misses == 0 {
            Point3::new(0.0, 0.0, 0.0)
        } else {
            let scale = resolution / length;
            Point3::new(
                (end.x - origin.x) * scale,
                (end.y - origin.y) * scale,
                (end.z - origin.z) * scale,
            )
        };
        BeamSamples {
            origin,
            end,
            step,
            misses,
            emitted: 0,
            hit_emitted: false,
            miss_log_odds,
            hit_log_odds,
        }
    }
}

impl Iterator for BeamSamples {
    type Item = (Point3, f64);

    fn next(&mut self) -> Option<(Point3, f64)> {
        if self.emitted < self.misses {
            let i = f64::from(self.emitted);
            self.emitted += 1;
            let point = Point3::new(
                self.origin.x + self.step.x * i,
                self.origin.y + self.step.y * i,
                self.origin.z + self.step.z * i,
            );
            Some((point, self.miss_log_odds))
        } else if !self.hit_emitted {
            self.hit_emitted = true;
            Some((self.end, self.hit_log_odds))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining =
            u64::from(self.misses - self.emitted) + u64::from(!self.hit_emitted);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BeamSamples {}
