use std::cell::RefCell;

use crossbeam_queue::SegQueue;

use crate::geometry::WorldPoint;

/// Destination for intersection points found while tracing.
pub trait HitCollector {
    fn extend(&self, hits: impl IntoIterator<Item = WorldPoint>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_points(self) -> Vec<WorldPoint>;
}

/// Collector for a single thread, keeps the insertion order.
#[derive(Debug, Default)]
pub struct SequentialCollector {
    points: RefCell<Vec<WorldPoint>>,
}

impl HitCollector for SequentialCollector {
    fn extend(&self, hits: impl IntoIterator<Item = WorldPoint>) {
        self.points.borrow_mut().extend(hits);
    }

    fn len(&self) -> usize {
        self.points.borrow().len()
    }

    fn into_points(self) -> Vec<WorldPoint> {
        self.points.into_inner()
    }
}

/// Lock free collector shared by worker threads.
/// Points from different threads interleave in arbitrary order.
#[derive(Debug, Default)]
pub struct ConcurrentCollector {
    points: SegQueue<WorldPoint>,
}

impl HitCollector for ConcurrentCollector {
    fn extend(&self, hits: impl IntoIterator<Item = WorldPoint>) {
        for point in hits {
            self.points.push(point);
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn into_points(self) -> Vec<WorldPoint> {
        let mut ret = Vec::with_capacity(self.points.len());
        while let Some(point) = self.points.pop() {
            ret.push(point);
        }
        ret
    }
}
