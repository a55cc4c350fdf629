use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use crate::{
    geometry::{Ray, WorldPoint},
    grid::Grid,
    tracer::{
        ConcurrentCollector, Dispatch, HitCollector, SequentialCollector, TraceSettings,
        WorkerCount, worker::Worker,
    },
};

/// Number of processed and total chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceProgress {
    pub finished: usize,
    pub total: usize,
}

/// Intersects every ray with the grid and returns all hit points.
/// Order of the points is only defined for sequential dispatch.
/// `on_chunk_finished` may get called from worker threads.
pub fn trace_rays<F: Fn(TraceProgress) + Sync>(
    grid: &Grid,
    rays: &[Ray],
    settings: &TraceSettings,
    on_chunk_finished: F,
) -> anyhow::Result<Vec<WorldPoint>> {
    let state = TraceState::new(grid, rays, settings);

    match settings.dispatch {
        Dispatch::Sequential => {
            let collector = SequentialCollector::default();
            let mut worker = Worker::new();
            while let Some(chunk) = state.get_next_chunk() {
                worker.trace_chunk(grid, chunk, &collector);
                on_chunk_finished(state.finish_chunk());
            }
            Ok(collector.into_points())
        }
        Dispatch::Parallel(worker_count) => {
            let collector = ConcurrentCollector::default();
            run_workers(&state, worker_count, &collector, &on_chunk_finished)?;
            Ok(collector.into_points())
        }
    }
}

fn run_workers<F: Fn(TraceProgress) + Sync>(
    state: &TraceState,
    worker_count: WorkerCount,
    collector: &ConcurrentCollector,
    on_chunk_finished: &F,
) -> anyhow::Result<()> {
    let cores = core_affinity::get_core_ids().unwrap_or_default();
    let worker_count = match worker_count {
        WorkerCount::Auto if !cores.is_empty() => cores.len(),
        WorkerCount::Auto => thread::available_parallelism().map_or(1, NonZeroUsize::get),
        WorkerCount::Manual(n) => n.get(),
    };
    log::debug!(
        "Tracing {} chunks on {} workers",
        state.chunk_count,
        worker_count
    );

    thread::scope(|scope| -> anyhow::Result<()> {
        let threads = (0..worker_count)
            .map(|worker_id| {
                let core = cores.get(worker_id).copied();
                thread::Builder::new()
                    .name(format!("worker{worker_id}"))
                    .spawn_scoped(scope, move || {
                        if let Some(core) = core {
                            core_affinity::set_for_current(core);
                        }

                        let mut worker = Worker::new();
                        while let Some(chunk) = state.get_next_chunk() {
                            worker.trace_chunk(state.grid, chunk, collector);
                            on_chunk_finished(state.finish_chunk());
                        }
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for handle in threads {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("Worker thread panicked"))?;
        }
        Ok(())
    })
}

struct TraceState<'a> {
    grid: &'a Grid,
    rays: &'a [Ray],
    chunk_size: usize,
    chunk_count: usize,

    next_chunk_index: AtomicUsize,
    finished_chunks: AtomicUsize,
}

impl<'a> TraceState<'a> {
    fn new(grid: &'a Grid, rays: &'a [Ray], settings: &TraceSettings) -> Self {
        let chunk_size = settings.chunk_size.get() as usize;
        TraceState {
            grid,
            rays,
            chunk_size,
            chunk_count: rays.len().div_ceil(chunk_size),
            next_chunk_index: AtomicUsize::new(0),
            finished_chunks: AtomicUsize::new(0),
        }
    }

    fn get_next_chunk(&self) -> Option<&'a [Ray]> {
        let id = self.next_chunk_index.fetch_add(1, Ordering::AcqRel);
        if id >= self.chunk_count {
            return None;
        }
        let start = id * self.chunk_size;
        let end = (start + self.chunk_size).min(self.rays.len());
        Some(&self.rays[start..end])
    }

    fn finish_chunk(&self) -> TraceProgress {
        let finished = self.finished_chunks.fetch_add(1, Ordering::AcqRel) + 1;
        TraceProgress {
            finished,
            total: self.chunk_count,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::WorldVector;
    use crate::grid::test::random_grid;

    use assert2::assert;
    use ordered_float::OrderedFloat;
    use rand::{Rng, SeedableRng, rngs::SmallRng};
    use std::{num::NonZeroU32, sync::Mutex};
    use test_case::test_case;

    fn random_rays(seed: u64, count: usize) -> Vec<Ray> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let origin = WorldPoint::new(
                    rng.random_range(-20.0..20.0),
                    rng.random_range(-20.0..20.0),
                    20.0,
                );
                let direction = WorldVector::new(
                    rng.random_range(-0.5..0.5),
                    rng.random_range(-0.5..0.5),
                    -1.0,
                );
                Ray::new(origin, direction)
            })
            .collect()
    }

    fn sorted(mut points: Vec<WorldPoint>) -> Vec<WorldPoint> {
        points.sort_by_key(|p| (OrderedFloat(p.x), OrderedFloat(p.y), OrderedFloat(p.z)));
        points
    }

    fn settings(chunk_size: u32, dispatch: Dispatch) -> TraceSettings {
        TraceSettings {
            chunk_size: NonZeroU32::new(chunk_size).unwrap(),
            dispatch,
        }
    }

    #[test]
    fn sequential_matches_single_queries() {
        let grid = random_grid(21, 500);
        let rays = random_rays(21, 300);

        let expected: Vec<_> = rays.iter().flat_map(|r| grid.intersect(r)).collect();
        let points =
            trace_rays(&grid, &rays, &settings(7, Dispatch::Sequential), |_| {}).unwrap();

        assert!(!expected.is_empty());
        assert!(points == expected);
    }

    #[test_case(WorkerCount::Auto, 16)]
    #[test_case(WorkerCount::Manual(NonZeroUsize::new(1).unwrap()), 1)]
    #[test_case(WorkerCount::Manual(NonZeroUsize::new(3).unwrap()), 5)]
    #[test_case(WorkerCount::Manual(NonZeroUsize::new(8).unwrap()), 1000)]
    fn parallel_matches_sequential(worker_count: WorkerCount, chunk_size: u32) {
        let grid = random_grid(22, 1000);
        let rays = random_rays(22, 500);

        let sequential =
            trace_rays(&grid, &rays, &settings(chunk_size, Dispatch::Sequential), |_| {})
                .unwrap();
        let parallel = trace_rays(
            &grid,
            &rays,
            &settings(chunk_size, Dispatch::Parallel(worker_count)),
            |_| {},
        )
        .unwrap();

        assert!(sorted(parallel) == sorted(sequential));
    }

    #[test_case(Dispatch::Sequential)]
    #[test_case(Dispatch::Parallel(WorkerCount::Manual(NonZeroUsize::new(4).unwrap())))]
    fn progress_reaches_total(dispatch: Dispatch) {
        let grid = random_grid(23, 100);
        let rays = random_rays(23, 95);
        let reports = Mutex::new(Vec::new());

        trace_rays(&grid, &rays, &settings(10, dispatch), |progress| {
            reports.lock().unwrap().push(progress);
        })
        .unwrap();

        let mut reports = reports.into_inner().unwrap();
        reports.sort_by_key(|p| p.finished);
        assert!(reports.len() == 10);
        for (i, p) in reports.iter().enumerate() {
            assert!(p.total == 10);
            assert!(p.finished == i + 1);
        }
    }

    #[test]
    fn no_rays() {
        let grid = random_grid(24, 10);
        let points = trace_rays(&grid, &[], &TraceSettings::default(), |_| {
            panic!("No chunks to finish")
        })
        .unwrap();
        assert!(points.is_empty());
    }
}
