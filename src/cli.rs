use std::{fs::File, io::BufWriter, num::NonZeroU32, path::PathBuf, time::Instant};

use anyhow::Context as _;
use clap::Parser;
use gridtrace::{
    geometry::{FloatType, WorldBox, WorldPoint},
    grid::{Grid, GridConfig},
    input,
    tracer::{Dispatch, TraceSettings, trace_rays},
};
use indicatif::ProgressBar;

/// Intersects rays with a triangle soup and writes out all intersection points.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Args {
    /// Triangles, either in the binary format or a Wavefront .obj file
    geometry: PathBuf,

    /// Rays in the binary format
    rays: PathBuf,

    /// Output text file with the intersection points
    output: PathBuf,

    /// Target number of grid cells per triangle
    #[arg(long, default_value_t = 2.0)]
    density: FloatType,

    /// Margin around the triangles covered by the grid
    #[arg(long, default_value_t = 1.0)]
    expand: FloatType,

    /// Tolerance for rays parallel to an axis or to a triangle
    #[arg(long, default_value_t = gridtrace::geometry::EPSILON)]
    epsilon: FloatType,

    /// Use a fixed cube of this half extent around the origin as the scene bounds,
    /// instead of the tight box around the triangles
    #[arg(long, value_name = "HALF_EXTENT")]
    bounds: Option<FloatType>,

    /// Number of worker threads, 0 uses all cores, 1 runs on the main thread
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Number of rays a worker takes at once
    #[arg(long, default_value_t = TraceSettings::default().chunk_size)]
    chunk_size: NonZeroU32,

    /// Sort the output points, for output that does not depend on the thread count
    #[arg(long)]
    sorted: bool,

    /// Log statistics of the grid
    #[arg(long)]
    stats: bool,
}

impl Args {
    fn grid_config(&self) -> anyhow::Result<GridConfig> {
        anyhow::ensure!(
            self.density.is_finite() && self.density > 0.0,
            "Density must be positive"
        );
        anyhow::ensure!(
            self.expand.is_finite() && self.expand > 0.0,
            "Expand increment must be positive"
        );
        anyhow::ensure!(
            self.epsilon.is_finite() && self.epsilon >= 0.0,
            "Epsilon must not be negative"
        );

        Ok(GridConfig::builder()
            .density(self.density)
            .expand_increment(self.expand)
            .epsilon(self.epsilon)
            .build())
    }

    fn bounds(&self) -> anyhow::Result<Option<WorldBox>> {
        let Some(h) = self.bounds else {
            return Ok(None);
        };
        anyhow::ensure!(h.is_finite() && h > 0.0, "Bounds half extent must be positive");
        Ok(Some(WorldBox::new(
            WorldPoint::new(-h, -h, -h),
            WorldPoint::new(h, h, h),
        )))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.grid_config()?;
    let bounds = args.bounds()?;
    let settings = TraceSettings {
        chunk_size: args.chunk_size,
        dispatch: Dispatch::from_thread_count(args.threads),
    };

    let start = Instant::now();
    let triangles = input::read_triangles(&args.geometry)
        .with_context(|| format!("Loading geometry from {}", args.geometry.display()))?;
    let rays = input::read_rays(&args.rays)
        .with_context(|| format!("Loading rays from {}", args.rays.display()))?;
    log::info!(
        "Read {} triangles and {} rays in {:.2?}",
        triangles.len(),
        rays.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let grid = match &bounds {
        Some(bounds) => Grid::new(triangles, bounds, &config)?,
        None => Grid::from_triangles(triangles, &config)?,
    };
    log::info!("Built grid in {:.2?}", start.elapsed());
    if args.stats {
        grid.log_statistics();
    }

    let start = Instant::now();
    let bar = ProgressBar::no_length();
    let mut points = trace_rays(&grid, &rays, &settings, {
        let bar = bar.clone();
        move |progress| {
            bar.update(|ps| {
                ps.set_len(progress.total as u64);
                ps.set_pos(progress.finished as u64)
            })
        }
    })?;
    bar.finish_and_clear();
    log::info!(
        "Found {} intersections in {:.2?} ({:?})",
        points.len(),
        start.elapsed(),
        settings.dispatch
    );

    let start = Instant::now();
    if args.sorted {
        input::sort_points(&mut points);
    }
    let file = File::create(&args.output)
        .with_context(|| format!("Creating {}", args.output.display()))?;
    input::write_points(BufWriter::new(file), &points)?;
    log::info!("Wrote {} in {:.2?}", args.output.display(), start.elapsed());

    Ok(())
}
