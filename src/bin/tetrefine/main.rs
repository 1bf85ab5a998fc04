//! tetrefine CLI - local tetrahedral refinement on generated box meshes.
//!
//! Usage: tetrefine <COMMAND> [OPTIONS]
//!
//! Run `tetrefine --help` for available commands.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::{Point3, Vector3};

use tetrefine::algo::refine::{
    edge_bit, refine_with_progress, CaseTable, Orientation, RefineOptions, RefinementCriterion,
};
use tetrefine::algo::Progress;
use tetrefine::mesh::{build_box_mesh, BoxSpec, TetMesh, TET_EDGES};

#[derive(Parser)]
#[command(name = "tetrefine")]
#[command(author, version, about = "Local tetrahedral mesh refinement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refine a generated box mesh
    Refine {
        /// Number of cubes along x, y and z
        #[arg(long, num_args = 3, value_names = ["NX", "NY", "NZ"], default_values_t = [4, 4, 4])]
        cells: Vec<usize>,

        /// Edge length of the box
        #[arg(long, default_value = "1.0")]
        size: f64,

        /// Elements whose centroid lies within this radius of the box centre get value 1
        #[arg(long, default_value = "0.25")]
        sphere_radius: f64,

        /// Selection criterion
        #[arg(short, long, value_enum, default_value = "iso")]
        criterion: Criterion,

        /// Target field value (iso criterion)
        #[arg(long, default_value = "1.0")]
        iso_value: f64,

        /// Split elements with a longer edge (edge-length criterion)
        #[arg(long, default_value = "0.0")]
        edge_length: f64,

        /// Split elements with a larger volume (volume criterion)
        #[arg(long, default_value = "0.0")]
        volume: f64,

        /// Smallest dihedral angle in degrees (dihedral criterion)
        #[arg(long, default_value = "0.0")]
        dihedral_min: f64,

        /// Largest dihedral angle in degrees (dihedral criterion)
        #[arg(long, default_value = "180.0")]
        dihedral_max: f64,

        /// Do not split elements touching the surface
        #[arg(long)]
        skip_surface: bool,

        /// Generate and refine negatively wound elements
        #[arg(long)]
        inverted: bool,

        /// Only split elements with value 1 that also pass the criterion
        #[arg(long)]
        preselect: bool,

        /// Maximum number of refinement iterations
        #[arg(short, long, default_value = "5")]
        iterations: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Print the subdivision case table
    Cases {
        /// Print the table for negatively wound elements
        #[arg(long)]
        inverted: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Criterion {
    /// Field value equals the iso value
    Iso,
    /// Longest edge exceeds the edge length
    EdgeLength,
    /// Volume exceeds the volume threshold
    Volume,
    /// All dihedral angles within the given range
    Dihedral,
}

impl From<Criterion> for RefinementCriterion {
    fn from(c: Criterion) -> Self {
        match c {
            Criterion::Iso => RefinementCriterion::IsoValue,
            Criterion::EdgeLength => RefinementCriterion::EdgeLength,
            Criterion::Volume => RefinementCriterion::Volume,
            Criterion::Dihedral => RefinementCriterion::DihedralAngle,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Refine {
            cells,
            size,
            sphere_radius,
            criterion,
            iso_value,
            edge_length,
            volume,
            dihedral_min,
            dihedral_max,
            skip_surface,
            inverted,
            preselect,
            iterations,
            sequential,
        } => {
            let spec = BoxSpec::unit(1)
                .with_cells(cells[0], cells[1], cells[2])
                .with_size(Vector3::new(size, size, size));
            let options = RefineOptions::default()
                .with_criterion(criterion.into())
                .with_iso_value(iso_value)
                .with_edge_length(edge_length)
                .with_volume(volume)
                .with_dihedral_range(dihedral_min, dihedral_max)
                .with_skip_surface_elements(skip_surface)
                .with_inverted_ordering(inverted)
                .with_field_preselection(preselect)
                .with_max_iterations(iterations)
                .with_parallel(!sequential);
            cmd_refine(&spec, sphere_radius, &options)?;
        }

        Commands::Cases { inverted } => {
            cmd_cases(inverted);
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0)); // Track highest percent seen (monotonic)

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only move forward; an early stop jumps straight to 100.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        let percent = previous.max(raw_percent);
        if percent == previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        // Pad to clear longer messages from the previous update.
        eprint!("\r[{}{}] {:3}% {:<32}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

/// Build the box mesh; elements near the centre carry value 1.
fn build_input(spec: &BoxSpec, sphere_radius: f64, inverted: bool) -> tetrefine::error::Result<TetMesh> {
    let centre = spec.origin + spec.size * 0.5;
    let mesh = build_box_mesh(spec, |c: &Point3<f64>| {
        if (c - centre).norm() <= sphere_radius {
            1.0
        } else {
            0.0
        }
    })?;
    if !inverted {
        return Ok(mesh);
    }

    let mut flipped = TetMesh::with_capacity(mesh.num_nodes(), mesh.num_elems());
    for p in mesh.nodes() {
        flipped.add_point(*p);
    }
    for (e, &[a, b, c, d]) in mesh.elems().iter().enumerate() {
        flipped.add_elem([b, a, c, d], mesh.value(e));
    }
    Ok(flipped)
}

fn volume_range(mesh: &TetMesh) -> (f64, f64, f64) {
    (0..mesh.num_elems())
        .map(|e| mesh.signed_volume(e))
        .fold((f64::INFINITY, f64::NEG_INFINITY, 0.0), |(lo, hi, sum), v| {
            (lo.min(v), hi.max(v), sum + v)
        })
}

fn cmd_refine(
    spec: &BoxSpec,
    sphere_radius: f64,
    options: &RefineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = build_input(spec, sphere_radius, options.inverted_ordering)?;
    let marked = mesh.values().iter().filter(|&&v| v == 1.0).count();

    println!(
        "Input: {} nodes, {} elements ({} with value 1)",
        mesh.num_nodes(),
        mesh.num_elems(),
        marked
    );

    let mode = if options.parallel { "parallel" } else { "sequential" };
    println!(
        "Refining by {} (at most {} iterations, {})...",
        options.criterion.name(),
        options.max_iterations,
        mode
    );

    let progress = create_progress();
    let start = Instant::now();
    let result = refine_with_progress(&mesh, options, &progress)?;
    let elapsed = start.elapsed();

    let (min_vol, max_vol, total_vol) = volume_range(&result.mesh);
    println!(
        "Result: {} nodes, {} elements after {} iterations ({:.2?})",
        result.report.nodes, result.report.elems, result.report.iterations, elapsed
    );
    println!("Stopped: {:?}", result.report.termination);
    println!(
        "Element volume range: [{:.6e}, {:.6e}], total {:.6}",
        min_vol, max_vol, total_vol
    );
    for remark in &result.report.remarks {
        println!("  {}", remark);
    }

    Ok(())
}

fn cmd_cases(inverted: bool) {
    let table = CaseTable::new(Orientation::from_inverted(inverted));
    println!("{:>4}  {:<36}  {:<9}  {:<5}  {:>8}", "code", "cut edges", "recode", "case", "children");
    for (code, row) in table.rows() {
        let edges: Vec<String> = TET_EDGES
            .iter()
            .enumerate()
            .filter(|&(k, _)| (code & edge_bit(k) as usize) != 0)
            .map(|(_, (a, b))| format!("{}-{}", a, b))
            .collect();
        let recode = row.recode.map(|c| c.to_string()).join(" ");
        println!(
            "{:>4}  {:<36}  {:<9}  {:<5}  {:>8}",
            code,
            edges.join(", "),
            recode,
            row.case.name(),
            row.child_count()
        );
    }
}
