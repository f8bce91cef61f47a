use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use matmul_farm::matrix::{self, Matrix};
use matmul_farm::mpi_link::MpiLink;
use matmul_farm::transport::ROOT_RANK;
use matmul_farm::{root, worker, Result};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Matrix dimension
    #[arg(short = 'n', default_value_t = 8)]
    dimension: usize,

    /// How to populate the operands when no input file is given
    #[arg(long, value_enum, default_value = "fixed")]
    fill: Fill,

    /// JSON file holding the operands, shaped {"a": [[..]], "b": [[..]]}
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print the result matrix
    #[arg(short = 'p', action)]
    print: bool,

    /// Write the result matrix to a JSON file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Fill {
    /// All of a holds 1.0, all of b holds 2.0
    Fixed,
    Random,
}

fn main() {
    let args = Args::parse();

    let universe = mpi::initialize().unwrap();
    let world = universe.world();

    let mut link = MpiLink::new(&world);

    if world.rank() == ROOT_RANK {
        if let Err(e) = manage(&mut link, &world, &args) {
            eprintln!("{e}");
            world.abort(1);
        }
    } else if let Err(e) = serve(&mut link, &args) {
        eprintln!("worker {}: {e}", world.rank());
        world.abort(1);
    }
}

fn manage(link: &mut MpiLink, world: &SimpleCommunicator, args: &Args) -> Result<()> {
    let (a, b) = match &args.input {
        Some(path) => matrix::load_pair(path)?,
        None => operands(args),
    };
    let n = a.rows();
    let workers = link.workers();

    println!(
        "Multiplying a {} by {} matrix using {} processes.",
        n,
        n,
        world.size()
    );

    let start_time = mpi::time();
    let product = root::multiply(link, &a, &b, workers)?;
    let elapsed = mpi::time() - start_time;

    if args.print {
        println!("{product}");
    }
    if let Some(path) = &args.output {
        matrix::save(&product, path)?;
    }
    println!("It took {elapsed} seconds to finish!");

    Ok(())
}

fn serve(link: &mut MpiLink, args: &Args) -> Result<()> {
    let n = match &args.input {
        // every rank reads the file, so workers learn the dimension
        // without an extra message
        Some(path) => dimension_of(path)?,
        None => args.dimension,
    };
    worker::serve::<f64, _>(link, n)
}

fn operands(args: &Args) -> (Matrix<f64>, Matrix<f64>) {
    let n = args.dimension;
    match args.fill {
        Fill::Fixed => (Matrix::filled(n, n, 1.0), Matrix::filled(n, n, 2.0)),
        Fill::Random => (Matrix::random(n, n), Matrix::random(n, n)),
    }
}

fn dimension_of(path: &Path) -> Result<usize> {
    let (a, _) = matrix::load_pair::<f64>(path)?;
    Ok(a.rows())
}
