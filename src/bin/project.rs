/// Forward-project an analytic phantom at many orientations

// ----------------------------------- CLI -----------------------------------
use clap::Parser;
use std::path::PathBuf;

use cryoproj::utils::parse_angles;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "project", about = "Project a phantom volume onto a series of 2D images")]
pub struct Cli {

    /// TOML file describing volume, phantom and orientations
    pub config: PathBuf,

    /// Directory where the phantom, projections and reconstruction are written
    #[arg(short, long, default_value = "data/out/project")]
    pub out_dir: PathBuf,

    /// Extra orientation `rot,tilt,psi` in degrees (repeatable)
    #[arg(short, long, value_parser = parse_angles)]
    pub angles: Vec<EulerAngles>,

    /// Also reconstruct the volume by unfiltered back-projection of all projections
    #[arg(long)]
    pub wbp: bool,

    /// Maximum number of rayon threads
    #[arg(short = 'j', long, default_value = "4")]
    pub num_threads: usize,
}
// --------------------------------------------------------------------------------

use std::error::Error;
use std::fs::{create_dir_all, File};
use std::io::{Write, BufWriter};

use indicatif::{ProgressBar, ProgressStyle};

use cryoproj::{EulerAngles, project_volume, single_wbp};
use cryoproj::config::project::read_config_file;
use cryoproj::io::raw::{write_image, write_volume};
use cryoproj::utils::{group_digits, timing::Progress};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Cli::parse();
    let mut progress = Progress::new();

    // Set the maximum number of threads used by rayon for parallel iteration
    match rayon::ThreadPoolBuilder::new().num_threads(args.num_threads).build_global() {
        Err(e) => println!("{}", e),
        Ok(_)  => println!("Using up to {} threads.", args.num_threads),
    }

    progress.start("Reading configuration");
    let config = read_config_file(&args.config)?;
    progress.done();

    let mut orientations = config.projection.orientations();
    orientations.extend(args.angles.iter().copied());
    if orientations.is_empty() {
        return Err("no orientations requested: add `angles` or a `tilt_series` to the configuration".into())
    }
    create_dir_all(&args.out_dir)?;

    // --- Phantom -------------------------------------------------------------------
    progress.start("Rasterising phantom");
    let mut volume = config.volume.empty_volume();
    config.phantom.rasterise_into(&mut volume);
    let [nx, ny, nz] = volume.dims();
    progress.done_with_message(&format!("Rasterised {} voxels", group_digits(nx * ny * nz)));
    if config.phantom.is_empty() { log::warn!("empty phantom: all projections will be zero") }
    write_volume(&volume, &args.out_dir.join("phantom.raw"))?;

    // --- Projections ---------------------------------------------------------------
    let (ydim, xdim) = (config.projection.ydim(), config.projection.xdim());
    log::info!("{} orientations onto {xdim}x{ydim} pixels", orientations.len());
    let bar = ProgressBar::new(orientations.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
                  .template("Projecting: [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")?
    );
    bar.tick();

    let mut reconstruction = args.wbp.then(|| config.volume.empty_volume());
    let mut angles_file = BufWriter::new(File::create(args.out_dir.join("angles.txt"))?);
    for (n, &angles) in orientations.iter().enumerate() {
        let projection = project_volume(&volume, ydim, xdim, angles);
        write_image(projection.image(), &args.out_dir.join(format!("proj_{n:03}.raw")))?;
        let [rot, tilt, psi] = [angles.rot, angles.tilt, angles.psi].map(units::deg_);
        writeln!(angles_file, "proj_{n:03}.raw {rot:9.3} {tilt:9.3} {psi:9.3}")?;
        if let Some(reconstruction) = reconstruction.as_mut() {
            single_wbp(reconstruction, &projection);
        }
        bar.inc(1);
    }
    bar.finish();
    angles_file.flush()?;
    progress.done_with_message(&format!("Wrote {} projections to {}", orientations.len(), args.out_dir.display()));

    // --- Reconstruction ------------------------------------------------------------
    if let Some(reconstruction) = reconstruction {
        write_volume(&reconstruction, &args.out_dir.join("wbp.raw"))?;
        progress.done_with_message("Wrote back-projected volume");
    }
    Ok(())
}
