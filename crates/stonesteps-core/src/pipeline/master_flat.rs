use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::calibrate::{calibrate, CalibrationPair};
use crate::consts::MASTER_FLAT_SUFFIX;
use crate::error::{Result, StoneStepsError};
use crate::frame::{derived_path, Frame};
use crate::io::fits::{read_fits, read_fits_header, write_fits};
use crate::normalize::flat_scale_factors;
use crate::stack::combine;

use super::auxiliary::resolve_aux;
use super::config::MasterFlatConfig;
use super::helpers::{input_stem, load_frames_reported, output_dir};
use super::types::{NoOpReporter, ProgressReporter, StepOutput, StepStage};

/// Build a master flat from raw flats and a matched bias/dark pair.
///
/// Each flat is bias- and scaled-dark-subtracted. With several flats, each
/// is then scaled to a median of 10000 and the set is combined.
pub fn make_master_flat(
    flats: &[Frame],
    calibration: &CalibrationPair,
    config: &MasterFlatConfig,
) -> Result<Frame> {
    make_master_flat_reported(flats, calibration, config, &NoOpReporter)
}

pub fn make_master_flat_reported(
    flats: &[Frame],
    calibration: &CalibrationPair,
    config: &MasterFlatConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Frame> {
    if flats.is_empty() {
        error!("Flat calibration frame not found.");
        return Err(StoneStepsError::EmptyInput("flat".into()));
    }
    debug!("Creating master flat frame...");

    reporter.begin_stage(StepStage::Calibrating, Some(flats.len()));
    let mut calibrated = Vec::with_capacity(flats.len());
    for (i, flat) in flats.iter().enumerate() {
        calibrated.push(calibrate(flat, calibration)?);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    let mut master = if calibrated.len() == 1 {
        calibrated.swap_remove(0)
    } else {
        reporter.begin_stage(StepStage::Normalizing, None);
        let scales = flat_scale_factors(&calibrated)?;
        reporter.finish_stage();
        debug!("Flat scale factors: {:?}", scales);

        reporter.begin_stage(StepStage::Combining, None);
        let combined = combine(&calibrated, config.combine_method, Some(&scales))?;
        reporter.finish_stage();
        combined
    };

    master.header = flats[0].header.clone();
    master
        .header
        .push_history(format!("MasterFlat: {} files used", flats.len()));
    Ok(master)
}

/// Resolve the bias and dark, build the master flat and write
/// `<stem>_MFLAT.fits`.
pub fn run_master_flat(inputs: &[PathBuf], config: &MasterFlatConfig) -> Result<StepOutput> {
    run_master_flat_reported(inputs, config, &NoOpReporter)
}

pub fn run_master_flat_reported(
    inputs: &[PathBuf],
    config: &MasterFlatConfig,
    reporter: &dyn ProgressReporter,
) -> Result<StepOutput> {
    config.validate()?;
    let Some(first) = inputs.first() else {
        error!("Flat calibration frame not found.");
        return Err(StoneStepsError::EmptyInput("flat".into()));
    };

    reporter.begin_stage(StepStage::Resolving, Some(2));
    let reference = read_fits_header(first)?;
    let base_dir = output_dir(first, None)?;
    let bias_path = resolve_aux("bias", &config.bias, &reference, &base_dir)?;
    reporter.advance(1);
    let dark_path = resolve_aux("dark", &config.dark, &reference, &base_dir)?;
    reporter.advance(2);
    reporter.finish_stage();
    info!(
        "Using bias {} and dark {}",
        bias_path.display(),
        dark_path.display()
    );
    let calibration = CalibrationPair::new(read_fits(&bias_path)?, read_fits(&dark_path)?);

    let flats = load_frames_reported(inputs, reporter)?;
    let master = make_master_flat_reported(&flats, &calibration, config, reporter)?;

    let dir = output_dir(first, config.output_folder.as_deref())?;
    let path = derived_path(
        &dir,
        &input_stem(first),
        &format!("_{MASTER_FLAT_SUFFIX}"),
        "fits",
    );

    reporter.begin_stage(StepStage::Writing, None);
    write_fits(&master, &path, config.output_format)?;
    reporter.finish_stage();

    info!(
        "Master flat from {} files written to {}",
        flats.len(),
        path.display()
    );
    Ok(StepOutput {
        path,
        frame_count: flats.len(),
        cube: None,
    })
}
