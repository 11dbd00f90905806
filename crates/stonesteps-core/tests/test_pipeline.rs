mod common;

use std::path::PathBuf;

use approx::assert_abs_diff_eq;

use common::{frame_from_rows, real, text, uniform_frame, write_test_fits};
use stonesteps_core::calibrate::CalibrationPair;
use stonesteps_core::error::StoneStepsError;
use stonesteps_core::frame::SampleFormat;
use stonesteps_core::io::fits::{read_fits, read_fits_header};
use stonesteps_core::io::image_io::RasterFormat;
use stonesteps_core::pipeline::config::{MasterBiasConfig, MasterFlatConfig, RgbConfig};
use stonesteps_core::pipeline::{
    make_master_bias, make_master_flat, make_rgb, run_master_bias, run_master_flat, run_rgb,
};
use stonesteps_core::stack::CombineMethod;

fn no_font_config() -> RgbConfig {
    RgbConfig {
        font_path: PathBuf::from("/nonexistent/fonts/label.ttf"),
        ..RgbConfig::default()
    }
}

#[test]
fn test_master_bias_history() {
    let frames = vec![
        uniform_frame(2, 2, 100.0, &[("INSTRUME", text("CAM1"))]),
        uniform_frame(2, 2, 104.0, &[]),
        uniform_frame(2, 2, 101.0, &[]),
    ];
    let master = make_master_bias(&frames, &MasterBiasConfig::default()).unwrap();
    assert_abs_diff_eq!(master.data[[0, 0]], 101.0);
    assert_eq!(master.header.get_str("INSTRUME"), Some("CAM1"));
    assert_eq!(master.header.history()[0], "MasterBias: 3 files used");
}

#[test]
fn test_master_bias_empty() {
    let err = make_master_bias(&[], &MasterBiasConfig::default()).unwrap_err();
    assert!(matches!(err, StoneStepsError::EmptyInput(_)));
    assert!(run_master_bias(&[], &MasterBiasConfig::default()).is_err());
}

#[test]
fn test_run_master_bias_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let inputs: Vec<PathBuf> = [100.0, 102.0]
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            write_test_fits(
                dir.path(),
                &format!("bias_{i:03}.fits"),
                &uniform_frame(4, 3, v, &[("EXPTIME", real(0.0))]),
            )
        })
        .collect();

    let config = MasterBiasConfig {
        combine_method: CombineMethod::Average,
        output_folder: Some(dir.path().join("masters")),
        output_format: SampleFormat::U16,
    };
    let output = run_master_bias(&inputs, &config).unwrap();
    assert_eq!(output.path, dir.path().join("masters").join("bias_000_MBIAS.fits"));
    assert_eq!(output.frame_count, 2);

    let master = read_fits(&output.path).unwrap();
    assert_eq!(master.dim(), (4, 3));
    assert_eq!(master.source_format, SampleFormat::U16);
    assert_abs_diff_eq!(master.data[[3, 2]], 101.0);
    assert_eq!(
        master.header.history(),
        ["MasterBias: 2 files used", "MasterBias: combine method average"]
    );
}

#[test]
fn test_make_master_flat_normalizes() {
    let pair = CalibrationPair::new(
        uniform_frame(2, 2, 100.0, &[]),
        uniform_frame(2, 2, 10.0, &[("EXPTIME", real(10.0))]),
    );
    let flats = vec![
        frame_from_rows(&[&[1105.0, 1105.0], &[1105.0, 2105.0]], &[("EXPTIME", real(5.0))]),
        frame_from_rows(&[&[2105.0, 2105.0], &[2105.0, 4105.0]], &[("EXPTIME", real(5.0))]),
    ];
    let master = make_master_flat(&flats, &pair, &MasterFlatConfig::default()).unwrap();
    assert_abs_diff_eq!(master.data[[0, 0]], 10_000.0, epsilon = 1e-2);
    assert_abs_diff_eq!(master.data[[1, 1]], 20_000.0, epsilon = 1e-2);
    assert_eq!(master.header.history(), ["MasterFlat: 2 files used"]);
}

#[test]
fn test_single_flat_only_calibrated() {
    let pair = CalibrationPair::new(
        uniform_frame(1, 2, 100.0, &[]),
        uniform_frame(1, 2, 10.0, &[("EXPTIME", real(10.0))]),
    );
    let flats = vec![frame_from_rows(&[&[600.0, 700.0]], &[("EXPTIME", real(10.0))])];
    let master = make_master_flat(&flats, &pair, &MasterFlatConfig::default()).unwrap();
    assert_abs_diff_eq!(master.data[[0, 0]], 490.0);
    assert_abs_diff_eq!(master.data[[0, 1]], 590.0);
}

#[test]
fn test_run_master_flat_resolves_calibration_files() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();

    // only the CAM1 bias matches the flats
    write_test_fits(d, "a_MBIAS.fits", &uniform_frame(2, 2, 300.0, &[("INSTRUME", text("CAM2"))]));
    write_test_fits(d, "b_MBIAS.fits", &uniform_frame(2, 2, 100.0, &[("INSTRUME", text("CAM1"))]));
    // no dark matches INSTRUME, so the key set is relaxed
    write_test_fits(
        d,
        "x_MDARK.fits",
        &uniform_frame(2, 2, 10.0, &[("INSTRUME", text("CAM9")), ("EXPTIME", real(10.0))]),
    );

    let flat_cards = [("INSTRUME", text("CAM1")), ("EXPTIME", real(5.0))];
    let inputs = vec![
        write_test_fits(
            d,
            "flat_001.fits",
            &frame_from_rows(&[&[1105.0, 1105.0], &[1105.0, 2105.0]], &flat_cards),
        ),
        write_test_fits(
            d,
            "flat_002.fits",
            &frame_from_rows(&[&[2105.0, 2105.0], &[2105.0, 4105.0]], &flat_cards),
        ),
    ];

    let output = run_master_flat(&inputs, &MasterFlatConfig::default()).unwrap();
    assert_eq!(output.path, d.join("flat_001_MFLAT.fits"));

    let master = read_fits(&output.path).unwrap();
    assert_abs_diff_eq!(master.data[[0, 1]], 10_000.0, epsilon = 1e-2);
    assert_abs_diff_eq!(master.data[[1, 1]], 20_000.0, epsilon = 1e-2);
    assert_eq!(master.header.get_str("INSTRUME"), Some("CAM1"));
    assert_eq!(master.header.history(), ["MasterFlat: 2 files used"]);
}

#[test]
fn test_run_master_flat_without_bias_fails() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    write_test_fits(d, "x_MDARK.fits", &uniform_frame(2, 2, 10.0, &[("EXPTIME", real(10.0))]));
    let inputs = vec![write_test_fits(
        d,
        "flat_001.fits",
        &uniform_frame(2, 2, 1000.0, &[("EXPTIME", real(5.0))]),
    )];
    let err = run_master_flat(&inputs, &MasterFlatConfig::default()).unwrap_err();
    assert!(matches!(err, StoneStepsError::EmptyInput(ref kind) if kind == "bias"));
}

#[test]
fn test_run_rgb_without_font_still_writes() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    let inputs: Vec<PathBuf> = [("r", 10.0), ("g", 20.0), ("b", 30.0)]
        .iter()
        .map(|&(band, v)| {
            let frame = frame_from_rows(
                &[&[v, v + 5.0, v + 10.0], &[v + 15.0, v + 20.0, v + 25.0]],
                &[("FILTER", text(band))],
            );
            write_test_fits(d, &format!("m51_{band}.fits"), &frame)
        })
        .collect();

    let config = RgbConfig {
        image_format: RasterFormat::Png,
        save_cube: true,
        ..no_font_config()
    };
    let output = run_rgb(&inputs, &config).unwrap();
    assert_eq!(output.path, d.join("m51_r.png"));
    assert_eq!(output.frame_count, 3);

    let img = image::open(&output.path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (3, 2));

    let cube = output.cube.unwrap();
    assert_eq!(cube, d.join("m51_r_cube.fits"));
    let cube_header = read_fits_header(&cube).unwrap();
    assert_eq!(cube_header.get_f64("COMPLETE"), Some(1.0));
}

#[test]
fn test_run_rgb_default_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let inputs: Vec<PathBuf> = ["r", "g", "b"]
        .iter()
        .map(|band| {
            write_test_fits(
                dir.path(),
                &format!("ic434_{band}.fits"),
                &frame_from_rows(&[&[1.0, 2.0], &[3.0, 4.0]], &[]),
            )
        })
        .collect();
    let output = run_rgb(&inputs, &no_font_config()).unwrap();
    assert_eq!(output.path.extension().unwrap(), "jpg");
    assert!(output.cube.is_none());
    assert!(output.path.exists());
}

#[test]
fn test_rgb_needs_three_frames() {
    let frames = vec![uniform_frame(2, 2, 1.0, &[]), uniform_frame(2, 2, 2.0, &[])];
    assert!(matches!(
        make_rgb(&frames, &RgbConfig::default()),
        Err(StoneStepsError::InvalidInput(_))
    ));
    assert!(matches!(
        make_rgb(&[], &RgbConfig::default()),
        Err(StoneStepsError::EmptyInput(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let two: Vec<PathBuf> = (0..2)
        .map(|i| write_test_fits(dir.path(), &format!("c{i}.fits"), &frames[i]))
        .collect();
    assert!(run_rgb(&two, &no_font_config()).is_err());
}

fn write_rgb_inputs(dir: &std::path::Path) -> Vec<PathBuf> {
    ["r", "g", "b"]
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let v = 10.0 * (i + 1) as f32;
            write_test_fits(
                dir,
                &format!("m51_{band}.fits"),
                &frame_from_rows(&[&[v, v + 5.0], &[v + 10.0, v + 15.0]], &[]),
            )
        })
        .collect()
}

#[test]
fn test_failed_raster_write_removes_cube() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    let inputs = write_rgb_inputs(d);
    // a directory where the raster should go makes the image write fail
    std::fs::create_dir(d.join("m51_r.png")).unwrap();

    let config = RgbConfig {
        image_format: RasterFormat::Png,
        save_cube: true,
        ..no_font_config()
    };
    assert!(run_rgb(&inputs, &config).is_err());
    assert!(!d.join("m51_r_cube.fits").exists());
}

#[test]
fn test_failed_cube_write_leaves_no_raster() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    let inputs = write_rgb_inputs(d);
    std::fs::create_dir(d.join("m51_r_cube.fits")).unwrap();

    let config = RgbConfig {
        image_format: RasterFormat::Png,
        save_cube: true,
        ..no_font_config()
    };
    assert!(run_rgb(&inputs, &config).is_err());
    assert!(!d.join("m51_r.png").exists());
}
