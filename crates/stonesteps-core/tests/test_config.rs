use std::path::PathBuf;

use stonesteps_core::error::StoneStepsError;
use stonesteps_core::frame::SampleFormat;
use stonesteps_core::io::image_io::RasterFormat;
use stonesteps_core::pipeline::config::StepsConfig;
use stonesteps_core::stack::CombineMethod;

#[test]
fn test_defaults() {
    let config = StepsConfig::default();
    assert_eq!(config.master_bias.combine_method, CombineMethod::Median);
    assert_eq!(config.master_bias.output_format, SampleFormat::F32);
    assert!(config.master_bias.output_folder.is_none());
    assert_eq!(config.master_flat.bias.pattern, "*_MBIAS.fits");
    assert_eq!(config.master_flat.dark.pattern, "*_MDARK.fits");
    assert_eq!(
        config.master_flat.bias.fit_keys,
        vec!["INSTRUME", "XBINNING", "YBINNING"]
    );
    assert_eq!(config.rgb.min_percentile, 0.05);
    assert_eq!(config.rgb.max_percentile, 0.999);
    assert_eq!(config.rgb.image_format, RasterFormat::Jpeg);
    assert!(!config.rgb.save_cube);
    config.validate().unwrap();
}

#[test]
fn test_parse_partial_toml() {
    let config = StepsConfig::from_toml_str(
        r#"
        [master_bias]
        combine_method = "mean"
        output_format = "u16"
        output_folder = "/data/masters"

        [master_flat.dark]
        pattern = "$HOME/darks/*_MDARK.fits"
        fit_keys = ["INSTRUME"]

        [rgb]
        max_percentile = 0.99
        image_format = "png"
        save_cube = true
        "#,
    )
    .unwrap();

    assert_eq!(config.master_bias.combine_method, CombineMethod::Average);
    assert_eq!(config.master_bias.output_format, SampleFormat::U16);
    assert_eq!(
        config.master_bias.output_folder,
        Some(PathBuf::from("/data/masters"))
    );
    assert_eq!(config.master_flat.dark.fit_keys, vec!["INSTRUME"]);
    // untouched sections keep their defaults
    assert_eq!(config.master_flat.bias.pattern, "*_MBIAS.fits");
    assert_eq!(config.master_flat.combine_method, CombineMethod::Median);
    assert_eq!(config.rgb.min_percentile, 0.05);
    assert_eq!(config.rgb.max_percentile, 0.99);
    assert_eq!(config.rgb.image_format, RasterFormat::Png);
    assert!(config.rgb.save_cube);
}

#[test]
fn test_default_serializes_and_parses_back() {
    let text = toml::to_string_pretty(&StepsConfig::default()).unwrap();
    let back = StepsConfig::from_toml_str(&text).unwrap();
    assert_eq!(back.master_flat.bias, StepsConfig::default().master_flat.bias);
    assert_eq!(back.rgb.font_path, StepsConfig::default().rgb.font_path);
}

#[test]
fn test_unknown_method_is_parse_error() {
    let err = StepsConfig::from_toml_str("[master_bias]\ncombine_method = \"kappa\"\n").unwrap_err();
    assert!(matches!(err, StoneStepsError::Config(_)));
}

#[test]
fn test_validation_errors() {
    for toml_text in [
        "[rgb]\nmax_percentile = 1.5\n",
        "[rgb]\nmin_percentile = 0.9\nmax_percentile = 0.5\n",
        "[master_bias]\noutput_folder = \"\"\n",
        "[master_flat.bias]\npattern = \"  \"\n",
        "[master_flat.dark]\nfit_keys = [\"TOOLONGKEY\"]\n",
    ] {
        let err = StepsConfig::from_toml_str(toml_text).unwrap_err();
        assert!(
            matches!(err, StoneStepsError::InvalidConfig(_)),
            "expected InvalidConfig for {toml_text:?}, got {err}"
        );
    }
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steps.toml");
    std::fs::write(&path, "[master_flat]\ncombine_method = \"sum\"\n").unwrap();
    let config = StepsConfig::from_file(&path).unwrap();
    assert_eq!(config.master_flat.combine_method, CombineMethod::Sum);

    assert!(matches!(
        StepsConfig::from_file(&dir.path().join("missing.toml")),
        Err(StoneStepsError::Io(_))
    ));
}

#[test]
fn test_format_names() {
    assert_eq!("U16".parse::<SampleFormat>().unwrap(), SampleFormat::U16);
    assert!("f16".parse::<SampleFormat>().is_err());
    assert_eq!(SampleFormat::U16.bitpix(), 16);
    assert_eq!(SampleFormat::U16.bzero(), Some(32768.0));
    assert_eq!(SampleFormat::F64.bitpix(), -64);
    assert_eq!("jpg".parse::<RasterFormat>().unwrap(), RasterFormat::Jpeg);
    assert_eq!(RasterFormat::Png.extension(), "png");
}
