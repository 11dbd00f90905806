mod common;

use common::{int, text, uniform_frame, write_test_fits};
use stonesteps_core::error::StoneStepsError;
use stonesteps_core::header::Header;
use stonesteps_core::pipeline::auxiliary::{expand_vars, resolve_aux};
use stonesteps_core::pipeline::config::AuxFileConfig;

#[test]
fn test_expand_vars() {
    std::env::set_var("STONESTEPS_TEST_ROOT", "/data/cal");
    assert_eq!(
        expand_vars("$STONESTEPS_TEST_ROOT/*_MBIAS.fits"),
        "/data/cal/*_MBIAS.fits"
    );
    assert_eq!(
        expand_vars("${STONESTEPS_TEST_ROOT}_old/x"),
        "/data/cal_old/x"
    );
    assert_eq!(expand_vars("cost$"), "cost$");
    assert_eq!(expand_vars("plain/path"), "plain/path");
}

#[test]
fn test_unset_variable_kept_verbatim() {
    std::env::remove_var("STONESTEPS_TEST_UNSET_VAR");
    assert_eq!(
        expand_vars("$STONESTEPS_TEST_UNSET_VAR/x"),
        "$STONESTEPS_TEST_UNSET_VAR/x"
    );
    assert_eq!(
        expand_vars("${STONESTEPS_TEST_UNSET_VAR}/x"),
        "${STONESTEPS_TEST_UNSET_VAR}/x"
    );
}

#[test]
fn test_unset_variable_does_not_search_root() {
    std::env::remove_var("STONESTEPS_TEST_UNSET_CAL");
    let dir = tempfile::tempdir().unwrap();
    let config = AuxFileConfig::with_pattern("$STONESTEPS_TEST_UNSET_CAL/*_MBIAS.fits");
    let err = resolve_aux("bias", &config, &Header::new(), dir.path()).unwrap_err();
    assert!(matches!(err, StoneStepsError::EmptyInput(ref k) if k == "bias"));
}

#[test]
fn test_home_expansion() {
    if let Some(home) = dirs::home_dir() {
        let expected = home.join("cal");
        assert_eq!(expand_vars("~/cal"), expected.to_string_lossy());
    }
    assert_eq!(expand_vars("a~/cal"), "a~/cal");
}

fn reference() -> Header {
    let mut h = Header::new();
    h.set("INSTRUME", "CAM1");
    h.set("XBINNING", 2i64);
    h
}

#[test]
fn test_full_key_match_preferred() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    write_test_fits(d, "a_MBIAS.fits", &uniform_frame(1, 1, 0.0, &[("INSTRUME", text("CAM1")), ("XBINNING", int(1))]));
    let wanted = write_test_fits(
        d,
        "b_MBIAS.fits",
        &uniform_frame(1, 1, 0.0, &[("INSTRUME", text("CAM1")), ("XBINNING", int(2))]),
    );
    let config = AuxFileConfig::with_pattern("*_MBIAS.fits");
    assert_eq!(resolve_aux("bias", &config, &reference(), d).unwrap(), wanted);
}

#[test]
fn test_keys_relaxed_from_the_end() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    // matches INSTRUME only; XBINNING differs
    let wanted = write_test_fits(
        d,
        "b_MDARK.fits",
        &uniform_frame(1, 1, 0.0, &[("INSTRUME", text("CAM1")), ("XBINNING", int(1))]),
    );
    write_test_fits(d, "a_MDARK.fits", &uniform_frame(1, 1, 0.0, &[("INSTRUME", text("CAM7")), ("XBINNING", int(1))]));

    let config = AuxFileConfig {
        pattern: "*_MDARK.fits".into(),
        fit_keys: vec!["INSTRUME".into(), "XBINNING".into()],
    };
    assert_eq!(resolve_aux("dark", &config, &reference(), d).unwrap(), wanted);
}

#[test]
fn test_first_candidate_by_name_without_keys() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    write_test_fits(d, "z_MBIAS.fits", &uniform_frame(1, 1, 0.0, &[]));
    let first = write_test_fits(d, "m_MBIAS.fits", &uniform_frame(1, 1, 0.0, &[]));
    let config = AuxFileConfig {
        pattern: "*_MBIAS.fits".into(),
        fit_keys: Vec::new(),
    };
    assert_eq!(resolve_aux("bias", &config, &Header::new(), d).unwrap(), first);
}

#[test]
fn test_absolute_pattern_and_unreadable_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let cal = dir.path().join("cal");
    std::fs::create_dir(&cal).unwrap();
    std::fs::write(cal.join("a_MBIAS.fits"), b"not a fits file").unwrap();
    let good = write_test_fits(&cal, "b_MBIAS.fits", &uniform_frame(1, 1, 0.0, &[]));

    let pattern = format!("{}/*_MBIAS.fits", cal.display());
    let config = AuxFileConfig::with_pattern(&pattern);
    let elsewhere = tempfile::tempdir().unwrap();
    assert_eq!(
        resolve_aux("bias", &config, &Header::new(), elsewhere.path()).unwrap(),
        good
    );
}

#[test]
fn test_no_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let config = AuxFileConfig::with_pattern("*_MDARK.fits");
    let err = resolve_aux("dark", &config, &reference(), dir.path()).unwrap_err();
    assert!(matches!(err, StoneStepsError::EmptyInput(ref k) if k == "dark"));

    let missing_dir = AuxFileConfig::with_pattern("nowhere/*_MDARK.fits");
    assert!(resolve_aux("dark", &missing_dir, &reference(), dir.path()).is_err());
}

#[test]
fn test_glob_single_char_and_class() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    write_test_fits(d, "dark_1.fits", &uniform_frame(1, 1, 0.0, &[]));
    let wanted = write_test_fits(d, "dark_07.fits", &uniform_frame(1, 1, 0.0, &[]));
    write_test_fits(d, "dark_x7.fits", &uniform_frame(1, 1, 0.0, &[]));

    let config = AuxFileConfig::with_pattern("dark_[0-9]?.fits");
    assert_eq!(resolve_aux("dark", &config, &Header::new(), d).unwrap(), wanted);
}

#[test]
fn test_directories_are_not_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    std::fs::create_dir(d.join("a_MBIAS.fits")).unwrap();
    let wanted = write_test_fits(d, "b_MBIAS.fits", &uniform_frame(1, 1, 0.0, &[]));
    let config = AuxFileConfig::with_pattern("*_MBIAS.fits");
    assert_eq!(resolve_aux("bias", &config, &Header::new(), d).unwrap(), wanted);
}

#[test]
fn test_invalid_pattern_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = AuxFileConfig::with_pattern("[_MBIAS.fits");
    let err = resolve_aux("bias", &config, &Header::new(), dir.path()).unwrap_err();
    assert!(matches!(err, StoneStepsError::InvalidConfig(_)));
}
