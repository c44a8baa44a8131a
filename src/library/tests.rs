use super::*;
use tempfile::tempdir;

fn iron() -> ReferenceElement {
    ReferenceElement::new("Fe", vec![400.0, 401.0, 402.0, 404.0])
        .with_line(ReferenceLine::new("Fe I", vec![0.0, 10.0, 20.0, 40.0]))
        .with_line(ReferenceLine::new("Fe II", vec![5.0, 5.0, 0.0, 2.5]))
}

#[test]
fn test_exact_native_wavelength_returns_native_intensity() {
    let element = iron();
    let windows = element.get_window(&[400.0, 401.0, 402.0, 404.0], Some("Fe I"));
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].intensities, vec![0.0, 10.0, 20.0, 40.0]);
}

#[test]
fn test_linear_interpolation_between_points() {
    let element = iron();
    let windows = element.get_window(&[400.5, 403.0], Some("Fe I"));
    assert_eq!(windows[0].intensities, vec![5.0, 30.0]);
    assert_eq!(windows[0].wavelengths, vec![400.5, 403.0]);
}

#[test]
fn test_outside_native_range_is_zero() {
    let element = iron();
    let windows = element.get_window(&[350.0, 399.99, 404.01, 900.0], None);
    assert_eq!(windows.len(), 2);
    for window in &windows {
        assert!(window.intensities.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_unordered_targets_still_bracket_correctly() {
    let element = iron();
    let windows = element.get_window(&[403.0, 400.5, 401.0], Some("Fe I"));
    assert_eq!(windows[0].intensities, vec![30.0, 5.0, 10.0]);
}

#[test]
fn test_duplicate_native_wavelength_uses_left_value() {
    let element = ReferenceElement::new("X", vec![1.0, 2.0, 2.0, 3.0])
        .with_line(ReferenceLine::new("X I", vec![1.0, 4.0, 8.0, 2.0]));
    let windows = element.get_window(&[2.0], None);
    // The bracket advances onto the second 2.0 sample, whose span starts there
    assert_eq!(windows[0].intensities, vec![8.0]);
}

#[test]
fn test_unknown_filter_returns_no_windows() {
    assert!(iron().get_window(&[401.0], Some("Cu I")).is_empty());
}

#[test]
fn test_normalized_cache() {
    let element = iron();
    let line = element.line("Fe I").unwrap();
    assert_eq!(line.normalized(), &[0.0, 0.25, 0.5, 1.0]);
    // Second call returns the cached series
    assert!(std::ptr::eq(line.normalized(), line.normalized()));
}

#[test]
fn test_all_zero_line_normalizes_to_itself() {
    let line = ReferenceLine::new("Dark", vec![0.0, 0.0]);
    assert_eq!(line.normalized(), &[0.0, 0.0]);
    assert_eq!(line.peak(), 0.0);
}

#[test]
fn test_load_dir_uses_naming_convention() {
    let dir = tempdir().unwrap();
    iron().save_to_dir(dir.path()).unwrap();
    ReferenceElement::new("Cu", vec![300.0, 301.0])
        .with_line(ReferenceLine::new("Cu I", vec![1.0, 2.0]))
        .save_to_dir(dir.path())
        .unwrap();
    std::fs::write(dir.path().join("notes.json"), "{}").unwrap();
    std::fs::write(dir.path().join("LIBS-Broken.json"), "not json").unwrap();

    let library = ElementLibrary::load_dir(dir.path()).unwrap();
    assert_eq!(library.len(), 2);
    assert_eq!(library.elements()[0].name, "Cu");
    assert_eq!(library.lines().count(), 3);

    assert_eq!(library.get("Fe II").map(|e| e.name.as_str()), Some("Fe"));
    assert_eq!(library.get("Cu").map(|e| e.name.as_str()), Some("Cu"));
    assert!(library.get("Zn").is_none());
}

#[test]
fn test_load_accepts_extra_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("LIBS-H.json");
    std::fs::write(
        &path,
        r#"{
            "Name": "H",
            "Wavelengths": [656.0, 657.0],
            "Elements": [
                { "Name": "H I", "Intensities": [1.0, 0.5], "IntensitiesNormalized": [1.0, 0.5] }
            ]
        }"#,
    )
    .unwrap();

    let element = ReferenceElement::load(&path).unwrap();
    assert_eq!(element.lines.len(), 1);
    assert_eq!(element.lines[0].intensities(), &[1.0, 0.5]);
}

#[test]
fn test_mismatched_line_length_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("LIBS-Bad.json");
    std::fs::write(
        &path,
        r#"{ "Name": "Bad", "Wavelengths": [1.0, 2.0], "Elements": [ { "Name": "Bad I", "Intensities": [1.0] } ] }"#,
    )
    .unwrap();

    assert!(matches!(
        ReferenceElement::load(&path),
        Err(LibraryError::Malformed { .. })
    ));
}

#[test]
fn test_missing_directory_is_error() {
    let dir = tempdir().unwrap();
    assert!(ElementLibrary::load_dir(&dir.path().join("missing")).is_err());
}
