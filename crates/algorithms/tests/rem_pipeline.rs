//! End-to-end tests of the three REM entry points on a synthetic valley.
//!
//! The DEM is 1 km x 1 km at 10 m cells. A straight channel runs west to
//! east along y = 505; the valley floor drops 1 m per 100 m downstream and
//! the walls rise 5 cm per metre away from the channel.

use fluvrem_algorithms::prelude::*;
use fluvrem_algorithms::rem::ArtifactNames;
use fluvrem_core::io::{read_geojson, read_geotiff};
use geo::line_string;

const RIVER: &str = "Test River";
const CHANNEL_Y: f64 = 505.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn valley_z(x: f64, y: f64) -> f64 {
    200.0 - 0.01 * x + 0.05 * (y - CHANNEL_Y).abs()
}

fn valley_dem() -> Raster<f64> {
    let gt = GeoTransform::new(0.0, 1000.0, 10.0, -10.0);
    let mut dem = Raster::new(100, 100);
    dem.set_transform(gt);
    for row in 0..100 {
        for col in 0..100 {
            let (x, y) = gt.pixel_to_geo(col, row);
            dem.set(row, col, valley_z(x, y)).unwrap();
        }
    }
    dem
}

/// The channel as two reaches, plus an unrelated tributary
fn flowlines() -> FeatureCollection {
    vec![
        Feature::new(line_string![(x: 0.0, y: CHANNEL_Y), (x: 400.0, y: CHANNEL_Y)])
            .with_property("GNIS_Name", RIVER),
        Feature::new(line_string![(x: 400.0, y: CHANNEL_Y), (x: 1000.0, y: CHANNEL_Y)])
            .with_property("GNIS_Name", RIVER),
        Feature::new(line_string![(x: 500.0, y: 505.0), (x: 500.0, y: 1000.0)])
            .with_property("GNIS_Name", "Side Creek"),
    ]
    .into_iter()
    .collect()
}

fn cross_sections(xs: &[f64]) -> FeatureCollection {
    xs.iter()
        .map(|&x| {
            Feature::new(line_string![(x: x, y: 305.0), (x: x, y: 705.0)]).with_property("station", x)
        })
        .collect()
}

fn workspace(dir: &tempfile::TempDir, overwrite: bool) -> Workspace {
    Workspace::open(dir.path().join("out"), WorkspaceOptions { overwrite }).unwrap()
}

fn kd_params() -> KernelDensityParams {
    KernelDensityParams {
        point_distance: 50.0,
        search_radius: 100.0,
        ..Default::default()
    }
}

/// REM + trend == DEM wherever both are valid; returns the number of
/// valid REM cells
fn assert_rem_plus_trend_is_dem(dem: &Raster<f64>, out: &RemOutput) -> usize {
    let mut valid = 0;
    for row in 0..dem.rows() {
        for col in 0..dem.cols() {
            let rem = out.rem.raster.get(row, col).unwrap();
            let trend = out.trend.raster.get(row, col).unwrap();
            if trend.is_nan() {
                assert!(rem.is_nan(), "({row}, {col}): REM {rem} without trend");
                continue;
            }
            valid += 1;
            let z = dem.get(row, col).unwrap();
            assert!((rem + trend - z).abs() < 1e-9, "({row}, {col})");
        }
    }
    valid
}

#[test]
fn kernel_density_scenario() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();

    let out = kernel_density_rem(&dem, &flowlines(), RIVER, &kd_params(), &ws, &RemConfig::default())
        .unwrap();

    // 1000 m at 50 m spacing
    assert_eq!(out.samples, 21);
    assert_eq!(ws.load_features("TestRiver_points").unwrap().len(), 21);
    // The downstream end sits on the DEM's east edge and is still sampled
    let elev = ws.load_features("TestRiver_elev").unwrap();
    assert_eq!(elev.len(), 21);
    assert!(elev.iter().all(|f| !f.elevation().is_nan()));
    assert_eq!(out.trend.name, "TestRiver_DetDEM");
    assert_eq!(out.rem.name, "TestRiver_RelElevModel");
    assert!(out.rem.raster.is_aligned_with(&dem));

    let valid = assert_rem_plus_trend_is_dem(&dem, &out);
    assert!(valid > 0);

    for row in 0..100 {
        let (_, y) = dem.pixel_to_geo(0, row);
        let off_channel = (y - CHANNEL_Y).abs();
        for col in 0..100 {
            let trend = out.trend.raster.get(row, col).unwrap();
            if off_channel > 100.0 + 1e-6 {
                // Beyond the kernel's reach of every sample
                assert!(trend.is_nan(), "row {row} col {col}: {trend}");
                assert!(out.rem.raster.get(row, col).unwrap().is_nan());
            } else if off_channel < 100.0 - 1e-6 {
                assert!(!trend.is_nan(), "row {row} col {col} should be covered");
            }
        }
    }

    // Near-zero trend error on the channel away from its ends
    let on_channel = 49;
    for col in 20..80 {
        let trend = out.trend.raster.get(on_channel, col).unwrap();
        let z = dem.get(on_channel, col).unwrap();
        assert!((trend - z).abs() < 0.5, "col {col}: trend {trend} vs dem {z}");
    }

    // Valley walls stand above the trend
    let (_, y) = dem.pixel_to_geo(0, 40);
    assert!((y - CHANNEL_Y).abs() > 50.0);
    for col in 20..80 {
        assert!(out.rem.raster.get(40, col).unwrap() > 0.0);
    }

    // Every stage left its artifact behind
    for name in ["TestRiver", "TestRiver_diss", "TestRiver_points", "TestRiver_elev"] {
        assert!(ws.feature_path(name).is_file(), "{name}");
    }
    for name in ["TestRiver_PntKernel", "TestRiver_StreamKernel", "TestRiver_DetDEM"] {
        assert!(ws.raster_path(name).is_file(), "{name}");
    }
}

#[test]
fn rem_on_disk_matches_returned_raster() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();

    let out = idw_rem(&dem, &flowlines(), RIVER, &IdwTrendParams::default(), &ws, &RemConfig::default())
        .unwrap();
    let on_disk: Raster<f64> = read_geotiff(&out.rem.path).unwrap();

    assert!(on_disk.is_aligned_with(&out.rem.raster));
    for (a, b) in on_disk.data().iter().zip(out.rem.raster.data().iter()) {
        assert!(a == b || (a.is_nan() && b.is_nan()));
    }

    let elev = read_geojson(ws.feature_path("TestRiver_elev")).unwrap();
    assert!(elev.iter().all(|f| f.get_property(ELEVATION_FIELD).is_some()));
}

#[test]
fn idw_outside_radius_is_nodata() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();
    let params = IdwTrendParams {
        point_distance: 50.0,
        search_radius: 60.0,
        ..Default::default()
    };

    let out = idw_rem(&dem, &flowlines(), RIVER, &params, &ws, &RemConfig::default()).unwrap();
    assert_eq!(out.trend.name, "TestRiver_IDW_detrend");
    assert_rem_plus_trend_is_dem(&dem, &out);

    // Row 40 (y = 595) is 90 m from every sample
    assert!(out.trend.raster.get(40, 50).unwrap().is_nan());
    assert!(out.rem.raster.get(40, 50).unwrap().is_nan());
    // Row 47 (y = 525) is within reach
    assert!(!out.trend.raster.get(47, 50).unwrap().is_nan());
}

#[test]
fn cross_section_scenario() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();

    let mut xs = cross_sections(&[105.0, 305.0, 505.0, 705.0, 905.0]);
    // Upslope of the channel: no crossing
    xs.push(Feature::new(line_string![(x: 605.0, y: 800.0), (x: 605.0, y: 900.0)]));

    let out = cross_section_rem(
        &dem,
        &flowlines(),
        RIVER,
        &xs,
        &CrossSectionParams::default(),
        &ws,
        &RemConfig::default(),
    )
    .unwrap();

    // One sample per crossing cross-section
    assert_eq!(out.samples, 5);
    assert_eq!(out.trend.name, "TestRiver_detrend_res");
    assert!(out.trend.raster.is_aligned_with(&dem));
    assert_rem_plus_trend_is_dem(&dem, &out);

    // The trend is the valley floor, so the REM is the wall height
    let (x, y) = dem.pixel_to_geo(50, 39);
    let rem = out.rem.raster.get(39, 50).unwrap();
    assert!((rem - 0.05 * (y - CHANNEL_Y).abs()).abs() < 1e-6, "REM at ({x}, {y}) = {rem}");

    // Outside the cross-section network
    assert!(out.trend.raster.get(50, 5).unwrap().is_nan());
    assert!(out.trend.raster.get(10, 50).unwrap().is_nan());

    let annotated = ws.load_features("TestRiver_xs_elev").unwrap();
    assert_eq!(annotated.len(), 6);
    assert!(annotated.features[5].elevation().is_nan());
    assert!((annotated.features[0].elevation() - valley_z(105.0, CHANNEL_Y)).abs() < 1e-9);

    for name in ["TestRiver_int", "TestRiver_intpt", "TestRiver_TIN"] {
        assert!(ws.feature_path(name).is_file(), "{name}");
    }
    assert!(ws.raster_path("TestRiver_detrended").is_file());
}

#[test]
fn unknown_river_fails_before_raster_work() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();

    let err = kernel_density_rem(&dem, &flowlines(), "Test  River", &kd_params(), &ws, &RemConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "{err}");

    let err = cross_section_rem(
        &dem,
        &flowlines(),
        "test river",
        &cross_sections(&[505.0]),
        &CrossSectionParams::default(),
        &ws,
        &RemConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "{err}");

    // Nothing was written
    assert_eq!(std::fs::read_dir(ws.root()).unwrap().count(), 0);
}

#[test]
fn cross_sections_missing_the_channel_are_insufficient() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();
    let far: FeatureCollection = vec![
        Feature::new(line_string![(x: 200.0, y: 600.0), (x: 200.0, y: 900.0)]),
        Feature::new(line_string![(x: 700.0, y: 100.0), (x: 700.0, y: 400.0)]),
    ]
    .into_iter()
    .collect();

    let err = cross_section_rem(
        &dem,
        &flowlines(),
        RIVER,
        &far,
        &CrossSectionParams::default(),
        &ws,
        &RemConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::InsufficientSamples { found: 0, .. }), "{err}");
    let names = ArtifactNames::new(RIVER);
    assert!(!ws.feature_path(&names.tin()).exists());
    assert!(!ws.raster_path(&names.rem()).exists());
}

#[test]
fn reruns_are_identical() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();
    let config = RemConfig::default();

    let first = kernel_density_rem(&dem, &flowlines(), RIVER, &kd_params(), &ws, &config).unwrap();
    let first_bytes = std::fs::read(&first.rem.path).unwrap();
    let second = kernel_density_rem(&dem, &flowlines(), RIVER, &kd_params(), &ws, &config).unwrap();
    let second_bytes = std::fs::read(&second.rem.path).unwrap();

    assert_eq!(first.rem.path, second.rem.path);
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn no_overwrite_refuses_existing_artifacts() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, false);
    let dem = valley_dem();
    let params = IdwTrendParams::default();

    idw_rem(&dem, &flowlines(), RIVER, &params, &ws, &RemConfig::default()).unwrap();
    let err = idw_rem(&dem, &flowlines(), RIVER, &params, &ws, &RemConfig::default()).unwrap_err();

    match err {
        Error::Engine { stage, artifact, source } => {
            assert_eq!(stage, "channel selection");
            assert_eq!(artifact, "TestRiver");
            assert!(matches!(*source, Error::ArtifactExists(_)));
        }
        other => panic!("expected an engine error, got {other}"),
    }
}

#[test]
fn bilinear_sampling_is_used_for_every_sample() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(&dir, true);
    let dem = valley_dem();
    let config = RemConfig {
        sampling: SampleMethod::Bilinear,
        ..Default::default()
    };

    let out = kernel_density_rem(&dem, &flowlines(), RIVER, &kd_params(), &ws, &config).unwrap();
    assert_eq!(out.samples, 21);

    // The channel runs along cell centres, so bilinear samples are exact
    // and the end point on the DEM edge is kept
    let samples = ws.load_features("TestRiver_elev").unwrap();
    for f in samples.iter() {
        let Some(geo::Geometry::Point(p)) = &f.geometry else {
            panic!("sample without point geometry");
        };
        let expected = valley_z(p.x().clamp(5.0, 995.0), CHANNEL_Y);
        assert!((f.elevation() - expected).abs() < 1e-9, "at x = {}", p.x());
    }
}
