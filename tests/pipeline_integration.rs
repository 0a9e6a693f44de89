use std::collections::{BTreeMap, HashMap};

use bird_ghg::align::{AlignmentPolicy, DataAligner, YearRange};
use bird_ghg::records::{Gas, PopulationSeries, Species};
use bird_ghg::selection::{Model, SelectionResolver, Stage};
use bird_ghg::simple::SimpleRegressionModel;
use bird_ghg::synthetic::{generate, SyntheticParams, REGIONS};
use bird_ghg::CoreError;

fn select(resolver: &mut SelectionResolver, region: &str, species: &str, gas: &str) {
    resolver.record_choice(Stage::Region, region).unwrap();
    resolver.record_choice(Stage::Species, species).unwrap();
    resolver.record_choice(Stage::Gas, gas).unwrap();
}

#[test]
fn test_full_pipeline() {
    let raw = generate(&SyntheticParams::default(), &AlignmentPolicy::default(), 2016).unwrap();
    let snapshot = raw.snapshot().unwrap();

    for region in REGIONS {
        let mut resolver = SelectionResolver::default();
        select(&mut resolver, region, "Forest Birds", "Total");
        let model = resolver.build_model(&snapshot).unwrap();
        let simple = model.as_simple().unwrap();
        let expected = if region == "Northwest Territories" || region == "Nunavut" {
            18
        } else {
            27
        };
        assert_eq!(simple.xs().len(), expected, "{region}");
        assert!((0.0..=1.0).contains(&model.r_squared()));
    }
}

#[test]
fn test_multiple_regression_pipeline() {
    let raw = generate(&SyntheticParams::default(), &AlignmentPolicy::default(), 5).unwrap();
    let snapshot = raw.snapshot().unwrap();
    let mut resolver = SelectionResolver::default();
    select(&mut resolver, "Northwest Territories", "Aerial Insectivores", "Multiple Regression");

    match resolver.build_model(&snapshot).unwrap() {
        Model::Multiple(model) => {
            let keys: Vec<Gas> = model.coefficients().into_keys().collect();
            assert_eq!(keys, Gas::ALL.to_vec());
            assert!(model.predict_value([0.0; 7]).is_finite());
            assert!((model.predict_value([0.0; 7]) - model.intercept()).abs() < 1e-9);
        }
        other => panic!("Expected multiple regression, got {other:?}"),
    }
}

#[test]
fn test_species_unset_is_incomplete() {
    let raw = generate(&SyntheticParams::default(), &AlignmentPolicy::default(), 1).unwrap();
    let snapshot = raw.snapshot().unwrap();
    let mut resolver = SelectionResolver::default();
    resolver.record_choice(Stage::Region, "Alberta").unwrap();
    resolver.record_choice(Stage::Gas, "CH4").unwrap();
    assert!(matches!(
        resolver.build_model(&snapshot),
        Err(CoreError::SelectionIncomplete { missing: "species" })
    ));
}

#[test]
fn test_documented_examples() {
    let model = SimpleRegressionModel::fit(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
    assert_eq!(model.slope(), 2.0);
    assert_eq!(model.intercept(), 0.0);
    assert_eq!(model.predict_y(5.0), 10.0);
    assert_eq!(model.r_squared(), 1.0);

    let policy = AlignmentPolicy::default();
    assert_eq!(policy.start_year("Northwest Territories"), 1999);
    assert_eq!(policy.start_year("Alberta"), 1990);

    let birds = PopulationSeries::new(
        Species::Waterfowl,
        (1990..=2016).map(|y| (y, 0.0)).collect::<BTreeMap<i32, f64>>(),
    );
    assert!(matches!(
        DataAligner::align(&birds, YearRange::new(1985, 1990).unwrap()),
        Err(CoreError::Range { .. })
    ));
}

#[test]
fn test_raw_bird_rows_feed_alignment() {
    let raw: BTreeMap<i32, Vec<String>> = (1970..=2016)
        .map(|y| (y, (0..9).map(|c| format!("{}", c * 10 + (y - 1970))).collect()))
        .collect();
    let grassland = PopulationSeries::from_raw_columns(&raw, Species::GrasslandBirds).unwrap();
    let values = DataAligner::align(&grassland, YearRange::new(2014, 2016).unwrap()).unwrap();
    assert_eq!(values, vec![114.0, 115.0, 116.0]);

    // Emissions missing for the requested region surface as a lookup failure.
    let snapshot =
        bird_ghg::records::DatasetSnapshot::from_raw(&HashMap::new(), &raw).unwrap();
    assert!(matches!(
        snapshot.region("Yukon"),
        Err(CoreError::Lookup { .. })
    ));
}

#[test]
fn test_non_finite_bird_cell_never_reaches_a_model() {
    let mut raw = generate(&SyntheticParams::default(), &AlignmentPolicy::default(), 7).unwrap();
    let column = Species::ForestBirds.index();
    raw.birds.get_mut(&2000).unwrap()[column] = "NaN".to_string();
    assert!(matches!(raw.snapshot(), Err(CoreError::InvalidData(_))));

    // Fitting the same aligned values directly is rejected too.
    let xs: Vec<f64> = (0..27).map(|i| 500.0 + i as f64).collect();
    let mut ys: Vec<f64> = (0..27).map(|i| -0.5 * i as f64).collect();
    ys[10] = f64::NAN;
    assert!(matches!(
        SimpleRegressionModel::fit(&xs, &ys),
        Err(CoreError::InvalidData(_))
    ));
}
