//! Integration tests for the recursive forecast engine.

mod common;

use grid_forecast::error::ForecastError;
use grid_forecast::features::FeatureSchema;
use grid_forecast::forecast::{EngineConfig, ForecastEngine, forecast};
use grid_forecast::model::EnsembleWeights;
use grid_forecast::synthetic::DailyProfile;

#[test]
fn persistence_scenario_repeats_last_load() {
    let records = forecast(
        EngineConfig::default(),
        FeatureSchema::default(),
        common::LagOne,
        common::scenario_rows(),
        3,
    )
    .expect("valid run");

    let loads: Vec<f64> = records.iter().map(|r| r.predicted_demand).collect();
    assert_eq!(loads, vec![109.0, 109.0, 109.0]);
    let prices: Vec<f64> = records.iter().map(|r| r.predicted_price).collect();
    assert_eq!(prices, vec![59.0, 59.0, 59.0]);
    let dates: Vec<_> = records.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![common::day(10), common::day(11), common::day(12)]);
}

#[test]
fn horizon_length_and_daily_timestamps() {
    for n_days in [1, 7, 30] {
        let records = forecast(
            EngineConfig::default(),
            FeatureSchema::default(),
            common::LagOne,
            common::synthetic_rows(40),
            n_days,
        )
        .expect("valid run");
        assert_eq!(records.len(), n_days);
        assert_eq!(records[0].date, common::day(40));
        for pair in records.windows(2) {
            assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }
    }
}

#[test]
fn five_seed_rows_fail_fast() {
    let rows = common::scenario_rows().into_iter().take(5).collect();
    let result = forecast(
        EngineConfig::default(),
        FeatureSchema::from_columns(&["demand_lag1", "price_lag1"]),
        common::LagOne,
        rows,
        3,
    );
    assert_eq!(
        result,
        Err(ForecastError::InsufficientSeed {
            required: 7,
            available: 5,
        })
    );
}

#[test]
fn one_week_of_seed_is_enough_for_default_schema() {
    let rows: Vec<_> = common::scenario_rows().into_iter().take(7).collect();
    let mut engine = ForecastEngine::new(
        EngineConfig::default(),
        FeatureSchema::default(),
        common::Recording::default(),
    );
    assert_eq!(engine.required_seed(), 7);
    engine.seed(rows).expect("seven rows seed the default schema");

    let records = engine.run(1).expect("valid run");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].predicted_demand, 106.0);
    assert_eq!(records[0].date, common::day(7));

    // diff7 is today's load minus the week lag, i.e. the first seed row
    let seen = engine.predictor().seen.borrow();
    assert_eq!(seen[0].get("demand_lag7"), Some(100.0));
    assert_eq!(seen[0].get("demand_diff7"), Some(6.0));
}

#[test]
fn run_after_single_step_keeps_its_horizon() {
    let mut engine = ForecastEngine::new(
        EngineConfig::default(),
        FeatureSchema::default(),
        common::LagOne,
    );
    engine.seed(common::scenario_rows()).expect("enough seed");
    let first = engine.step().expect("step");
    assert_eq!(first.date, common::day(10));

    let records = engine.run(3).expect("valid run");
    assert_eq!(records.len(), 3);
    let dates: Vec<_> = records.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![common::day(11), common::day(12), common::day(13)]);
}

#[test]
fn exogenous_fields_carry_forward() {
    let rows: Vec<_> = common::scenario_rows()
        .into_iter()
        .map(|r| r.with_covariate("humidity", 70.0))
        .collect();
    let mut engine = ForecastEngine::new(
        EngineConfig::default(),
        FeatureSchema::default(),
        common::LagOne,
    );
    engine.seed(rows).expect("enough seed");
    engine.run(4).expect("valid run");

    let history = engine.history().rows();
    assert_eq!(history.len(), 14);
    for pair in history.windows(2).skip(9) {
        assert_eq!(pair[1].temp_c(), pair[0].temp_c());
        assert_eq!(pair[1].covariates(), pair[0].covariates());
    }
}

#[test]
fn later_steps_read_earlier_predictions() {
    let predictor = common::Recording {
        drift: 10.0,
        ..Default::default()
    };
    let records = forecast(
        EngineConfig::default(),
        FeatureSchema::default(),
        &predictor,
        common::scenario_rows(),
        9,
    )
    .expect("valid run");
    let seen = predictor.seen.borrow();
    assert_eq!(seen.len(), 9);

    for k in 0..8 {
        // step k+1 differences against step k's synthesized load
        let diff1 = seen[k + 1].get("demand_diff1").expect("in schema");
        let before = if k == 0 {
            109.0
        } else {
            records[k - 1].predicted_demand
        };
        assert_eq!(diff1, records[k].predicted_demand - before);
    }

    // lag7 reads seed rows until the first synthesized row is a week old
    for (k, features) in seen.iter().enumerate().take(7) {
        assert_eq!(features.get("demand_lag7"), Some(103.0 + k as f64));
    }
    assert_eq!(seen[7].get("demand_lag7"), Some(records[0].predicted_demand));
}

#[test]
fn ensemble_runs_are_bit_identical() {
    let schema = FeatureSchema::default();
    let predictor = DailyProfile::new(42)
        .demo_predictor(&schema, EnsembleWeights::default())
        .expect("valid demo models");

    let run = || {
        forecast(
            EngineConfig::default(),
            schema.clone(),
            &predictor,
            common::synthetic_rows(90),
            14,
        )
        .expect("valid run")
    };
    let first = run();
    let second = run();
    assert_eq!(first.len(), 14);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.predicted_demand.to_bits(), b.predicted_demand.to_bits());
        assert_eq!(a.predicted_price.to_bits(), b.predicted_price.to_bits());
    }
}

#[test]
fn incomplete_ensemble_produces_no_output() {
    let schema = FeatureSchema::default();
    let predictor = grid_forecast::model::EnsemblePredictor::new(EnsembleWeights::default());
    let result = forecast(
        EngineConfig::default(),
        schema,
        &predictor,
        common::synthetic_rows(30),
        3,
    );
    assert!(matches!(result, Err(ForecastError::ModelNotLoaded { .. })));
}
