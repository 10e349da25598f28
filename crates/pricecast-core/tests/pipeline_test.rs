//! End-to-end checks of the model, summarizer and normalizer working together.

use pricecast_core::{
    Category, CoefficientSet, CostAllocation, History, LatestData, PredictBody, PredictionRequest,
    PredictionResult, SummaryThresholds, engine, normalize, summarize,
};

fn compiled_history() -> History {
    History::new()
        .with_series(Category::Labor, vec![1.0, 2.0, 3.0, 4.0])
        .with_series(Category::Capital, vec![0.8, 1.1, 0.9, 1.4])
        .with_series(Category::Materials, vec![-0.5, 0.3, 2.2, 1.7])
        .with_series(Category::Energy, vec![3.1, -1.2, 0.4, 2.6])
        .with_series(Category::Other, vec![0.0, 0.0, 0.0, 0.0])
}

#[test]
fn test_uniform_allocation_example_summary() {
    let result = PredictionResult { mean: 3.5, std_dev: 1.2, min: 1.1, max: 5.9 };
    let summary = summarize(
        &result,
        None,
        &CostAllocation::uniform(),
        &CoefficientSet::dashboard_defaults(),
        &SummaryThresholds::default(),
    );
    assert_eq!(summary.price_label(), "Medium (2-8%)");
    assert_eq!(summary.confidence_label(), "Medium confidence");
    assert_eq!(summary.trend_label(), "Baseline established");
}

#[test]
fn test_prior_mean_drives_trend() {
    let result = PredictionResult::from_mean(2.8);
    let summary = summarize(
        &result,
        Some(2.0),
        &CostAllocation::uniform(),
        &CoefficientSet::dashboard_defaults(),
        &SummaryThresholds::default(),
    );
    assert_eq!(summary.trend_label(), "Momentum building");
    assert!(summary.trend.description().contains("0.80"));
}

#[test]
fn test_model_and_dashboard_defaults_predict_the_same() {
    let history = compiled_history();
    let body = PredictBody::default();
    let model = engine::predict_body(&body, &history).unwrap();
    let dashboard = engine::predict_body(
        &PredictBody { coefficients: Some(CoefficientSet::dashboard_defaults()), ..PredictBody::default() },
        &history,
    )
    .unwrap();
    assert!((model.result.mean - dashboard.result.mean).abs() < 1e-12);
    assert!((model.raw_change - dashboard.raw_change).abs() < 1e-12);
}

#[test]
fn test_normalized_latest_data_is_predictable() {
    let history = compiled_history();
    let allocation = normalize(&history.latest_data());
    assert!((allocation.total() - 100.0).abs() < 1e-9);

    let request = PredictionRequest::new(allocation, CoefficientSet::dashboard_defaults()).unwrap();
    let report = engine::predict(&request, &history).unwrap();
    assert!(report.result.is_consistent());
    assert!(report.result.std_dev >= 0.5);
}

#[test]
fn test_allocation_gate_over_a_sweep() {
    for step in 0..=400 {
        let other = 19.8 + f64::from(step) * 0.001;
        let allocation = CostAllocation::new(20.0, 20.0, 20.0, 20.0, other);
        let expected = (allocation.total() - 100.0).abs() <= 0.01 + 1e-9;
        let request = PredictionRequest::new(allocation, CoefficientSet::dashboard_defaults());
        assert_eq!(request.is_ok(), expected, "total {}", allocation.total());
    }
}

#[test]
fn test_normalizer_totals_over_many_inputs() {
    let samples = [0.0, 0.1, 1.0, 3.3, 7.77, 12.5, 99.9];
    for &a in &samples {
        for &b in &samples {
            for &c in &samples {
                let data = LatestData { labor: a, capital: -b, materials: c, energy: a + b, other: c / 3.0, full_data: None };
                let allocation = normalize(&data);
                if a == 0.0 && b == 0.0 && c == 0.0 {
                    assert_eq!(allocation, CostAllocation::uniform());
                } else {
                    assert!((allocation.total() - 100.0).abs() < 1e-9, "{:?}", allocation);
                }
            }
        }
    }
}
