//! Integration tests for the initialization suite and assertion collector.

mod common;

use common::init_test_logging;
use pretty_assertions::assert_eq;
use sensor_bringup::{
    AssertionCollector, DeviceConnection, InitializationSuite, MockSensor, RecordingDelay,
    Scenario, StdDelay, SuiteLines,
};

#[test]
fn test_full_suite_passes_with_recorded_delays() {
    init_test_logging();
    let mut suite = InitializationSuite::new(|| {
        DeviceConnection::new(MockSensor::responsive(), RecordingDelay::new())
    });
    let mut collector = AssertionCollector::new();

    suite.run_all(&mut collector);

    let summary = collector.summary();
    assert!(collector.all_passed(), "failed: {:?}", collector.failures().collect::<Vec<_>>());
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.passed, summary.total);
}

#[test]
fn test_retry_timing_with_real_delays() {
    let mut suite =
        InitializationSuite::new(|| DeviceConnection::new(MockSensor::absent(), StdDelay));
    let mut collector = AssertionCollector::new();

    suite.run(Scenario::RetryTiming, &mut collector);

    assert!(collector.all_passed());
    assert_eq!(collector.summary().total, 4);
}

#[test]
fn test_custom_lines_appear_in_labels() {
    let lines = SuiteLines {
        primary: (17, 16),
        alternate: (4, 15),
    };
    let mut suite = InitializationSuite::with_lines(
        || DeviceConnection::new(MockSensor::responsive(), RecordingDelay::new()),
        lines,
    );
    let mut collector = AssertionCollector::new();

    suite.run(Scenario::PinsPrimary, &mut collector);
    suite.run(Scenario::PinsAlternate, &mut collector);

    let labels: Vec<_> = collector
        .assertions()
        .iter()
        .map(|a| a.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "data line set to 17",
            "clock line set to 16",
            "data line set to 4",
            "clock line set to 15",
        ]
    );
    assert!(collector.all_passed());
}

#[test]
fn test_every_scenario_gets_a_fresh_connection() {
    let mut built = 0;
    let mut suite = InitializationSuite::new(|| {
        built += 1;
        DeviceConnection::new(MockSensor::responsive(), RecordingDelay::new())
    });
    let mut collector = AssertionCollector::new();

    suite.run_all(&mut collector);
    drop(suite);

    // pin_validation uses two instances, every other scenario one.
    assert_eq!(built, Scenario::ALL.len() + 1);
}

#[test]
fn test_collector_shared_across_runs() {
    let mut collector = AssertionCollector::new();
    collector.record("precondition", false);

    let mut suite = InitializationSuite::new(|| {
        DeviceConnection::new(MockSensor::responsive(), RecordingDelay::new())
    });
    suite.run(Scenario::FreshDefaults, &mut collector);

    let summary = collector.summary();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.failed, 1);
    assert!(!collector.all_passed());
}
