#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use faultline_core::{ExecutionPlan, FaultlineError, RequestParameters, RequestResult};

fn interpret(pairs: &[(&str, &str)]) -> faultline_core::Result<ExecutionPlan> {
    let params = RequestParameters::from_pairs(pairs.iter().map(|(k, v)| (*k, v.to_string())));
    ExecutionPlan::interpret(&params)
}

#[test]
fn full_parameter_set() {
    let plan = interpret(&[
        ("name", "bob"),
        ("dep", "Lz9zbGVlcD01"),
        ("sleep", "20"),
        ("code", "503"),
    ])
    .expect("must interpret");

    assert_eq!(plan.name, "bob");
    assert_eq!(plan.dependency_path, "/?sleep=5");
    assert_eq!(plan.sleep_millis, Some(20));
    assert_eq!(plan.status_code, Some(503));
}

#[test]
fn malformed_lenient_values_do_not_fail() {
    let plan = interpret(&[("sleep", "soon"), ("code", "150")]).expect("lenient");
    assert_eq!(plan.sleep_millis, None);
    assert_eq!(plan.status_code, None);

    let result = RequestResult::from_plan(&plan, Duration::ZERO);
    assert_eq!(result.final_status, 200);
    assert_eq!(result.sleep_millis, 0);
}

#[test]
fn malformed_dependency_fails_regardless_of_other_values() {
    let err = interpret(&[("name", "bob"), ("dep", "%%%"), ("code", "404")]).expect_err("must fail");
    match err {
        FaultlineError::InvalidEncoding(msg) => assert!(msg.starts_with("dep:")),
        other => panic!("unexpected error: {other}"),
    }
}
