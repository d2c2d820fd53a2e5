//! Integration test: the order and content of runtime calls across a full
//! run, including the failure paths that end the loop early.

use insitu_core::{Cycle, RuntimeError};
use insitu_engine::{builtin, LoopState, StepError, StopReason, TimeStepLoop};
use insitu_synth::VelocityMagnitude;
use insitu_test_utils::fixtures::{small_config, TimeSynth};
use insitu_test_utils::{RecordingRuntime, RuntimeEvent};
use proptest::prelude::*;

const ONE_STEP: [&str; 4] = ["poll", "publish", "execute", "execute"];

#[test]
fn four_cubed_two_steps() {
    let (runtime, log) = RecordingRuntime::with_log();
    let mut sim = TimeStepLoop::new(
        &small_config([4, 4, 4], 2),
        Box::new(VelocityMagnitude),
        runtime.boxed(),
    )
    .unwrap();
    assert_eq!(sim.spec().spacing(), [2.5, 2.5, 2.5]);

    let summary = sim.run().unwrap();
    assert_eq!(summary.steps, 2);
    assert_eq!(summary.cycle, Cycle(2));
    assert_eq!(summary.final_time, 1.0);
    assert_eq!(summary.reason, StopReason::Completed);
    assert_eq!(sim.state(), LoopState::Done);

    let mut expected = vec!["open"];
    expected.extend(ONE_STEP);
    expected.extend(ONE_STEP);
    expected.push("close");
    assert_eq!(log.kinds(), expected);

    let publishes = log.publishes();
    let RuntimeEvent::Publish { cycle, time, nodal, .. } = &publishes[0] else {
        unreachable!()
    };
    assert_eq!((*cycle, *time), (1, 0.5));
    assert!((nodal[0] - 0.4794).abs() < 1e-4);

    let RuntimeEvent::Publish { cycle, time, nodal, .. } = &publishes[1] else {
        unreachable!()
    };
    assert_eq!((*cycle, *time), (2, 1.0));
    assert!((nodal[0] - 0.8415).abs() < 1e-4);
}

#[test]
fn action_lists_follow_each_publish() {
    let (runtime, log) = RecordingRuntime::with_log();
    let mut sim = TimeStepLoop::new(
        &small_config([2, 2, 2], 1),
        Box::new(VelocityMagnitude),
        runtime.boxed(),
    )
    .unwrap();
    sim.run().unwrap();

    let executes: Vec<_> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RuntimeEvent::Execute { actions } => Some(actions),
            _ => None,
        })
        .collect();
    assert_eq!(
        executes,
        vec![
            vec!["add_scenes".to_owned(), "execute".to_owned()],
            vec!["reset".to_owned()],
        ]
    );
}

#[test]
fn options_and_state_reach_runtime() {
    let (runtime, log) = RecordingRuntime::with_log();
    let mut config = small_config([2, 2, 2], 1);
    config.info = "unit test".to_owned();
    let mut sim = TimeStepLoop::new(&config, Box::new(VelocityMagnitude), runtime.boxed()).unwrap();
    sim.run().unwrap();

    let events = log.events();
    assert_eq!(
        events[0],
        RuntimeEvent::Open {
            runtime_type: Some("trace".to_owned())
        }
    );
    let RuntimeEvent::Publish { info, zonal_len, .. } = &log.publishes()[0] else {
        unreachable!()
    };
    assert_eq!(info.as_deref(), Some("unit test"));
    assert_eq!(*zonal_len, 8);
}

#[test]
fn single_cell_grid() {
    let (runtime, log) = RecordingRuntime::with_log();
    let mut sim = TimeStepLoop::new(
        &small_config([1, 1, 1], 1),
        Box::new(VelocityMagnitude),
        runtime.boxed(),
    )
    .unwrap();
    assert_eq!(sim.grid().point_count(), 8);
    assert_eq!(sim.grid().cell_count(), 1);
    sim.run().unwrap();

    let RuntimeEvent::Publish { nodal, zonal_len, .. } = &log.publishes()[0] else {
        unreachable!()
    };
    assert_eq!(nodal.len(), 8);
    assert_eq!(*zonal_len, 1);
}

#[test]
fn published_buffer_is_never_reallocated() {
    let (runtime, log) = RecordingRuntime::with_log();
    let mut sim = TimeStepLoop::new(
        &small_config([3, 3, 3], 4),
        Box::new(TimeSynth),
        runtime.boxed(),
    )
    .unwrap();
    sim.run().unwrap();

    let addr = sim.grid().point_values().as_ptr() as usize;
    for event in log.publishes() {
        let RuntimeEvent::Publish { nodal_addr, nodal, time, .. } = event else {
            unreachable!()
        };
        assert_eq!(nodal_addr, addr);
        assert!(nodal.iter().all(|&v| v == time));
    }
}

#[test]
fn zero_steps_opens_and_closes() {
    let (runtime, log) = RecordingRuntime::with_log();
    let mut sim = TimeStepLoop::new(
        &small_config([2, 2, 2], 0),
        Box::new(VelocityMagnitude),
        runtime.boxed(),
    )
    .unwrap();
    let summary = sim.run().unwrap();
    assert_eq!(summary.steps, 0);
    assert_eq!(summary.final_time, 0.0);
    assert_eq!(log.kinds(), vec!["open", "close"]);
}

#[test]
fn rejected_publish_ends_loop() {
    let (runtime, log) = RecordingRuntime::with_log();
    let mut sim = TimeStepLoop::new(
        &small_config([2, 2, 2], 5),
        Box::new(VelocityMagnitude),
        runtime.failing_publish(2).boxed(),
    )
    .unwrap();

    let err = sim.run().unwrap_err();
    assert!(matches!(
        err,
        StepError::Runtime(RuntimeError::Rejected { .. })
    ));
    assert_eq!(sim.state(), LoopState::Done);
    assert_eq!(sim.steps_done(), 1);
    assert!(!sim.session_open());
    assert_eq!(log.count("publish"), 2);
    assert_eq!(log.count("close"), 1);
    assert_eq!(log.kinds().last(), Some(&"close"));
    // No action lists run against the rejected publish.
    assert_eq!(log.count("execute"), 2);

    assert_eq!(sim.step(), Err(StepError::Finished));
    drop(sim);
    assert_eq!(log.count("close"), 1);
}

#[test]
fn refused_open_never_closes() {
    let (runtime, log) = RecordingRuntime::with_log();
    let err = TimeStepLoop::new(
        &small_config([2, 2, 2], 1),
        Box::new(VelocityMagnitude),
        runtime.failing_open().boxed(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        StepError::Runtime(RuntimeError::SessionOpen { .. })
    ));
    assert_eq!(log.kinds(), vec!["open"]);
}

#[test]
fn dropping_unfinished_loop_closes_session() {
    let (runtime, log) = RecordingRuntime::with_log();
    {
        let mut sim = TimeStepLoop::new(
            &small_config([2, 2, 2], 10),
            Box::new(VelocityMagnitude),
            runtime.boxed(),
        )
        .unwrap();
        sim.step().unwrap();
    }
    assert_eq!(log.count("close"), 1);
}

#[test]
fn bov_runtime_writes_every_cycle() {
    let dir = std::env::temp_dir().join(format!("insitu-bov-run-{}", std::process::id()));
    let mut config = small_config([2, 2, 2], 3);
    config.runtime_type = "bov".to_owned();
    config.output_dir = dir.clone();

    let runtime = builtin::create(&config.runtime_type, &config.output_dir).unwrap();
    let mut sim = TimeStepLoop::new(&config, Box::new(VelocityMagnitude), runtime).unwrap();
    sim.run().unwrap();

    for cycle in 1..=3 {
        let header = dir.join(format!("nodal_noise_{cycle:04}.bov"));
        let text = std::fs::read_to_string(&header).unwrap();
        assert!(text.contains("DATA_SIZE: 3 3 3"));
        assert!(text.contains("VARIABLE: nodal_noise"));
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_step_published_once_in_order(
        dx in 1i64..5,
        dy in 1i64..5,
        dz in 1i64..5,
        steps in 0u64..6,
    ) {
        let (runtime, log) = RecordingRuntime::with_log();
        let mut sim = TimeStepLoop::new(
            &small_config([dx, dy, dz], steps),
            Box::new(TimeSynth),
            runtime.boxed(),
        )
        .unwrap();
        let summary = sim.run().unwrap();
        prop_assert_eq!(summary.steps, steps);
        prop_assert_eq!(log.count("close"), 1);

        let publishes = log.publishes();
        prop_assert_eq!(publishes.len() as u64, steps);
        for (k, event) in publishes.iter().enumerate() {
            let RuntimeEvent::Publish { cycle, time, .. } = event else {
                unreachable!()
            };
            prop_assert_eq!(*cycle, k as i64 + 1);
            prop_assert_eq!(*time, 0.5 * (k as f64 + 1.0));
        }
    }
}
