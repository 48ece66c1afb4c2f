//! Exercises the process-based strategies against real worker processes, using the
//! `pool_bench` binary built alongside these tests.

#![cfg(not(miri))]

use new_zealand::nz;
use pool_bench::{
    Context, InputBatch, ProcessPool, Strategy, WorkerCommand, compute, detect_cpu_count,
    evaluate_strategy, run_strategy,
};

fn worker() -> WorkerCommand {
    WorkerCommand::new(env!("CARGO_BIN_EXE_pool_bench")).arg("worker")
}

fn batch() -> InputBatch {
    InputBatch::from_integers([100_000, 3, 77_777, 1, 250_000, 12, 5_000, 9, 64, 1_000_001])
        .unwrap()
}

#[test]
fn process_pool_matches_workload() {
    let batch = batch();
    let expected = batch.iter().map(compute).collect::<Vec<_>>();

    let mut pool = ProcessPool::new(&worker(), nz!(4)).unwrap();
    assert_eq!(pool.process_count().get(), 4);

    let results = pool.map(&batch).unwrap();
    pool.shutdown().unwrap();

    assert_eq!(results, expected);
}

#[test]
fn more_workers_than_inputs() {
    let batch = InputBatch::from_integers([10, 20]).unwrap();

    let mut pool = ProcessPool::new(&worker(), nz!(5)).unwrap();
    let results = pool.map(&batch).unwrap();
    pool.shutdown().unwrap();

    assert_eq!(results, vec![55, 210]);
}

#[test]
fn pool_serves_multiple_batches() {
    let mut pool = ProcessPool::new(&worker(), nz!(2)).unwrap();

    let first = pool.map(&InputBatch::from_integers([1, 2, 3]).unwrap()).unwrap();
    let second = pool.map(&InputBatch::from_integers([4]).unwrap()).unwrap();
    pool.shutdown().unwrap();

    assert_eq!(first, vec![1, 3, 6]);
    assert_eq!(second, vec![10]);
}

#[test]
fn every_strategy_computes_the_same_values() {
    let batch = batch();
    let context = Context::new(worker(), detect_cpu_count());

    let serial = evaluate_strategy(Strategy::Serial, &batch, &context).unwrap();

    for strategy in Strategy::ALL {
        let results = evaluate_strategy(strategy, &batch, &context).unwrap();
        assert_eq!(results, serial, "{strategy} disagrees with serial execution");
    }
}

#[test]
fn every_strategy_reports_elapsed_time() {
    let batch = InputBatch::from_integers([1, 2, 3]).unwrap();
    let context = Context::new(worker(), nz!(2));

    for strategy in Strategy::ALL {
        let elapsed = run_strategy(strategy, &batch, &context).unwrap();
        assert!(elapsed.as_secs_f64() >= 0.0, "{strategy}");
    }
}
