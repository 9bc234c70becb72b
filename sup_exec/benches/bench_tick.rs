//! # Superstructure Tick Benchmark
//!
//! Measures one full tick of the data store, which must stay well inside the
//! cycle period.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::tc::{EffectorCmd, OperatingMode};
use sup_lib::{data_store::DataStore, params::SupParams, sim_mech::SimMotor};

const DT_S: f64 = 0.02;

fn shipped_params() -> SupParams {
    SupParams {
        exec: util::params::parse(include_str!("../../params/sup_exec.toml")).unwrap(),
        joints: util::params::parse(include_str!("../../params/joints.toml")).unwrap(),
        presets: util::params::parse(include_str!("../../params/presets.toml")).unwrap(),
        effectors: util::params::parse(include_str!("../../params/effectors.toml")).unwrap(),
    }
}

fn tick_benchmark(c: &mut Criterion) {
    let params = shipped_params();

    // ---- Automatic approach to a preset ----

    let mut ds = DataStore::new(&params, |_| SimMotor::new(params.exec.sim_max_rate_per_s))
        .unwrap();
    ds.activate_preset("L4").unwrap();
    ds.exec_effector_cmd(EffectorCmd::Intake, 0.0).unwrap();

    let mut now_s = 0.0;
    c.bench_function("tick_automatic", |b| {
        b.iter(|| {
            now_s += DT_S;
            ds.proc(black_box(now_s));
            ds.for_each_driver(|_, d| d.advance(DT_S));
        })
    });

    // ---- Manual pass through ----

    let mut ds = DataStore::new(&params, |_| SimMotor::new(params.exec.sim_max_rate_per_s))
        .unwrap();
    ds.mode_arb.set(OperatingMode::Manual);

    let mut now_s = 0.0;
    c.bench_function("tick_manual", |b| {
        b.iter(|| {
            now_s += DT_S;
            ds.proc(black_box(now_s));
        })
    });

    // ---- Snapshot for telemetry ----

    c.bench_function("snapshot", |b| b.iter(|| black_box(ds.snapshot())));
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
