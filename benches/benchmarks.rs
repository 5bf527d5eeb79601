use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use lsmtune::lsm::cost::CostModel;
use lsmtune::lsm::policy::Policy;
use lsmtune::lsm::system::System;
use lsmtune::lsm::workload::Workload;
use lsmtune::tuning::nominal::Nominal;

fn profile() -> System {
    let n = 1e8;
    let mib = 8. * 1024. * 1024.;
    System::new(n, 8192., 10. * n + 8. * mib, 4., 4e-7, 1.).expect("admissible profile")
}

fn cost_evaluation(c: &mut Criterion) {
    let model = CostModel::new(profile(), Workload::uniform(), Policy::Leveling);
    c.bench_function("cost evaluation", |b| {
        b.iter(|| std::hint::black_box(model.cost(5., 20.)))
    });
}

fn nominal_tuning(c: &mut Criterion) {
    let tuner = Nominal::new(profile(), Workload::uniform());
    c.bench_function("nominal tuning", |b| {
        b.iter(|| std::hint::black_box(tuner.tune(None)))
    });
}

criterion_group!(benches, cost_evaluation, nominal_tuning);
criterion_main!(benches);
