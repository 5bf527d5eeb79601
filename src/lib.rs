pub mod config;
pub mod error;
pub mod lsm;
pub mod sweep;
pub mod tuning;
pub mod uncertainty;

/// dimensional analysis types
type Bits = f64;
type Bytes = f64;
type Cost = f64;
type Divergence = f64;

// tuning domain: size ratio and filter bits per element
const T_MIN: f64 = 2.;
const T_MAX: f64 = 100.;
const H_INITIAL: f64 = 5.;
const T_INITIAL: f64 = 20.;
const MIB_IN_BITS: Bits = 8. * 1024. * 1024.;
const BITS_IN_BYTES: f64 = 8.;

// solver parameters
const FTOL_NOMINAL: f64 = 1e-6;
const FTOL_ROBUST: f64 = 1e-12;
const LAMBDA_FLOOR: f64 = 0.1;
const LAMBDA_TIERING_INITIAL: f64 = 1e20;
const MAX_EVALUATIONS: u32 = 10_000;
const COST_SENTINEL: Cost = f64::MAX;

// workload sampling parameters
const SIMPLEX_EPSILON: f64 = 1e-3;
const SAMPLE_CEILING: u32 = 100;
const SAMPLE_SCALE: f64 = 1e4;
const SESSION_DRAWS: usize = 5;
const SESSION_DOMINANT: f64 = 0.8;
const SESSION_NEARBY: Divergence = 0.2;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_secs(1);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// initialize terminal logging
pub fn init(level: log::LevelFilter) {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}
