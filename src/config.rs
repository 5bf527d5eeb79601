use crate::error::Error;
use crate::error::Result;
use crate::lsm::system::System;
use crate::lsm::workload::Workload;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;

/// runtime configuration, loaded from one toml file.
///
/// everything is validated up front: a config that parses is a config
/// whose sweep can run without tripping over its own inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub app: App,
    pub system: SystemSection,
    pub workload: WorkloadSection,
    pub memory: MemorySection,
    pub uncertainty: UncertaintySection,
    #[serde(default)]
    pub paths: Paths,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct App {
    pub name: String,
    pub data_dir: PathBuf,
    #[serde(default = "level")]
    pub logging_level: String,
    pub jobs: Vec<Job>,
}

fn level() -> String {
    "INFO".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Job {
    NominalTunings,
    UncertaintyTunings,
    SampleWorkloads,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemSection {
    pub n: f64,
    pub e: f64,
    pub m: f64,
    pub b: f64,
    pub s: f64,
    pub phi: f64,
    /// page size in bits; carried for the external store collaborators
    pub p: Option<f64>,
}

impl SystemSection {
    pub fn profile(&self) -> Result<System> {
        System::new(self.n, self.e, self.m, self.b, self.s, self.phi)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSection {
    pub expected: Vec<Workload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemorySection {
    pub bits_per_element: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UncertaintySection {
    pub rho_low: f64,
    pub rho_high: f64,
    pub rho_step: f64,
    pub samples: usize,
}

/// paths handed through to the external kv-store collaborators;
/// nothing in the tuning core reads them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Paths {
    pub database: Option<PathBuf>,
    pub builder: Option<PathBuf>,
    pub execution: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self =
            toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn filter(&self) -> Result<log::LevelFilter> {
        self.app
            .logging_level
            .parse()
            .map_err(|_| Error::Config(format!("unknown logging level {}", self.app.logging_level)))
    }

    fn validate(&self) -> Result<()> {
        self.filter()?;
        let profile = self.system.profile()?;
        if self.workload.expected.is_empty() {
            return Err(Error::Config("no expected workloads".into()));
        }
        for w in self.workload.expected.iter() {
            Workload::new(w.z0, w.z1, w.q, w.w)?;
        }
        if self.memory.bits_per_element.is_empty() {
            return Err(Error::Config("no memory budgets".into()));
        }
        for &bits in self.memory.bits_per_element.iter() {
            profile.with_memory(bits * self.system.n)?;
        }
        if self.uncertainty.rho_step <= 0. {
            return Err(Error::Config("rho step must be positive".into()));
        }
        if self.uncertainty.rho_high < self.uncertainty.rho_low {
            return Err(Error::Config("rho grid is inverted".into()));
        }
        if self.uncertainty.samples == 0 {
            return Err(Error::Config("sample count must be positive".into()));
        }
        Ok(())
    }
}
