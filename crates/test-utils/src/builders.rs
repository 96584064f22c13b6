#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use checkset::config::{CheckConfig, ChecksetConfig, ConfigFile, ConfigSection, RawConfigFile};
use checkset::engine::Checkset;

use crate::fake_check::{FakeCheck, Recorder};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                check: BTreeMap::new(),
                checkset: BTreeMap::new(),
            },
        }
    }

    pub fn with_check(mut self, name: &str, check: CheckConfig) -> Self {
        self.config.check.insert(name.to_string(), check);
        self
    }

    pub fn with_checkset(mut self, name: &str, checkset: ChecksetConfig) -> Self {
        self.config.checkset.insert(name.to_string(), checkset);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CheckConfig`.
pub struct CheckConfigBuilder {
    check: CheckConfig,
}

impl CheckConfigBuilder {
    pub fn cmd(cmd: &str) -> Self {
        Self {
            check: CheckConfig {
                cmd: Some(cmd.to_string()),
                argv: None,
                stamp: None,
            },
        }
    }

    pub fn argv(argv: &[&str]) -> Self {
        Self {
            check: CheckConfig {
                cmd: None,
                argv: Some(argv.iter().map(|a| a.to_string()).collect()),
                stamp: None,
            },
        }
    }

    pub fn stamp(mut self, id: &str) -> Self {
        self.check.stamp = Some(id.to_string());
        self
    }

    pub fn build(self) -> CheckConfig {
        self.check
    }
}

/// Builder for `ChecksetConfig`.
#[derive(Default)]
pub struct ChecksetConfigBuilder {
    checkset: ChecksetConfig,
}

impl ChecksetConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.checkset.with.insert(key.to_string(), value.to_string());
        self
    }

    pub fn chain(mut self, name: &str, deps: &[&str]) -> Self {
        self.checkset.chains.insert(
            name.to_string(),
            deps.iter().map(|d| d.to_string()).collect(),
        );
        self
    }

    pub fn build(self) -> ChecksetConfig {
        self.checkset
    }
}

/// Builder for an in-memory `Checkset` of [`FakeCheck`]s sharing one
/// [`Recorder`].
pub struct ChecksetBuilder {
    checkset: Checkset,
    recorder: Arc<Recorder>,
    delay: Duration,
}

impl ChecksetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            checkset: Checkset::new(name),
            recorder: Recorder::new(),
            delay: Duration::ZERO,
        }
    }

    /// Delay applied to every task added after this call.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        Arc::clone(&self.recorder)
    }

    pub fn task(mut self, name: &str, deps: &[&str], check: FakeCheck) -> Self {
        let check = if self.delay.is_zero() {
            check
        } else {
            check.with_delay(self.delay)
        };
        self.checkset
            .insert(name, deps.iter().map(|d| d.to_string()), Arc::new(check));
        self
    }

    pub fn pass(self, name: &str, deps: &[&str]) -> Self {
        let check = FakeCheck::pass(&self.recorder);
        self.task(name, deps, check)
    }

    pub fn fail(self, name: &str, deps: &[&str]) -> Self {
        let check = FakeCheck::fail(&self.recorder, &format!("{name} is broken"));
        self.task(name, deps, check)
    }

    pub fn panics(self, name: &str, deps: &[&str]) -> Self {
        let check = FakeCheck::panics(&self.recorder, &format!("{name} blew up"));
        self.task(name, deps, check)
    }

    pub fn build(self) -> (Checkset, Arc<Recorder>) {
        (self.checkset, self.recorder)
    }
}
