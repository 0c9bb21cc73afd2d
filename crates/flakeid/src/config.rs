//! Node identity configuration.
//!
//! The datacenter and machine identifiers are assigned outside this crate
//! (deployment manifests, environment, a coordination service). [`NodeConfig`]
//! is the seam where such an assignment enters: it can be deserialized as part
//! of a larger application config or read from the environment, and is
//! validated before a [`Generator`] is built from it.

use crate::{
    error::{Error, IdentifierField},
    generator::{Generator, check_identifier},
    time::{DEFAULT_EPOCH, SystemClock, TimeSource},
};

/// Environment variable holding the datacenter ID.
pub const DATACENTER_ID_VAR: &str = "FLAKEID_DATACENTER_ID";

/// Environment variable holding the machine ID.
pub const MACHINE_ID_VAR: &str = "FLAKEID_MACHINE_ID";

/// Optional environment variable overriding the epoch (ms since 1970).
pub const EPOCH_MS_VAR: &str = "FLAKEID_EPOCH_MS";

/// Errors raised while loading a [`NodeConfig`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {name}")]
    MissingVar { name: &'static str },

    #[error("environment variable {name} is not an integer: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error(transparent)]
    Generator(#[from] Error),
}

/// Externally assigned identity of a generating node.
///
/// Identifiers are kept signed so that a negative value coming from a config
/// file is reported as [`Error::InvalidIdentifierRange`] rather than failing
/// to parse.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeConfig {
    pub datacenter_id: i64,
    pub machine_id: i64,
    /// Epoch in ms since the Unix epoch; [`DEFAULT_EPOCH`] when unset.
    #[cfg_attr(feature = "serde", serde(default))]
    pub epoch_millis: Option<u64>,
}

impl NodeConfig {
    pub fn new(datacenter_id: i64, machine_id: i64) -> Self {
        Self {
            datacenter_id,
            machine_id,
            epoch_millis: None,
        }
    }

    /// Reads [`DATACENTER_ID_VAR`], [`MACHINE_ID_VAR`] and the optional
    /// [`EPOCH_MS_VAR`] from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// is not an integer. Range checks happen in [`NodeConfig::build`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`NodeConfig::from_env`], but resolves variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`NodeConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<i64, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::MissingVar { name })?;
            parse_var(name, &value)
        };

        let datacenter_id = required(DATACENTER_ID_VAR)?;
        let machine_id = required(MACHINE_ID_VAR)?;
        let epoch_millis = lookup(EPOCH_MS_VAR)
            .map(|value| parse_var(EPOCH_MS_VAR, &value))
            .transpose()?;

        Ok(Self {
            datacenter_id,
            machine_id,
            epoch_millis,
        })
    }

    /// Checks both identifiers against the 5-bit fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifierRange`] for the first identifier
    /// outside `0..=31`.
    pub fn validate(&self) -> Result<(u64, u64), Error> {
        let datacenter_id = check_identifier(IdentifierField::Datacenter, self.datacenter_id)?;
        let machine_id = check_identifier(IdentifierField::Machine, self.machine_id)?;
        Ok((datacenter_id, machine_id))
    }

    /// Builds a generator on the system wall clock.
    ///
    /// # Errors
    ///
    /// See [`NodeConfig::validate`].
    pub fn build(&self) -> Result<Generator<SystemClock>, Error> {
        self.build_with_clock(SystemClock)
    }

    /// Builds a generator reading time from `time`.
    ///
    /// # Errors
    ///
    /// See [`NodeConfig::validate`].
    pub fn build_with_clock<T: TimeSource>(&self, time: T) -> Result<Generator<T>, Error> {
        let (datacenter_id, machine_id) = self.validate()?;
        let epoch = self.epoch_millis.unwrap_or(DEFAULT_EPOCH);

        #[cfg(feature = "tracing")]
        tracing::info!(datacenter_id, machine_id, epoch, "building id generator");

        Generator::with_epoch(datacenter_id, machine_id, epoch, time)
    }
}

fn parse_var<N: core::str::FromStr>(name: &'static str, value: &str) -> Result<N, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar {
            name,
            value: value.to_owned(),
        })
}
