use crate::pool::PoolKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub(crate) const DEFAULT_MAX_DELTA_YOUNGEST_TO_LSMI: u32 = 2;
pub(crate) const DEFAULT_MAX_DELTA_OLDEST_TO_LSMI: u32 = 7;
pub(crate) const DEFAULT_BELOW_MAX_DEPTH: u32 = 15;

pub(crate) const DEFAULT_NON_LAZY_RETENTION_RULES_TIPS_LIMIT: usize = 100;
pub(crate) const DEFAULT_NON_LAZY_MAX_REFERENCED_TIP_AGE_SECONDS: u64 = 3;
pub(crate) const DEFAULT_NON_LAZY_MAX_APPROVERS: u32 = 2;
pub(crate) const DEFAULT_NON_LAZY_SPAMMER_TIPS_THRESHOLD: usize = 100;

pub(crate) const DEFAULT_SEMI_LAZY_RETENTION_RULES_TIPS_LIMIT: usize = 20;
pub(crate) const DEFAULT_SEMI_LAZY_MAX_REFERENCED_TIP_AGE_SECONDS: u64 = 3;
pub(crate) const DEFAULT_SEMI_LAZY_MAX_APPROVERS: u32 = 2;
pub(crate) const DEFAULT_SEMI_LAZY_SPAMMER_TIPS_THRESHOLD: usize = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} pool: retention rules tips limit must be greater than zero")]
    ZeroRetentionLimit(PoolKind),

    #[error("{0} pool: max approvers must be greater than zero")]
    ZeroMaxApprovers(PoolKind),

    #[error("{0} pool: max delta oldest to LSMI ({1}) must not undercut max delta youngest to LSMI ({2})")]
    DeltaInversion(PoolKind, u32, u32),

    #[error("{0} pool: below max depth ({1}) must not undercut max delta oldest to LSMI ({2})")]
    BelowMaxDepthTooTight(PoolKind, u32, u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Admission thresholds of a single tip pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Upper bound on `LSMI - youngest` for admissible tips.
    pub max_delta_youngest_to_lsmi: u32,
    /// Upper bound on `LSMI - oldest` for admissible tips.
    pub max_delta_oldest_to_lsmi: u32,
    /// Milestone distance beyond which a branch counts as deeply lazy.
    pub below_max_depth: u32,
    /// Hard cap on pool membership; a full pool only admits candidates that
    /// outscore its current worst member.
    pub retention_rules_tips_limit: usize,
    /// How long a tip may stay selectable after its first observed approver.
    pub max_referenced_tip_age: Duration,
    /// Number of observed approvers after which a tip stops being a tip.
    pub max_approvers: u32,
    /// Pool size above which bundles from flagged spam sources are refused.
    pub spammer_tips_threshold: usize,
}

/// Process-wide tip selection configuration, one threshold set per pool.
/// Immutable once validated at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub non_lazy: PoolConfig,
    pub semi_lazy: PoolConfig,
}

impl Config {
    pub fn build_default() -> Self {
        Self {
            non_lazy: PoolConfig {
                max_delta_youngest_to_lsmi: DEFAULT_MAX_DELTA_YOUNGEST_TO_LSMI,
                max_delta_oldest_to_lsmi: DEFAULT_MAX_DELTA_OLDEST_TO_LSMI,
                below_max_depth: DEFAULT_BELOW_MAX_DEPTH,
                retention_rules_tips_limit: DEFAULT_NON_LAZY_RETENTION_RULES_TIPS_LIMIT,
                max_referenced_tip_age: Duration::from_secs(DEFAULT_NON_LAZY_MAX_REFERENCED_TIP_AGE_SECONDS),
                max_approvers: DEFAULT_NON_LAZY_MAX_APPROVERS,
                spammer_tips_threshold: DEFAULT_NON_LAZY_SPAMMER_TIPS_THRESHOLD,
            },
            semi_lazy: PoolConfig {
                max_delta_youngest_to_lsmi: DEFAULT_BELOW_MAX_DEPTH,
                max_delta_oldest_to_lsmi: DEFAULT_BELOW_MAX_DEPTH,
                below_max_depth: DEFAULT_BELOW_MAX_DEPTH,
                retention_rules_tips_limit: DEFAULT_SEMI_LAZY_RETENTION_RULES_TIPS_LIMIT,
                max_referenced_tip_age: Duration::from_secs(DEFAULT_SEMI_LAZY_MAX_REFERENCED_TIP_AGE_SECONDS),
                max_approvers: DEFAULT_SEMI_LAZY_MAX_APPROVERS,
                spammer_tips_threshold: DEFAULT_SEMI_LAZY_SPAMMER_TIPS_THRESHOLD,
            },
        }
    }

    pub fn pool(&self, kind: PoolKind) -> &PoolConfig {
        match kind {
            PoolKind::NonLazy => &self.non_lazy,
            PoolKind::SemiLazy => &self.semi_lazy,
        }
    }

    /// Rejects threshold combinations the engine must never run with.
    /// Called once at startup, before any event is processed.
    pub fn validate(&self) -> ConfigResult<()> {
        for kind in [PoolKind::NonLazy, PoolKind::SemiLazy] {
            let pool = self.pool(kind);
            if pool.retention_rules_tips_limit == 0 {
                return Err(ConfigError::ZeroRetentionLimit(kind));
            }
            if pool.max_approvers == 0 {
                return Err(ConfigError::ZeroMaxApprovers(kind));
            }
            if pool.max_delta_oldest_to_lsmi < pool.max_delta_youngest_to_lsmi {
                return Err(ConfigError::DeltaInversion(kind, pool.max_delta_oldest_to_lsmi, pool.max_delta_youngest_to_lsmi));
            }
            if pool.below_max_depth < pool.max_delta_oldest_to_lsmi {
                return Err(ConfigError::BelowMaxDepthTooTight(kind, pool.below_max_depth, pool.max_delta_oldest_to_lsmi));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::build_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(Config::build_default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_thresholds_are_fatal() {
        let mut config = Config::build_default();
        config.semi_lazy.retention_rules_tips_limit = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRetentionLimit(PoolKind::SemiLazy)));

        let mut config = Config::build_default();
        config.non_lazy.max_approvers = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxApprovers(PoolKind::NonLazy)));

        let mut config = Config::build_default();
        config.non_lazy.max_delta_oldest_to_lsmi = 1;
        assert_eq!(config.validate(), Err(ConfigError::DeltaInversion(PoolKind::NonLazy, 1, 2)));

        let mut config = Config::build_default();
        config.non_lazy.below_max_depth = 3;
        assert_eq!(config.validate(), Err(ConfigError::BelowMaxDepthTooTight(PoolKind::NonLazy, 3, 7)));
    }
}
