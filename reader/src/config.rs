//! Startup configuration. Read once, never changed while the loop runs.

use core::time::Duration;

use log::warn;

use crate::convert::{NumericConverter, OverlongPolicy, Radix};
use crate::error::ConfigError;
use crate::family::{TagFamily, TagFamilySet};
use crate::{CARD_TIMEOUT_MS, MAX_CARD_ID_LEN};

/// What the acquisition adapter is told to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSetup {
    pub families: TagFamilySet,
    /// Let the reader accept configuration cards
    pub config_card: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub card_timeout: Duration,
    pub max_id_len: usize,
    pub search: TagFamilySet,
    pub report: TagFamilySet,
    pub radix: Radix,
    pub overlong: OverlongPolicy,
    pub config_card: bool,
}

impl ReaderConfig {
    /// LF families searched by default. TIRIS, FDX-B, PAC, Cotag and Deister
    /// need long search cycles and are left out.
    pub fn default_lf_search() -> TagFamilySet {
        TagFamilySet::all_lf()
            .without(TagFamily::Tiris)
            .without(TagFamily::IsoFdx)
            .without(TagFamily::Pac)
            .without(TagFamily::Cotag)
            .without(TagFamily::Deister)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.card_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_id_len == 0 || self.max_id_len > MAX_CARD_ID_LEN {
            return Err(ConfigError::IdLength(self.max_id_len));
        }
        if self.report.is_empty() {
            return Err(ConfigError::NoReportFamilies);
        }
        let unsearched = self.report - self.search;
        if !unsearched.is_empty() {
            warn!("Reported families never searched for: {}", unsearched);
        }
        Ok(())
    }

    pub fn search_setup(&self) -> SearchSetup {
        SearchSetup {
            families: self.search,
            config_card: self.config_card,
        }
    }

    pub fn converter(&self) -> NumericConverter {
        NumericConverter::new(self.report)
            .with_radix(self.radix)
            .with_max_len(self.max_id_len)
            .with_overlong(self.overlong)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            card_timeout: Duration::from_millis(CARD_TIMEOUT_MS),
            max_id_len: MAX_CARD_ID_LEN,
            search: Self::default_lf_search().with(TagFamily::Felica),
            report: TagFamilySet::empty().with(TagFamily::Felica),
            radix: Radix::Hex,
            overlong: OverlongPolicy::Reject,
            config_card: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.card_timeout, Duration::from_millis(2000));
        assert_eq!(config.max_id_len, 128);
        assert!(config.search.contains(TagFamily::Felica));
        assert!(config.search.contains(TagFamily::Em4102));
        assert!(!config.search.contains(TagFamily::Tiris));
        assert!(!config.search.contains(TagFamily::Iso14443a));
        assert_eq!(config.report.iter().collect::<Vec<_>>(), [TagFamily::Felica]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let config = ReaderConfig {
            card_timeout: Duration::ZERO,
            ..ReaderConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        for max_id_len in [0, MAX_CARD_ID_LEN + 1] {
            let config = ReaderConfig {
                max_id_len,
                ..ReaderConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::IdLength(max_id_len)));
        }

        let config = ReaderConfig {
            report: TagFamilySet::empty(),
            ..ReaderConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoReportFamilies));
    }

    #[test]
    fn unsearched_report_family_is_accepted() {
        let config = ReaderConfig {
            report: TagFamilySet::empty().with(TagFamily::Legic),
            ..ReaderConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn search_setup_carries_config_card_flag() {
        let config = ReaderConfig {
            config_card: true,
            ..ReaderConfig::default()
        };
        let setup = config.search_setup();
        assert!(setup.config_card);
        assert_eq!(setup.families, config.search);
        assert_eq!(config.converter().report(), config.report);
    }
}
