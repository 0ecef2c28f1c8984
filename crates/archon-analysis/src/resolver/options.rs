//! Resolver options derived from configuration.

use std::time::Duration;

use archon_core::config::ResolutionConfig;

/// Effective resolution settings.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub secondary_resolution: bool,
    pub max_depth: u32,
    pub create_stubs: bool,
    pub lookup_timeout: Duration,
    pub always_resolve: Vec<glob::Pattern>,
}

impl ResolverOptions {
    pub fn from_config(config: &ResolutionConfig) -> Self {
        let always_resolve = config
            .always_resolve
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!(pattern = %p, error = %e, "ignoring invalid always_resolve pattern");
                    None
                }
            })
            .collect();
        Self {
            secondary_resolution: config.effective_secondary_resolution(),
            max_depth: config.effective_max_depth(),
            create_stubs: config.effective_create_stubs(),
            lookup_timeout: config.effective_lookup_timeout(),
            always_resolve,
        }
    }

    /// Whether a missing reference should be looked up on the auxiliary
    /// class path.
    pub fn should_lookup(&self, name: &str) -> bool {
        self.secondary_resolution || self.always_resolve.iter().any(|p| p.matches(name))
    }
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::from_config(&ResolutionConfig::default())
    }
}
