//! Import pipeline: locate → parse (parallel) → de-duplicate → resolve.

pub mod warning;

use std::sync::Arc;
use std::time::Instant;

use archon_core::config::ArchonConfig;
use archon_core::errors::{ImportError, MalformedUnitError};
use archon_core::events::{
    DuplicateUnitEvent, EventDispatcher, ImportCompleteEvent, ImportStartedEvent, UnitSkippedEvent,
};
use archon_core::types::FxHashMap;
use rayon::prelude::*;

use crate::classfile::{self, RawUnit};
use crate::domain::UnitGraph;
use crate::locator::{locate, LocatedUnit, UnitLookup, UnitSource};
use crate::resolver::{GraphResolver, ResolverOptions};

pub use warning::ImportWarning;

/// A resolved graph plus the degradations tolerated while building it.
#[derive(Debug)]
pub struct Imported {
    pub graph: UnitGraph,
    pub warnings: Vec<ImportWarning>,
}

/// Builds a [`UnitGraph`] from class-file sources.
pub struct ClassFileImporter {
    config: ArchonConfig,
    lookup: Option<Arc<dyn UnitLookup>>,
    events: EventDispatcher,
}

impl ClassFileImporter {
    pub fn new(config: ArchonConfig) -> Self {
        Self {
            config,
            lookup: None,
            events: EventDispatcher::new(),
        }
    }

    /// Auxiliary class path for references outside the imported sources.
    pub fn with_lookup(mut self, lookup: Arc<dyn UnitLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Import every unit reachable from `sources`.
    ///
    /// In strict mode the first unreadable or malformed unit aborts the
    /// import; otherwise it is skipped with a warning.
    pub fn import(&self, sources: &[UnitSource]) -> Result<Imported, ImportError> {
        ArchonConfig::validate(&self.config)?;
        let start = Instant::now();
        self.events.emit_import_started(&ImportStartedEvent {
            source_count: sources.len(),
        });
        tracing::info!(sources = sources.len(), "import started");

        let strict = self.config.import.effective_strict();
        let exclude = self
            .config
            .import
            .exclude
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();

        let mut warnings = Vec::new();
        let mut located = Vec::new();
        for result in locate(sources).with_exclude(exclude) {
            match result {
                Ok(unit) => located.push(unit),
                Err(e) if strict => return Err(e.into()),
                Err(e) => self.skip(&mut warnings, e.origin(), e.to_string()),
            }
        }

        let parsed = self.parse_all(&located);
        let mut units: Vec<(String, RawUnit)> = Vec::with_capacity(parsed.len());
        for (unit, result) in located.iter().zip(parsed) {
            match result {
                Ok(raw) => units.push((unit.origin.clone(), raw)),
                Err(source) if strict => {
                    return Err(ImportError::Malformed {
                        origin: unit.origin.clone(),
                        source,
                    })
                }
                Err(e) => self.skip(&mut warnings, unit.origin.clone(), e.to_string()),
            }
        }

        let raw_units = self.deduplicate(units, &mut warnings);
        let mut resolver = GraphResolver::new(ResolverOptions::from_config(&self.config.resolution))
            .with_events(self.events.clone());
        if let Some(ref lookup) = self.lookup {
            resolver = resolver.with_lookup(Arc::clone(lookup));
        }
        let resolution = resolver.resolve(raw_units)?;
        warnings.extend(resolution.warnings);
        let graph = resolution.graph;

        let duration_ms = start.elapsed().as_millis() as u64;
        let stubs = graph.stubs().count();
        tracing::info!(
            units = graph.units().len(),
            stubs,
            dependencies = graph.dependencies().len(),
            warnings = warnings.len(),
            duration_ms,
            "import complete"
        );
        self.events.emit_import_complete(&ImportCompleteEvent {
            units: graph.units().len(),
            stubs,
            dependencies: graph.dependencies().len(),
            warnings: warnings.len(),
            duration_ms,
        });
        Ok(Imported { graph, warnings })
    }

    /// Convenience for in-memory class files, keyed by origin.
    pub fn import_bytes(&self, units: Vec<(String, Vec<u8>)>) -> Result<Imported, ImportError> {
        let sources: Vec<UnitSource> = units
            .into_iter()
            .map(|(origin, bytes)| UnitSource::memory(origin, bytes))
            .collect();
        self.import(&sources)
    }

    /// Decode all located units, preserving their order.
    fn parse_all(&self, located: &[LocatedUnit]) -> Vec<Result<RawUnit, MalformedUnitError>> {
        let parse = || {
            located
                .par_iter()
                .map(|unit| classfile::read(&unit.bytes))
                .collect::<Vec<_>>()
        };
        match self.config.import.threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(parse),
                Err(e) => {
                    tracing::warn!(threads, error = %e, "falling back to the global thread pool");
                    parse()
                }
            },
            None => parse(),
        }
    }

    /// Later sources win over earlier ones for the same unit name.
    fn deduplicate(
        &self,
        units: Vec<(String, RawUnit)>,
        warnings: &mut Vec<ImportWarning>,
    ) -> Vec<RawUnit> {
        let mut by_name: FxHashMap<String, usize> = FxHashMap::default();
        let mut kept: Vec<Option<(String, RawUnit)>> = Vec::with_capacity(units.len());
        for (origin, raw) in units {
            if let Some(&previous) = by_name.get(&raw.name) {
                if let Some((dropped_origin, _)) = kept[previous].take() {
                    tracing::warn!(unit = %raw.name, kept = %origin, dropped = %dropped_origin, "duplicate unit");
                    self.events.emit_duplicate_unit(&DuplicateUnitEvent {
                        name: raw.name.clone(),
                        kept_origin: origin.clone(),
                        dropped_origin: dropped_origin.clone(),
                    });
                    warnings.push(ImportWarning::DuplicateUnit {
                        name: raw.name.clone(),
                        kept_origin: origin.clone(),
                        dropped_origin,
                    });
                }
            }
            by_name.insert(raw.name.clone(), kept.len());
            kept.push(Some((origin, raw)));
        }
        kept.into_iter().flatten().map(|(_, raw)| raw).collect()
    }

    fn skip(&self, warnings: &mut Vec<ImportWarning>, origin: String, reason: String) {
        tracing::warn!(origin = %origin, reason = %reason, "skipping unit");
        self.events.emit_unit_skipped(&UnitSkippedEvent {
            origin: origin.clone(),
            reason: reason.clone(),
        });
        warnings.push(ImportWarning::SkippedUnit { origin, reason });
    }
}

impl Default for ClassFileImporter {
    fn default() -> Self {
        Self::new(ArchonConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archon_fixtures::ClassFileBuilder;

    #[test]
    fn duplicate_units_keep_the_later_source() {
        let first = ClassFileBuilder::class("com.a.Foo").build();
        let second = ClassFileBuilder::class("com.a.Foo")
            .source_file(Some("Other.java"))
            .build();
        let imported = ClassFileImporter::default()
            .import_bytes(vec![("first".into(), first), ("second".into(), second)])
            .unwrap();
        let foo = imported.graph.unit_by_name("com.a.Foo").unwrap();
        assert_eq!(foo.source_file.as_deref(), Some("Other.java"));
        assert_eq!(
            imported.warnings,
            vec![ImportWarning::DuplicateUnit {
                name: "com.a.Foo".into(),
                kept_origin: "second".into(),
                dropped_origin: "first".into(),
            }]
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_import() {
        let mut config = ArchonConfig::default();
        config.import.threads = Some(0);
        let err = ClassFileImporter::new(config).import(&[]).unwrap_err();
        assert!(matches!(err, ImportError::Config(_)));
    }
}
