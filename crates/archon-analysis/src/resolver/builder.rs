//! GraphResolver: links raw units into a [`UnitGraph`].

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use archon_core::errors::{LocateError, ResolutionError};
use archon_core::events::{EventDispatcher, SecondaryLookupEvent, StubCreatedEvent};
use archon_core::types::collections::SmallVec4;
use archon_core::types::{
    AccessId, DependencyId, FxHashMap, FxHashSet, MemberId, PackageId, UnitId,
};

use super::names::{enclosing_by_name, package_of, simple_name};
use super::options::ResolverOptions;
use crate::classfile::descriptor::{element_type, is_primitive, parse_method_descriptor};
use crate::classfile::{self, RawAnnotation, RawAnnotationValue, RawMember, RawUnit};
use crate::domain::member::full_name;
use crate::domain::{
    Access, AccessKind, AccessTarget, Annotation, AnnotationValue, Constructor, Dependency, DependencyCause,
    DependencyKind, Field, Member, MemberInfo, MemberKind, Method, Modifiers, Package,
    SourceLocation, TypeReferenceKind, Unit, UnitGraph, UnitKind,
};
use crate::importer::ImportWarning;
use crate::locator::{LookupWorker, UnitLookup};

/// Output of a resolution: the graph plus every tolerated degradation.
#[derive(Debug)]
pub struct Resolution {
    pub graph: UnitGraph,
    pub warnings: Vec<ImportWarning>,
}

/// Resolves a set of raw units into a single consistent graph.
///
/// Single-threaded over private state; the graph is frozen when returned.
pub struct GraphResolver {
    options: ResolverOptions,
    lookup: Option<Arc<dyn UnitLookup>>,
    events: EventDispatcher,
}

impl GraphResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            lookup: None,
            events: EventDispatcher::new(),
        }
    }

    /// Auxiliary class path consulted for references outside the raw set.
    pub fn with_lookup(mut self, lookup: Arc<dyn UnitLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn resolve(&self, raw_units: Vec<RawUnit>) -> Result<Resolution, ResolutionError> {
        let mut discovery = Discovery::new(self);
        for unit in raw_units {
            discovery.add(unit, 0);
        }
        discovery.run();

        let Discovery {
            raw,
            derived,
            referenced_by,
            kind_hints,
            mut warnings,
            ..
        } = discovery;

        // Enclosing units that were never found become placeholders, even
        // when stub creation is off.
        let mut enclosing = FxHashMap::default();
        let mut placeholders = BTreeSet::new();
        let mut names: Vec<&String> = raw.keys().collect();
        names.sort();
        for name in names {
            let (chosen, mismatch) = enclosing_of(&raw[name]);
            if let Some(warning) = mismatch {
                warnings.push(warning);
            }
            if let Some(outer) = chosen {
                if !raw.contains_key(&outer) {
                    placeholders.insert(outer.clone());
                }
                enclosing.insert(name.clone(), outer);
            }
        }
        // Placeholders can be nested themselves; link them outward until
        // the chain reaches a known or top-level unit.
        let mut pending: VecDeque<String> = placeholders.iter().cloned().collect();
        while let Some(name) = pending.pop_front() {
            let Some(outer) = enclosing_by_name(&name) else {
                continue;
            };
            if !raw.contains_key(&outer) && placeholders.insert(outer.clone()) {
                pending.push_back(outer.clone());
            }
            enclosing.insert(name, outer);
        }

        let mut missing: BTreeSet<String> = referenced_by
            .keys()
            .filter(|n| !raw.contains_key(*n))
            .cloned()
            .collect();
        if !self.options.create_stubs {
            if let Some(reference) = missing.iter().find(|n| !placeholders.contains(*n)) {
                return Err(ResolutionError::UnresolvedReference {
                    unit: referenced_by
                        .get(reference)
                        .cloned()
                        .unwrap_or_default(),
                    reference: reference.clone(),
                });
            }
        }
        missing.extend(placeholders);

        for name in &missing {
            let referenced = referenced_by.get(name).cloned().unwrap_or_default();
            tracing::debug!(stub = %name, referenced_by = %referenced, "creating stub");
            self.events.emit_stub_created(&StubCreatedEvent {
                name: name.clone(),
                referenced_by: referenced,
            });
        }

        let builder = GraphBuilder::new(&raw, &derived, &missing, &kind_hints, &enclosing);
        Ok(Resolution {
            graph: builder.build(),
            warnings,
        })
    }
}

/// The enclosing unit a raw unit declares or implies, and a warning when
/// the two disagree. The attribute wins.
fn enclosing_of(raw: &RawUnit) -> (Option<String>, Option<ImportWarning>) {
    let by_name = enclosing_by_name(&raw.name);
    let by_attribute = raw
        .own_nesting()
        .and_then(|n| n.outer.clone())
        .or_else(|| raw.enclosing_method.as_ref().map(|e| e.unit.clone()));
    match (by_name, by_attribute) {
        (Some(n), Some(a)) if n != a => {
            let warning = ImportWarning::EnclosingMismatch {
                unit: raw.name.clone(),
                by_name: n,
                by_attribute: a.clone(),
            };
            (Some(a), Some(warning))
        }
        (n, a) => (a.or(n), None),
    }
}

/// Every unit name a raw unit refers to, with a kind hint for stubs.
fn references(raw: &RawUnit) -> Vec<(String, Option<UnitKind>)> {
    let mut refs = Vec::new();
    if let Some(ref s) = raw.superclass {
        refs.push((s.clone(), Some(UnitKind::Class)));
    }
    for i in &raw.interfaces {
        refs.push((i.clone(), Some(UnitKind::Interface)));
    }
    annotation_references(&raw.annotations, &mut refs);
    for member in &raw.members {
        for p in &member.parameter_types {
            refs.push((p.clone(), None));
        }
        refs.push((member.return_type.clone(), None));
        for t in &member.throws {
            refs.push((t.clone(), Some(UnitKind::Class)));
        }
        annotation_references(&member.annotations, &mut refs);
        for annotations in &member.parameter_annotations {
            annotation_references(annotations, &mut refs);
        }
        if let Some(ref value) = member.annotation_default {
            value_references(value, &mut refs);
        }
        for access in &member.accesses {
            refs.push((access.owner.clone(), None));
        }
        for reference in &member.type_references {
            refs.push((reference.type_name.clone(), None));
        }
    }
    if let (Some(outer), _) = enclosing_of(raw) {
        refs.push((outer, Some(UnitKind::Class)));
    }
    refs
}

fn annotation_references(annotations: &[RawAnnotation], refs: &mut Vec<(String, Option<UnitKind>)>) {
    for annotation in annotations {
        refs.push((annotation.type_name.clone(), Some(UnitKind::Annotation)));
        for (_, value) in &annotation.values {
            value_references(value, refs);
        }
    }
}

fn value_references(value: &RawAnnotationValue, refs: &mut Vec<(String, Option<UnitKind>)>) {
    match value {
        RawAnnotationValue::Enum { type_name, .. } => {
            refs.push((type_name.clone(), Some(UnitKind::Enum)))
        }
        RawAnnotationValue::Class(type_name) => refs.push((type_name.clone(), None)),
        RawAnnotationValue::Annotation(a) => annotation_references(std::slice::from_ref(a), refs),
        RawAnnotationValue::Array(values) => {
            for v in values {
                value_references(v, refs);
            }
        }
        _ => {}
    }
}

/// Worklist over referenced names, pulling missing units from the
/// auxiliary class path up to the configured depth.
struct Discovery<'r> {
    resolver: &'r GraphResolver,
    raw: FxHashMap<String, RawUnit>,
    depth: FxHashMap<String, u32>,
    queue: VecDeque<String>,
    /// Array and primitive names.
    derived: BTreeSet<String>,
    /// First unit seen referring to each name.
    referenced_by: FxHashMap<String, String>,
    kind_hints: FxHashMap<String, UnitKind>,
    /// Names already looked up, found or not.
    attempted: FxHashSet<String>,
    /// Shared by every lookup of one resolution.
    worker: Option<LookupWorker>,
    warnings: Vec<ImportWarning>,
}

impl<'r> Discovery<'r> {
    fn new(resolver: &'r GraphResolver) -> Self {
        Self {
            resolver,
            raw: FxHashMap::default(),
            depth: FxHashMap::default(),
            queue: VecDeque::new(),
            derived: BTreeSet::new(),
            referenced_by: FxHashMap::default(),
            kind_hints: FxHashMap::default(),
            attempted: FxHashSet::default(),
            worker: resolver.lookup.as_ref().map(|l| LookupWorker::new(Arc::clone(l))),
            warnings: Vec::new(),
        }
    }

    /// Register a unit as in progress: later references link to it.
    fn add(&mut self, unit: RawUnit, depth: u32) {
        let name = unit.name.clone();
        self.depth.insert(name.clone(), depth);
        if self.raw.insert(name.clone(), unit).is_none() {
            self.queue.push_back(name);
        }
    }

    fn run(&mut self) {
        while let Some(name) = self.queue.pop_front() {
            let depth = self.depth.get(&name).copied().unwrap_or(0);
            let refs = match self.raw.get(&name) {
                Some(unit) => references(unit),
                None => continue,
            };
            for (reference, hint) in refs {
                self.note(&reference, hint, &name, depth);
            }
        }
    }

    fn note(&mut self, reference: &str, hint: Option<UnitKind>, from: &str, depth: u32) {
        if reference.ends_with("[]") || is_primitive(reference) {
            let mut current = reference;
            while let Some(component) = current.strip_suffix("[]") {
                self.derived.insert(current.to_string());
                current = component;
            }
            if is_primitive(current) {
                self.derived.insert(current.to_string());
                return;
            }
            return self.note(element_type(reference), hint, from, depth);
        }
        if self.raw.contains_key(reference) {
            return;
        }
        self.referenced_by
            .entry(reference.to_string())
            .or_insert_with(|| from.to_string());
        if let Some(kind) = hint {
            self.kind_hints.entry(reference.to_string()).or_insert(kind);
        }

        let resolver = self.resolver;
        let options = &resolver.options;
        let Some(worker) = self.worker.as_mut() else {
            return;
        };
        if depth >= options.max_depth
            || !options.should_lookup(reference)
            || !self.attempted.insert(reference.to_string())
        {
            return;
        }

        let result = worker.resolve(reference, options.lookup_timeout);
        let (found, timed_out) = match result {
            Ok(Some(bytes)) => match classfile::read(&bytes) {
                Ok(unit) if unit.name == reference => {
                    tracing::debug!(unit = %reference, depth = depth + 1, "resolved from class path");
                    self.add(unit, depth + 1);
                    (true, false)
                }
                Ok(unit) => {
                    self.warnings.push(ImportWarning::LookupFailed {
                        name: reference.to_string(),
                        reason: format!("class file declares {}", unit.name),
                    });
                    (false, false)
                }
                Err(e) => {
                    self.warnings.push(ImportWarning::LookupFailed {
                        name: reference.to_string(),
                        reason: e.to_string(),
                    });
                    (false, false)
                }
            },
            Ok(None) => (false, false),
            Err(LocateError::Timeout { timeout_ms, .. }) => {
                tracing::warn!(unit = %reference, timeout_ms, "class path lookup timed out");
                self.warnings.push(ImportWarning::LookupTimedOut {
                    name: reference.to_string(),
                    timeout_ms,
                });
                (false, true)
            }
            Err(e) => {
                tracing::warn!(unit = %reference, error = %e, "class path lookup failed");
                self.warnings.push(ImportWarning::LookupFailed {
                    name: reference.to_string(),
                    reason: e.to_string(),
                });
                (false, false)
            }
        };
        resolver.events.emit_secondary_lookup(&SecondaryLookupEvent {
            name: reference.to_string(),
            found,
            timed_out,
        });
    }
}

/// Arena construction once every name is known.
struct GraphBuilder<'a> {
    raw: &'a FxHashMap<String, RawUnit>,
    derived: &'a BTreeSet<String>,
    stubs: &'a BTreeSet<String>,
    kind_hints: &'a FxHashMap<String, UnitKind>,
    enclosing: &'a FxHashMap<String, String>,
    names: Vec<String>,
    ids: FxHashMap<String, UnitId>,
    units: Vec<Unit>,
    members: Vec<Member>,
    accesses: Vec<Access>,
    dependencies: BTreeMap<(UnitId, UnitId, DependencyKind), Vec<DependencyCause>>,
}

impl<'a> GraphBuilder<'a> {
    fn new(
        raw: &'a FxHashMap<String, RawUnit>,
        derived: &'a BTreeSet<String>,
        stubs: &'a BTreeSet<String>,
        kind_hints: &'a FxHashMap<String, UnitKind>,
        enclosing: &'a FxHashMap<String, String>,
    ) -> Self {
        // Handles are allocated up front, in name order.
        let all: BTreeSet<&String> = raw.keys().chain(derived.iter()).chain(stubs.iter()).collect();
        let names: Vec<String> = all.into_iter().cloned().collect();
        let ids = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), UnitId::new(i)))
            .collect();
        Self {
            raw,
            derived,
            stubs,
            kind_hints,
            enclosing,
            names,
            ids,
            units: Vec::new(),
            members: Vec::new(),
            accesses: Vec::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Every referenced name was registered during discovery.
    fn id(&self, name: &str) -> UnitId {
        self.ids[name]
    }

    fn build(mut self) -> UnitGraph {
        self.allocate_units();
        self.allocate_members();
        self.link_accesses();
        self.derive_dependencies();
        let dependencies = self.freeze_dependencies();
        let packages = self.build_packages();
        UnitGraph::assemble(self.units, self.members, self.accesses, dependencies, packages)
    }

    fn allocate_units(&mut self) {
        for (index, name) in self.names.iter().enumerate() {
            let id = UnitId::new(index);
            let raw = self.raw.get(name);
            let mut unit = Unit {
                id,
                name: name.clone(),
                simple_name: simple_name(name, raw),
                package_name: package_of(name).to_string(),
                kind: UnitKind::Class,
                modifiers: Modifiers::default(),
                is_stub: false,
                source_file: None,
                superclass: None,
                interfaces: SmallVec4::new(),
                enclosing: self.enclosing.get(name).map(|e| self.ids[e.as_str()]),
                component: None,
                package: PackageId::new(0),
                members: Vec::new(),
                annotations: Vec::new(),
                outgoing: Vec::new(),
                incoming: Vec::new(),
                accesses_from: Vec::new(),
                accesses_to: Vec::new(),
            };
            if let Some(raw) = raw {
                unit.kind = raw.kind;
                unit.modifiers = raw.modifiers;
                unit.source_file = raw.source_file.clone();
                unit.superclass = raw.superclass.as_deref().map(|s| self.ids[s]);
                unit.interfaces = raw.interfaces.iter().map(|i| self.ids[i.as_str()]).collect();
            } else if self.derived.contains(name) {
                let flags = Modifiers::PUBLIC | Modifiers::FINAL | Modifiers::ABSTRACT;
                unit.modifiers = Modifiers::new(flags);
                if let Some(component) = name.strip_suffix("[]") {
                    unit.kind = UnitKind::Array;
                    unit.component = Some(self.ids[component]);
                } else {
                    unit.kind = UnitKind::Primitive;
                }
            } else {
                unit.is_stub = true;
                unit.kind = self.kind_hints.get(name).copied().unwrap_or(UnitKind::Class);
            }
            self.units.push(unit);
        }
        debug_assert!(self.stubs.iter().all(|s| self.units[self.ids[s].index()].is_stub));
    }

    fn convert_annotations(&self, annotations: &[RawAnnotation]) -> Vec<Annotation> {
        annotations.iter().map(|a| self.convert_annotation(a)).collect()
    }

    fn convert_annotation(&self, annotation: &RawAnnotation) -> Annotation {
        Annotation {
            unit: self.id(&annotation.type_name),
            type_name: annotation.type_name.clone(),
            values: annotation
                .values
                .iter()
                .map(|(n, v)| (n.clone(), self.convert_value(v)))
                .collect(),
        }
    }

    fn convert_value(&self, value: &RawAnnotationValue) -> AnnotationValue {
        match value {
            RawAnnotationValue::Bool(v) => AnnotationValue::Bool(*v),
            RawAnnotationValue::Byte(v) => AnnotationValue::Byte(*v),
            RawAnnotationValue::Char(v) => AnnotationValue::Char(*v),
            RawAnnotationValue::Short(v) => AnnotationValue::Short(*v),
            RawAnnotationValue::Int(v) => AnnotationValue::Int(*v),
            RawAnnotationValue::Long(v) => AnnotationValue::Long(*v),
            RawAnnotationValue::Float(v) => AnnotationValue::Float(*v),
            RawAnnotationValue::Double(v) => AnnotationValue::Double(*v),
            RawAnnotationValue::String(v) => AnnotationValue::String(v.clone()),
            RawAnnotationValue::Enum {
                type_name,
                constant,
            } => AnnotationValue::Enum {
                unit: self.id(type_name),
                type_name: type_name.clone(),
                constant: constant.clone(),
            },
            RawAnnotationValue::Class(type_name) => AnnotationValue::Class {
                unit: self.id(type_name),
                type_name: type_name.clone(),
            },
            RawAnnotationValue::Annotation(a) => {
                AnnotationValue::Annotation(Box::new(self.convert_annotation(a)))
            }
            RawAnnotationValue::Array(values) => {
                AnnotationValue::Array(values.iter().map(|v| self.convert_value(v)).collect())
            }
        }
    }

    fn allocate_members(&mut self) {
        for index in 0..self.names.len() {
            let raw_units = self.raw;
            let Some(raw) = raw_units.get(&self.names[index]) else {
                continue;
            };
            let owner = UnitId::new(index);
            let mut ids = Vec::with_capacity(raw.members.len());
            for member in &raw.members {
                let id = MemberId::new(self.members.len());
                let built = self.build_member(id, owner, &raw.name, member);
                self.members.push(built);
                ids.push(id);
            }
            self.units[index].members = ids;
        }
        for index in 0..self.names.len() {
            let raw_units = self.raw;
            if let Some(raw) = raw_units.get(&self.names[index]) {
                let annotations = self.convert_annotations(&raw.annotations);
                self.units[index].annotations = annotations;
            }
        }
    }

    fn build_member(&self, id: MemberId, owner: UnitId, owner_name: &str, raw: &RawMember) -> Member {
        let info = MemberInfo {
            id,
            owner,
            name: raw.name.clone(),
            descriptor: raw.descriptor.clone(),
            modifiers: raw.modifiers,
            annotations: self.convert_annotations(&raw.annotations),
            full_name: full_name(owner_name, raw.kind, &raw.name, &raw.parameter_types),
            line: raw.line,
        };
        let parameters: SmallVec4<UnitId> =
            raw.parameter_types.iter().map(|p| self.id(p)).collect();
        let throws: SmallVec4<UnitId> = raw.throws.iter().map(|t| self.id(t)).collect();
        let parameter_annotations = raw
            .parameter_annotations
            .iter()
            .map(|a| self.convert_annotations(a))
            .collect();
        match raw.kind {
            MemberKind::Field => Member::Field(Field {
                info,
                field_type: self.id(&raw.return_type),
            }),
            MemberKind::Method => Member::Method(Method {
                info,
                parameters,
                return_type: self.id(&raw.return_type),
                throws,
                parameter_annotations,
                annotation_default: raw.annotation_default.as_ref().map(|v| self.convert_value(v)),
                accesses: Vec::new(),
            }),
            MemberKind::Constructor => Member::Constructor(Constructor {
                info,
                parameters,
                throws,
                parameter_annotations,
                accesses: Vec::new(),
            }),
        }
    }

    /// Look for a member on `owner` or its supertypes.
    fn find_in_hierarchy(&self, owner: UnitId, name: &str, descriptor: &str) -> Option<MemberId> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([owner]);
        seen.insert(owner);
        while let Some(current) = queue.pop_front() {
            let unit = &self.units[current.index()];
            let found = unit.members.iter().find(|m| {
                let info = self.members[m.index()].info();
                info.name == name && info.descriptor == descriptor
            });
            if let Some(found) = found {
                return Some(*found);
            }
            for next in unit.superclass.iter().chain(unit.interfaces.iter()) {
                if seen.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
        None
    }

    fn link_accesses(&mut self) {
        for index in 0..self.names.len() {
            let raw_units = self.raw;
            let Some(raw) = raw_units.get(&self.names[index]) else {
                continue;
            };
            let origin_unit = UnitId::new(index);
            let member_ids = self.units[index].members.clone();
            for (member_id, member) in member_ids.iter().zip(&raw.members) {
                let mut ids = Vec::with_capacity(member.accesses.len());
                for access in &member.accesses {
                    let id = AccessId::new(self.accesses.len());
                    let owner = self.id(&access.owner);
                    let target_full_name = match access.kind {
                        AccessKind::GetField | AccessKind::SetField => {
                            format!("{}.{}", access.owner, access.name)
                        }
                        _ => {
                            let parameters = parse_method_descriptor(&access.descriptor)
                                .map(|d| d.parameters)
                                .unwrap_or_default();
                            full_name(&access.owner, MemberKind::Method, &access.name, &parameters)
                        }
                    };
                    let origin = &self.members[member_id.index()];
                    let description = format!(
                        "{} {} <{}>",
                        origin.describe(),
                        access.kind.verb(),
                        target_full_name
                    );
                    self.accesses.push(Access {
                        id,
                        kind: access.kind,
                        origin: *member_id,
                        origin_unit,
                        target: AccessTarget {
                            owner,
                            name: access.name.clone(),
                            descriptor: access.descriptor.clone(),
                            full_name: target_full_name,
                            resolved: self.find_in_hierarchy(owner, &access.name, &access.descriptor),
                        },
                        location: SourceLocation::new(&raw.name, raw.source_file.clone(), access.line),
                        description,
                    });
                    self.units[index].accesses_from.push(id);
                    self.units[owner.index()].accesses_to.push(id);
                    ids.push(id);
                }
                match &mut self.members[member_id.index()] {
                    Member::Method(m) => m.accesses = ids,
                    Member::Constructor(c) => c.accesses = ids,
                    Member::Field(_) => {}
                }
            }
        }
    }

    /// Dependency target for a referenced type: arrays count as their
    /// element type, primitives produce nothing.
    fn dependency_target(&self, target: UnitId) -> Option<UnitId> {
        let mut current = &self.units[target.index()];
        while let Some(component) = current.component {
            current = &self.units[component.index()];
        }
        if current.is_primitive() {
            None
        } else {
            Some(current.id)
        }
    }

    fn add_dependency(
        &mut self,
        origin: UnitId,
        target: UnitId,
        kind: DependencyKind,
        description: String,
        location: &SourceLocation,
    ) {
        let Some(target) = self.dependency_target(target) else {
            return;
        };
        if target == origin {
            return;
        }
        let cause = DependencyCause {
            description,
            location: location.clone(),
        };
        let causes = self.dependencies.entry((origin, target, kind)).or_default();
        if !causes.contains(&cause) {
            causes.push(cause);
        }
    }

    fn annotation_dependencies(
        &mut self,
        origin: UnitId,
        subject: &str,
        verb: &str,
        annotations: &[Annotation],
        location: &SourceLocation,
    ) {
        for annotation in annotations {
            self.add_dependency(
                origin,
                annotation.unit,
                DependencyKind::Annotation,
                format!("{subject} {verb} <{}>", annotation.type_name),
                location,
            );
            let mut referenced = Vec::new();
            for (_, value) in &annotation.values {
                value.referenced_units(&mut referenced);
            }
            for unit in referenced {
                let type_name = self.units[unit.index()].name.clone();
                self.add_dependency(
                    origin,
                    unit,
                    DependencyKind::Annotation,
                    format!("{subject} has annotation member of type <{type_name}>"),
                    location,
                );
            }
        }
    }

    fn derive_dependencies(&mut self) {
        for index in 0..self.names.len() {
            let raw_units = self.raw;
            let Some(raw) = raw_units.get(&self.names[index]) else {
                continue;
            };
            let origin = UnitId::new(index);
            let unit_location = SourceLocation::new(&raw.name, raw.source_file.clone(), 0);
            let subject = format!("Unit <{}>", raw.name);

            if let Some(superclass) = self.units[index].superclass {
                let description =
                    format!("{subject} extends unit <{}>", self.units[superclass.index()].name);
                self.add_dependency(origin, superclass, DependencyKind::Extends, description, &unit_location);
            }
            for interface in self.units[index].interfaces.clone() {
                let description =
                    format!("{subject} implements interface <{}>", self.units[interface.index()].name);
                self.add_dependency(origin, interface, DependencyKind::Implements, description, &unit_location);
            }
            let annotations = self.units[index].annotations.clone();
            self.annotation_dependencies(origin, &subject, "is annotated with", &annotations, &unit_location);

            for (member_id, raw_member) in self.units[index].members.clone().iter().zip(&raw.members) {
                let member = self.members[member_id.index()].clone();
                let described = member.describe();
                let location = SourceLocation::new(&raw.name, raw.source_file.clone(), raw_member.line);
                let type_name = |builder: &Self, id: UnitId| builder.units[id.index()].name.clone();

                match &member {
                    Member::Field(f) => {
                        let description = format!("{described} has type <{}>", type_name(self, f.field_type));
                        self.add_dependency(origin, f.field_type, DependencyKind::FieldType, description, &location);
                    }
                    Member::Method(m) => {
                        let description =
                            format!("{described} has return type <{}>", type_name(self, m.return_type));
                        self.add_dependency(origin, m.return_type, DependencyKind::ReturnType, description, &location);
                    }
                    Member::Constructor(_) => {}
                }
                for parameter in member.parameters() {
                    let description =
                        format!("{described} has parameter of type <{}>", type_name(self, *parameter));
                    self.add_dependency(origin, *parameter, DependencyKind::ParameterType, description, &location);
                }
                for thrown in member.throws() {
                    let description = format!("{described} throws type <{}>", type_name(self, *thrown));
                    self.add_dependency(origin, *thrown, DependencyKind::Throws, description, &location);
                }
                self.annotation_dependencies(
                    origin,
                    &described,
                    "is annotated with",
                    &member.info().annotations,
                    &location,
                );
                let parameter_annotations: Vec<Annotation> = match &member {
                    Member::Method(m) => m.parameter_annotations.concat(),
                    Member::Constructor(c) => c.parameter_annotations.concat(),
                    Member::Field(_) => Vec::new(),
                };
                self.annotation_dependencies(
                    origin,
                    &described,
                    "has parameter annotated with",
                    &parameter_annotations,
                    &location,
                );
                if let Member::Method(Method {
                    annotation_default: Some(ref value),
                    ..
                }) = member
                {
                    let mut referenced = Vec::new();
                    value.referenced_units(&mut referenced);
                    for unit in referenced {
                        let description =
                            format!("{described} has annotation default of type <{}>", type_name(self, unit));
                        self.add_dependency(origin, unit, DependencyKind::Annotation, description, &location);
                    }
                }

                for access_id in member.accesses() {
                    let access = self.accesses[access_id.index()].clone();
                    self.add_dependency(
                        origin,
                        access.target.owner,
                        DependencyKind::from_access(access.kind),
                        access.description,
                        &access.location,
                    );
                }
                for reference in &raw_member.type_references {
                    let target = self.id(&reference.type_name);
                    let verb = match reference.kind {
                        TypeReferenceKind::InstanceOf => "checks instanceof",
                        TypeReferenceKind::ClassLiteral => "references class object",
                    };
                    let description = format!("{described} {verb} <{}>", reference.type_name);
                    let reference_location =
                        SourceLocation::new(&raw.name, raw.source_file.clone(), reference.line);
                    self.add_dependency(origin, target, DependencyKind::TypeReference, description, &reference_location);
                }
            }
        }
    }

    fn freeze_dependencies(&mut self) -> Vec<Dependency> {
        let collected = std::mem::take(&mut self.dependencies);
        let mut dependencies = Vec::with_capacity(collected.len());
        for ((origin, target, kind), causes) in collected {
            let id = DependencyId::new(dependencies.len());
            self.units[origin.index()].outgoing.push(id);
            self.units[target.index()].incoming.push(id);
            dependencies.push(Dependency {
                id,
                origin,
                target,
                kind,
                causes,
            });
        }
        dependencies
    }

    fn build_packages(&mut self) -> Vec<Package> {
        let mut packages = vec![Package {
            id: PackageId::new(0),
            name: String::new(),
            simple_name: String::new(),
            parent: None,
            children: Vec::new(),
            units: Vec::new(),
        }];
        let mut by_name: FxHashMap<String, PackageId> = FxHashMap::default();
        by_name.insert(String::new(), PackageId::new(0));

        for unit in &mut self.units {
            let mut current = PackageId::new(0);
            let mut prefix = String::new();
            if !unit.package_name.is_empty() {
                for segment in unit.package_name.split('.') {
                    if !prefix.is_empty() {
                        prefix.push('.');
                    }
                    prefix.push_str(segment);
                    current = match by_name.get(&prefix) {
                        Some(id) => *id,
                        None => {
                            let id = PackageId::new(packages.len());
                            packages.push(Package {
                                id,
                                name: prefix.clone(),
                                simple_name: segment.to_string(),
                                parent: Some(current),
                                children: Vec::new(),
                                units: Vec::new(),
                            });
                            packages[current.index()].children.push(id);
                            by_name.insert(prefix.clone(), id);
                            id
                        }
                    };
                }
            }
            unit.package = current;
            if !unit.is_array() && !unit.is_primitive() {
                packages[current.index()].units.push(unit.id);
            }
        }
        packages
    }
}
