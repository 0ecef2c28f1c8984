//! The immutable unit graph and its query surface.

use std::collections::VecDeque;

use archon_core::errors::QueryError;
use archon_core::types::{
    AccessId, DependencyId, FxHashMap, FxHashSet, MemberId, PackageId, UnitId,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use xxhash_rust::xxh3::Xxh3;

use super::annotation::{Annotation, AnnotationValue};
use super::edges::{Access, Dependency, Direction, Package};
use super::member::Member;
use super::unit::Unit;

/// Arena-backed graph of units, members, edges, and packages.
///
/// Built once by the resolver; every handle stored anywhere in the graph
/// indexes one of its arenas. `Send + Sync`, shared without locking.
#[derive(Debug, Clone)]
pub struct UnitGraph {
    units: Vec<Unit>,
    members: Vec<Member>,
    accesses: Vec<Access>,
    dependencies: Vec<Dependency>,
    packages: Vec<Package>,
    by_name: FxHashMap<String, UnitId>,
    package_by_name: FxHashMap<String, PackageId>,
    /// Node `i` is unit `i`; edge weights are dependency handles.
    dependency_graph: DiGraph<UnitId, DependencyId>,
    fingerprint: u64,
}

impl UnitGraph {
    pub(crate) fn assemble(
        units: Vec<Unit>,
        members: Vec<Member>,
        accesses: Vec<Access>,
        dependencies: Vec<Dependency>,
        packages: Vec<Package>,
    ) -> Self {
        let by_name = units.iter().map(|u| (u.name.clone(), u.id)).collect();
        let package_by_name = packages.iter().map(|p| (p.name.clone(), p.id)).collect();

        let mut dependency_graph = DiGraph::with_capacity(units.len(), dependencies.len());
        for unit in &units {
            dependency_graph.add_node(unit.id);
        }
        for dep in &dependencies {
            dependency_graph.add_edge(
                NodeIndex::new(dep.origin.index()),
                NodeIndex::new(dep.target.index()),
                dep.id,
            );
        }

        let mut graph = Self {
            units,
            members,
            accesses,
            dependencies,
            packages,
            by_name,
            package_by_name,
            dependency_graph,
            fingerprint: 0,
        };
        graph.fingerprint = graph.compute_fingerprint();
        graph
    }

    // ---- Arenas ----

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.index()]
    }

    pub fn unit_by_name(&self, name: &str) -> Option<&Unit> {
        self.by_name.get(name).map(|id| self.unit(*id))
    }

    pub fn require_unit(&self, name: &str) -> Result<&Unit, QueryError> {
        self.unit_by_name(name).ok_or_else(|| QueryError::UnitNotFound {
            name: name.to_string(),
        })
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    pub fn members_of(&self, unit: UnitId) -> impl Iterator<Item = &Member> + '_ {
        self.unit(unit).members.iter().map(move |id| self.member(*id))
    }

    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    pub fn access(&self, id: AccessId) -> &Access {
        &self.accesses[id.index()]
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn dependency(&self, id: DependencyId) -> &Dependency {
        &self.dependencies[id.index()]
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    pub fn root_package(&self) -> &Package {
        &self.packages[0]
    }

    pub fn package_by_name(&self, name: &str) -> Option<&Package> {
        self.package_by_name.get(name).map(|id| self.package(*id))
    }

    pub fn stubs(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(|u| u.is_stub)
    }

    /// Units whose enclosing unit is `unit`.
    pub fn nested_units(&self, unit: UnitId) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.enclosing == Some(unit))
            .map(|u| u.id)
            .collect()
    }

    // ---- Ancestry ----

    /// Every transitive superclass and interface of `unit`, nearest first.
    pub fn supertypes(&self, unit: UnitId) -> Vec<UnitId> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([unit]);
        seen.insert(unit);
        while let Some(current) = queue.pop_front() {
            let u = self.unit(current);
            for next in u.superclass.iter().chain(u.interfaces.iter()) {
                if seen.insert(*next) {
                    order.push(*next);
                    queue.push_back(*next);
                }
            }
        }
        order
    }

    /// Whether `unit` is `target` or a subtype of it. Cycle-safe and
    /// short-circuiting.
    pub fn is_assignable_to(&self, unit: UnitId, target: UnitId) -> bool {
        if unit == target {
            return true;
        }
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([unit]);
        seen.insert(unit);
        while let Some(current) = queue.pop_front() {
            let u = self.unit(current);
            for next in u.superclass.iter().chain(u.interfaces.iter()) {
                if *next == target {
                    return true;
                }
                if seen.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
        false
    }

    /// Whether `other` is assignable to `unit`.
    pub fn is_assignable_from(&self, unit: UnitId, other: UnitId) -> bool {
        self.is_assignable_to(other, unit)
    }

    /// [`is_assignable_to`](Self::is_assignable_to) by target name; false
    /// when no unit has that name.
    pub fn is_assignable_to_name(&self, unit: UnitId, target: &str) -> bool {
        self.by_name
            .get(target)
            .is_some_and(|t| self.is_assignable_to(unit, *t))
    }

    // ---- Membership ----

    /// The member of `unit` with this name and descriptor. Stubs never
    /// report members.
    pub fn find_member(
        &self,
        unit: UnitId,
        name: &str,
        descriptor: &str,
    ) -> Result<&Member, QueryError> {
        self.members_of(unit)
            .find(|m| m.name() == name && m.descriptor() == descriptor)
            .ok_or_else(|| {
                let u = self.unit(unit);
                QueryError::MemberNotFound {
                    unit: u.name.clone(),
                    member: format!("{name}{descriptor}"),
                    unit_is_stub: u.is_stub,
                }
            })
    }

    /// Find a member on `unit` or the nearest supertype declaring it.
    pub fn find_member_in_hierarchy(
        &self,
        unit: UnitId,
        name: &str,
        descriptor: &str,
    ) -> Option<&Member> {
        std::iter::once(unit)
            .chain(self.supertypes(unit))
            .find_map(|u| self.find_member(u, name, descriptor).ok())
    }

    // ---- Annotations ----

    /// Whether any annotation in `annotations` has type `type_name`.
    pub fn is_annotated_with(annotations: &[Annotation], type_name: &str) -> bool {
        annotations.iter().any(|a| a.type_name == type_name)
    }

    /// Whether `type_name` annotates the element directly or through any
    /// chain of annotations on annotation types.
    pub fn is_meta_annotated_with(&self, annotations: &[Annotation], type_name: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut queue: VecDeque<&Annotation> = annotations.iter().collect();
        while let Some(annotation) = queue.pop_front() {
            if annotation.type_name == type_name {
                return true;
            }
            if seen.insert(annotation.unit) {
                queue.extend(self.unit(annotation.unit).annotations.iter());
            }
        }
        false
    }

    /// The value of `property`, falling back to the default declared on the
    /// annotation type.
    pub fn annotation_value<'a>(
        &'a self,
        annotation: &'a Annotation,
        property: &str,
    ) -> Option<&'a AnnotationValue> {
        annotation.explicit_value(property).or_else(|| {
            self.members_of(annotation.unit)
                .filter_map(Member::as_method)
                .find(|m| m.info.name == property)
                .and_then(|m| m.annotation_default.as_ref())
        })
    }

    // ---- Edges ----

    /// Dependencies of `unit` in `direction`.
    pub fn dependencies_of(
        &self,
        unit: UnitId,
        direction: Direction,
    ) -> impl Iterator<Item = &Dependency> + '_ {
        let ids = match direction {
            Direction::Outgoing => &self.unit(unit).outgoing,
            Direction::Incoming => &self.unit(unit).incoming,
        };
        ids.iter().map(move |id| self.dependency(*id))
    }

    /// Dependencies of `unit` in `direction` whose other end satisfies
    /// `predicate`.
    pub fn dependencies_where<'a, P>(
        &'a self,
        unit: UnitId,
        direction: Direction,
        predicate: P,
    ) -> impl Iterator<Item = &'a Dependency> + 'a
    where
        P: Fn(&Unit) -> bool + 'a,
    {
        self.dependencies_of(unit, direction).filter(move |d| {
            let other = match direction {
                Direction::Outgoing => d.target,
                Direction::Incoming => d.origin,
            };
            predicate(self.unit(other))
        })
    }

    /// Accesses of `unit` in `direction`.
    pub fn accesses_of(
        &self,
        unit: UnitId,
        direction: Direction,
    ) -> impl Iterator<Item = &Access> + '_ {
        let ids = match direction {
            Direction::Outgoing => &self.unit(unit).accesses_from,
            Direction::Incoming => &self.unit(unit).accesses_to,
        };
        ids.iter().map(move |id| self.access(*id))
    }

    /// Every unit reachable from `unit` over dependency edges, sorted by
    /// handle, excluding `unit` itself unless it lies on a cycle.
    pub fn transitive_dependencies(&self, unit: UnitId) -> Vec<UnitId> {
        let start = NodeIndex::new(unit.index());
        let mut reachable = FxHashSet::default();
        let mut bfs = Bfs::new(&self.dependency_graph, start);
        while let Some(node) = bfs.next(&self.dependency_graph) {
            if node != start {
                reachable.insert(self.dependency_graph[node]);
            }
        }
        let on_cycle = self
            .dependency_graph
            .neighbors_directed(start, petgraph::Direction::Incoming)
            .any(|n| reachable.contains(&self.dependency_graph[n]));
        if on_cycle {
            reachable.insert(unit);
        }
        let mut result: Vec<UnitId> = reachable.into_iter().collect();
        result.sort();
        result
    }

    // ---- Identity ----

    /// Structural hash: equal for graphs resolved from the same raw units.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    fn compute_fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        let name = |id: UnitId| self.units[id.index()].name.as_str();
        let mut units: Vec<&Unit> = self.units.iter().collect();
        units.sort_by(|a, b| a.name.cmp(&b.name));
        for unit in units {
            hasher.update(unit.name.as_bytes());
            hasher.update(unit.kind.name().as_bytes());
            hasher.update(&[unit.is_stub as u8]);
            hasher.update(&unit.modifiers.bits().to_le_bytes());
            if let Some(s) = unit.superclass {
                hasher.update(name(s).as_bytes());
            }
            for i in &unit.interfaces {
                hasher.update(name(*i).as_bytes());
            }
            if let Some(e) = unit.enclosing {
                hasher.update(name(e).as_bytes());
            }
            for member in self.members_of(unit.id) {
                hasher.update(member.name().as_bytes());
                hasher.update(member.descriptor().as_bytes());
            }
            hasher.update(&[0xff]);
        }
        let mut edges: Vec<(&str, &str, String, usize)> = self
            .dependencies
            .iter()
            .map(|d| (name(d.origin), name(d.target), format!("{:?}", d.kind), d.causes.len()))
            .collect();
        edges.sort();
        for (origin, target, kind, causes) in edges {
            hasher.update(origin.as_bytes());
            hasher.update(target.as_bytes());
            hasher.update(kind.as_bytes());
            hasher.update(&(causes as u64).to_le_bytes());
        }
        hasher.digest()
    }
}
