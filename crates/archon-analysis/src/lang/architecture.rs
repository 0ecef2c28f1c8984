//! Architecture-level rules: layers and slices over package identifiers.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Write;

use archon_core::errors::{BoxError, RuleEvaluationError};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::condition::{ConditionEvent, ConditionEvents};
use super::element::Selectable;
use super::package_matcher::PackageMatcher;
use super::rule::{Priority, Rule, RuleCheck};
use crate::domain::{Dependency, Direction, Unit, UnitGraph};

struct Layer {
    name: String,
    packages: Vec<PackageMatcher>,
    optional: bool,
}

impl Layer {
    fn contains(&self, unit: &Unit) -> bool {
        self.packages.iter().any(|p| p.matches(&unit.package_name))
    }
}

#[derive(Debug, Clone)]
enum Access {
    Only(Vec<String>),
    Nobody,
}

struct Constraint {
    layer: String,
    access: Access,
}

/// Layers defined by package identifiers plus who may depend on them.
///
/// ```ignore
/// LayeredArchitecture::new()
///     .layer("Web", &["..web.."])
///     .layer("Service", &["..service.."])
///     .where_layer("Service").may_only_be_accessed_by_layers(&["Web"])
/// ```
#[derive(Default)]
pub struct LayeredArchitecture {
    layers: Vec<Layer>,
    constraints: Vec<Constraint>,
    only_layer_dependencies: bool,
    because: Option<String>,
    priority: Priority,
}

/// Pending constraint on one layer.
pub struct LayerConstraint {
    architecture: LayeredArchitecture,
    layer: String,
}

impl LayerConstraint {
    pub fn may_only_be_accessed_by_layers(mut self, layers: &[&str]) -> LayeredArchitecture {
        self.architecture.constraints.push(Constraint {
            layer: self.layer,
            access: Access::Only(layers.iter().map(|l| l.to_string()).collect()),
        });
        self.architecture
    }

    pub fn may_not_be_accessed_by_any_layer(mut self) -> LayeredArchitecture {
        self.architecture.constraints.push(Constraint {
            layer: self.layer,
            access: Access::Nobody,
        });
        self.architecture
    }
}

impl LayeredArchitecture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, name: &str, packages: &[&str]) -> Self {
        self.layers.push(Layer {
            name: name.to_string(),
            packages: packages.iter().map(|p| PackageMatcher::new(*p)).collect(),
            optional: false,
        });
        self
    }

    /// A layer that may legitimately contain no units.
    pub fn optional_layer(mut self, name: &str, packages: &[&str]) -> Self {
        self = self.layer(name, packages);
        if let Some(layer) = self.layers.last_mut() {
            layer.optional = true;
        }
        self
    }

    pub fn where_layer(self, name: &str) -> LayerConstraint {
        LayerConstraint {
            architecture: self,
            layer: name.to_string(),
        }
    }

    /// Ignore dependencies from units outside every layer.
    pub fn consider_only_dependencies_in_layers(mut self) -> Self {
        self.only_layer_dependencies = true;
        self
    }

    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = Some(reason.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn find_layer(&self, name: &str) -> Result<&Layer, BoxError> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| format!("no layer named '{name}' is defined").into())
    }

    fn check_constraint(
        &self,
        graph: &UnitGraph,
        constraint: &Constraint,
        events: &mut ConditionEvents,
    ) -> Result<usize, BoxError> {
        let target = self.find_layer(&constraint.layer)?;
        let allowed: Vec<&Layer> = match constraint.access {
            Access::Only(ref names) => names
                .iter()
                .map(|n| self.find_layer(n))
                .collect::<Result<_, _>>()?,
            Access::Nobody => Vec::new(),
        };

        let members: Vec<&Unit> = Unit::select(graph).into_iter().filter(|u| target.contains(u)).collect();
        if members.is_empty() && !target.optional {
            events.add(ConditionEvent::violated(
                format!("Layer '{}'", target.name),
                format!("Layer '{}' is empty", target.name),
            ));
        }
        for unit in &members {
            for dependency in graph.dependencies_of(unit.id, Direction::Incoming) {
                let origin = graph.unit(dependency.origin);
                if target.contains(origin) {
                    continue;
                }
                let in_any_layer = self.layers.iter().any(|l| l.contains(origin));
                if self.only_layer_dependencies && !in_any_layer {
                    continue;
                }
                let permitted = allowed.iter().any(|l| l.contains(origin));
                for cause in &dependency.causes {
                    events.add(ConditionEvent::simple(&origin.name, !permitted, cause.message()));
                }
            }
        }
        Ok(members.len())
    }
}

impl Rule for LayeredArchitecture {
    fn description(&self) -> String {
        let mut description = String::from("Layered architecture consisting of");
        for layer in &self.layers {
            let packages: Vec<String> = layer.packages.iter().map(|p| format!("'{}'", p.identifier())).collect();
            let kind = if layer.optional { "optional layer" } else { "layer" };
            let _ = write!(description, "\n{kind} '{}' ({})", layer.name, packages.join(", "));
        }
        for constraint in &self.constraints {
            let _ = match constraint.access {
                Access::Only(ref layers) => {
                    let quoted: Vec<String> = layers.iter().map(|l| format!("'{l}'")).collect();
                    write!(
                        description,
                        "\nwhere layer '{}' may only be accessed by layers [{}]",
                        constraint.layer,
                        quoted.join(", ")
                    )
                }
                Access::Nobody => write!(
                    description,
                    "\nwhere layer '{}' may not be accessed by any layer",
                    constraint.layer
                ),
            };
        }
        match self.because {
            Some(ref reason) => format!("{description}, because {reason}"),
            None => description,
        }
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn check(&self, graph: &UnitGraph, _parallel: bool) -> Result<RuleCheck, RuleEvaluationError> {
        let mut check = RuleCheck::default();
        for constraint in &self.constraints {
            check.checked += self
                .check_constraint(graph, constraint, &mut check.events)
                .map_err(|source| RuleEvaluationError::ConditionFailed {
                    rule: self.description(),
                    element: format!("Layer '{}'", constraint.layer),
                    source,
                })?;
        }
        Ok(check)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceAssertion {
    FreeOfCycles,
    Independent,
}

/// Units grouped into slices by the captures of a package identifier.
///
/// `SlicesRule::matching("com.acme.(*)..")` puts `com.acme.billing.x.A`
/// into slice `billing`.
pub struct SlicesRule {
    matcher: PackageMatcher,
    assertion: SliceAssertion,
    because: Option<String>,
    priority: Priority,
}

impl SlicesRule {
    pub fn matching(identifier: &str) -> Self {
        Self {
            matcher: PackageMatcher::new(identifier),
            assertion: SliceAssertion::FreeOfCycles,
            because: None,
            priority: Priority::default(),
        }
    }

    pub fn should_be_free_of_cycles(mut self) -> Self {
        self.assertion = SliceAssertion::FreeOfCycles;
        self
    }

    /// No dependency may cross slice boundaries at all.
    pub fn should_not_depend_on_each_other(mut self) -> Self {
        self.assertion = SliceAssertion::Independent;
        self
    }

    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = Some(reason.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn slice_of(&self, unit: &Unit) -> Option<String> {
        self.matcher
            .capture(&unit.package_name)
            .filter(|groups| !groups.is_empty())
            .map(|groups| groups.join("."))
    }

    /// Slice name → member units, plus every dependency crossing slices
    /// keyed by (origin slice, target slice).
    fn slices<'g>(
        &self,
        graph: &'g UnitGraph,
    ) -> (BTreeMap<String, Vec<&'g Unit>>, BTreeMap<(String, String), Vec<&'g Dependency>>) {
        let mut slices: BTreeMap<String, Vec<&Unit>> = BTreeMap::new();
        for unit in Unit::select(graph) {
            if let Some(slice) = self.slice_of(unit) {
                slices.entry(slice).or_default().push(unit);
            }
        }
        let mut crossings: BTreeMap<(String, String), Vec<&Dependency>> = BTreeMap::new();
        for (slice, units) in &slices {
            for unit in units {
                for dependency in graph.dependencies_of(unit.id, Direction::Outgoing) {
                    let target = graph.unit(dependency.target);
                    match self.slice_of(target) {
                        Some(other) if other != *slice && slices.contains_key(&other) => {
                            crossings.entry((slice.clone(), other)).or_default().push(dependency);
                        }
                        _ => {}
                    }
                }
            }
        }
        (slices, crossings)
    }
}

fn dependency_lines(dependencies: &[&Dependency]) -> Vec<String> {
    let lines: BTreeSet<String> = dependencies
        .iter()
        .flat_map(|d| d.causes.iter().map(|c| c.message()))
        .collect();
    lines.into_iter().collect()
}

/// A cycle through `start` within one strongly connected component,
/// following neighbors in name order.
fn cycle_through(
    graph: &DiGraph<String, ()>,
    component: &BTreeSet<NodeIndex>,
    start: NodeIndex,
) -> Vec<NodeIndex> {
    let sorted_neighbors = |n: NodeIndex| {
        let mut next: Vec<NodeIndex> = graph.neighbors(n).filter(|m| component.contains(m)).collect();
        next.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
        next
    };
    let mut parent: BTreeMap<NodeIndex, NodeIndex> = BTreeMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in sorted_neighbors(current) {
            if next == start {
                let mut path = vec![current];
                let mut at = current;
                while let Some(&p) = parent.get(&at) {
                    path.push(p);
                    at = p;
                }
                path.reverse();
                return path;
            }
            if next != start && !parent.contains_key(&next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    vec![start]
}

impl Rule for SlicesRule {
    fn description(&self) -> String {
        let assertion = match self.assertion {
            SliceAssertion::FreeOfCycles => "be free of cycles",
            SliceAssertion::Independent => "not depend on each other",
        };
        let description = format!(
            "slices matching '{}' should {assertion}",
            self.matcher.identifier()
        );
        match self.because {
            Some(ref reason) => format!("{description}, because {reason}"),
            None => description,
        }
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn noun(&self) -> &'static str {
        "slices"
    }

    fn check(&self, graph: &UnitGraph, _parallel: bool) -> Result<RuleCheck, RuleEvaluationError> {
        let (slices, crossings) = self.slices(graph);
        let mut events = ConditionEvents::new();

        match self.assertion {
            SliceAssertion::Independent => {
                for ((from, _), dependencies) in &crossings {
                    for line in dependency_lines(dependencies) {
                        events.add(ConditionEvent::violated(format!("Slice {from}"), line));
                    }
                }
            }
            SliceAssertion::FreeOfCycles => {
                let mut slice_graph: DiGraph<String, ()> = DiGraph::new();
                let nodes: BTreeMap<&String, NodeIndex> = slices
                    .keys()
                    .map(|name| (name, slice_graph.add_node(name.clone())))
                    .collect();
                for (from, to) in crossings.keys() {
                    slice_graph.add_edge(nodes[from], nodes[to], ());
                }
                for component in tarjan_scc(&slice_graph) {
                    if component.len() < 2 {
                        continue;
                    }
                    let component: BTreeSet<NodeIndex> = component.into_iter().collect();
                    let start = component
                        .iter()
                        .copied()
                        .min_by(|a, b| slice_graph[*a].cmp(&slice_graph[*b]))
                        .unwrap_or_else(|| NodeIndex::new(0));
                    let cycle = cycle_through(&slice_graph, &component, start);
                    let names: Vec<&str> = cycle.iter().map(|n| slice_graph[*n].as_str()).collect();

                    let mut message = String::from("Cycle detected: ");
                    for name in &names {
                        let _ = write!(message, "Slice {name} -> ");
                    }
                    let _ = write!(message, "Slice {}", names[0]);
                    for (step, window) in names.iter().zip(names.iter().cycle().skip(1)).enumerate() {
                        let key = (window.0.to_string(), window.1.to_string());
                        let _ = write!(message, "\n  {}. Dependencies of Slice {}", step + 1, window.0);
                        if let Some(dependencies) = crossings.get(&key) {
                            for line in dependency_lines(dependencies) {
                                let _ = write!(message, "\n    - {line}");
                            }
                        }
                    }
                    events.add(ConditionEvent::violated(format!("Slice {}", names[0]), message));
                }
            }
        }

        Ok(RuleCheck {
            checked: slices.len(),
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layered_description_lists_layers_and_constraints() {
        let architecture = LayeredArchitecture::new()
            .layer("Web", &["..web.."])
            .optional_layer("Service", &["..service..", "..domain.."])
            .where_layer("Service")
            .may_only_be_accessed_by_layers(&["Web"])
            .where_layer("Web")
            .may_not_be_accessed_by_any_layer();
        assert_eq!(
            architecture.description(),
            "Layered architecture consisting of\n\
             layer 'Web' ('..web..')\n\
             optional layer 'Service' ('..service..', '..domain..')\n\
             where layer 'Service' may only be accessed by layers ['Web']\n\
             where layer 'Web' may not be accessed by any layer"
        );
    }

    #[test]
    fn slices_description() {
        let rule = SlicesRule::matching("com.acme.(*)..").should_be_free_of_cycles();
        assert_eq!(rule.description(), "slices matching 'com.acme.(*)..' should be free of cycles");
    }

    #[test]
    fn cycle_path_follows_name_order() {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let a = graph.add_node("a".into());
        let b = graph.add_node("b".into());
        let c = graph.add_node("c".into());
        graph.add_edge(a, c, ());
        graph.add_edge(a, b, ());
        graph.add_edge(b, a, ());
        graph.add_edge(c, b, ());
        let component: BTreeSet<NodeIndex> = [a, b, c].into_iter().collect();
        let cycle = cycle_through(&graph, &component, a);
        let names: Vec<&str> = cycle.iter().map(|n| graph[*n].as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
