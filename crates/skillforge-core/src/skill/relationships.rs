//! `requires` / `conflicts-with` checks over a skill selection.
//!
//! Uses petgraph to order a selection dependencies-first and to detect
//! circular `requires` chains.

use std::collections::{BTreeSet, HashMap};

use anyhow::bail;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use skillforge_types::error::PipelineWarning;

use crate::matrix::SkillMatrix;

/// Order a selection plus everything it transitively requires, dependencies
/// first.
///
/// Required ids missing from the matrix still appear in the order; callers
/// report them through [`missing_requirements`]. Errors on cycles.
pub fn resolve_required_skills(
    selection: &[String],
    matrix: &SkillMatrix,
) -> anyhow::Result<Vec<String>> {
    let mut graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    let mut to_visit: Vec<String> = selection.iter().rev().cloned().collect();
    let mut visited = BTreeSet::new();

    while let Some(current) = to_visit.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }

        let idx = *node_indices
            .entry(current.clone())
            .or_insert_with(|| graph.add_node(current.clone()));

        let Some(skill) = matrix.get(&current) else {
            continue;
        };
        for dep in &skill.requires {
            let dep_idx = *node_indices
                .entry(dep.clone())
                .or_insert_with(|| graph.add_node(dep.clone()));
            // skill -> dependency
            graph.add_edge(idx, dep_idx, ());
            to_visit.push(dep.clone());
        }
    }

    match toposort(&graph, None) {
        Ok(sorted) => Ok(sorted
            .into_iter()
            .rev()
            .map(|idx| graph[idx].clone())
            .collect()),
        Err(cycle) => {
            bail!(
                "Circular requires chain detected involving skill: {}",
                graph[cycle.node_id()]
            );
        }
    }
}

/// Reject selections holding a skill together with one it conflicts with.
///
/// Checked in both directions: either side may declare the conflict.
pub fn check_conflicts(selection: &[String], matrix: &SkillMatrix) -> anyhow::Result<()> {
    let selected: BTreeSet<&str> = selection.iter().map(String::as_str).collect();

    for id in &selected {
        let Some(skill) = matrix.get(id) else {
            continue;
        };
        if let Some(other) = skill
            .conflicts
            .iter()
            .find(|c| selected.contains(c.as_str()))
        {
            bail!("Skill '{id}' conflicts with '{other}'. Cannot select both.");
        }
    }

    Ok(())
}

/// Direct `requires` entries of selected skills that are not themselves
/// selected.
pub fn missing_requirements(selection: &[String], matrix: &SkillMatrix) -> Vec<PipelineWarning> {
    let selected: BTreeSet<&str> = selection.iter().map(String::as_str).collect();
    let mut warnings = Vec::new();

    for id in selection {
        let Some(skill) = matrix.get(id) else {
            continue;
        };
        for required in &skill.requires {
            if !selected.contains(required.as_str()) {
                warnings.push(PipelineWarning::MissingRequirement {
                    skill: id.clone(),
                    requires: required.clone(),
                });
            }
        }
    }

    warnings
}
