//! C3 linearization of composed components.
//!
//! A composed component's direct bases are declarations and other composed
//! components (referenced by name). The member resolution order is the C3
//! merge of the bases' own linearizations, so a declaration always precedes
//! its parents and the local precedence order of every base list is kept.

use std::sync::Arc;

use componentry_common::error::{ComponentError, Result};

use crate::component_type::Base;
use crate::declaration::Declaration;

/// Read access to the direct bases of composed components.
pub(crate) trait BaseGraph {
    /// Returns the direct bases of `name`, or `None` if it is not composed.
    fn bases_of(&self, name: &str) -> Option<&[Base]>;
}

/// Resolution order of one composed component.
#[derive(Debug, Clone, Default)]
pub(crate) struct Linearization {
    /// Declarations, highest priority first.
    pub declarations: Vec<Arc<Declaration>>,
    /// Composed components, starting with the linearized one itself.
    pub components: Vec<String>,
}

#[derive(Clone)]
enum Entry {
    Component(String),
    Declaration(Arc<Declaration>),
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Component(a), Self::Component(b)) => a == b,
            (Self::Declaration(a), Self::Declaration(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Entry {
    fn describe(&self) -> String {
        match self {
            Self::Component(name) => format!("component '{name}'"),
            Self::Declaration(decl) => match decl.declared_name() {
                Some(name) => format!("declaration of '{name}'"),
                None => format!("extension of {:?}", decl.parents()),
            },
        }
    }
}

/// Computes the linearization of `name` against `graph`.
pub(crate) fn linearize(graph: &impl BaseGraph, name: &str) -> Result<Linearization> {
    let mut visiting = Vec::new();
    let entries = component_order(graph, name, &mut visiting)?;

    let mut out = Linearization::default();
    for entry in entries {
        match entry {
            Entry::Component(component) => out.components.push(component),
            Entry::Declaration(decl) => out.declarations.push(decl),
        }
    }
    Ok(out)
}

fn component_order(
    graph: &impl BaseGraph,
    name: &str,
    visiting: &mut Vec<String>,
) -> Result<Vec<Entry>> {
    if visiting.iter().any(|v| v == name) {
        return Err(ComponentError::InconsistentHierarchy {
            name: visiting.first().cloned().unwrap_or_else(|| name.to_string()),
            reason: format!("inheritance cycle through '{name}'"),
        });
    }
    let bases = graph
        .bases_of(name)
        .ok_or_else(|| ComponentError::UnknownParent {
            name: visiting.last().cloned().unwrap_or_else(|| name.to_string()),
            parent: name.to_string(),
        })?;

    visiting.push(name.to_string());
    let mut sequences = Vec::with_capacity(bases.len() + 1);
    let mut direct = Vec::with_capacity(bases.len());
    for base in bases {
        match base {
            Base::Declaration(decl) => {
                sequences.push(vec![Entry::Declaration(Arc::clone(decl))]);
                direct.push(Entry::Declaration(Arc::clone(decl)));
            }
            Base::Component(parent) => {
                sequences.push(component_order(graph, parent, visiting)?);
                direct.push(Entry::Component(parent.clone()));
            }
        }
    }
    let _ = visiting.pop();
    sequences.push(direct);

    let mut order = vec![Entry::Component(name.to_string())];
    merge(name, sequences, &mut order)?;
    Ok(order)
}

fn merge(name: &str, mut sequences: Vec<Vec<Entry>>, out: &mut Vec<Entry>) -> Result<()> {
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(());
        }

        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| !sequences.iter().any(|seq| seq[1..].contains(head)))
            .cloned();

        let Some(next) = candidate else {
            let heads: Vec<_> = sequences.iter().map(|seq| seq[0].describe()).collect();
            return Err(ComponentError::InconsistentHierarchy {
                name: name.to_string(),
                reason: format!("no consistent order for {}", heads.join(", ")),
            });
        };

        for seq in &mut sequences {
            if seq[0] == next {
                let _ = seq.remove(0);
            }
        }
        out.push(next);
    }
}
