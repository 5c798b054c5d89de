//! Canonical text output of decay graphs (graphviz dot form).
//!
//! One line per vertex (`idx [label="..."]`), one per edge (`src->dst`),
//! styled through attribute lists. The label source is pluggable: raw lund
//! ids, or names resolved through a [`ParticleTable`]. When a matching
//! vector is supplied, matched vertices (and edges whose endpoints are both
//! matched) switch to the matched attribute set.

use std::io::Write;

use crate::error::Result;
use crate::graph::DecayGraph;
use crate::particles::ParticleTable;

/// Maps a lund id to a printable vertex label.
pub trait LabelSource {
    /// Label text for a vertex carrying this lund id.
    fn label(&self, lund_id: i32) -> String;
}

/// Labels vertices with the bare lund id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LundLabel;

impl LabelSource for LundLabel {
    fn label(&self, lund_id: i32) -> String {
        lund_id.to_string()
    }
}

/// Labels vertices with particle names, falling back to the id for species
/// the table does not know.
#[derive(Debug, Clone, Copy)]
pub struct NameLabel<'a>(pub &'a ParticleTable);

impl LabelSource for NameLabel<'_> {
    fn label(&self, lund_id: i32) -> String {
        match self.0.name(lund_id) {
            Some(name) => name.to_owned(),
            None => lund_id.to_string(),
        }
    }
}

/// Dot-format graph writer with per-state attribute sets.
#[derive(Debug, Clone, Default)]
pub struct GraphEmitter {
    vertex_attrs: Vec<(String, String)>,
    matched_vertex_attrs: Vec<(String, String)>,
    edge_attrs: Vec<(String, String)>,
    matched_edge_attrs: Vec<(String, String)>,
}

impl GraphEmitter {
    /// An emitter with no styling.
    pub fn new() -> Self {
        Self::default()
    }

    /// The styling used for truth-match overlays: matched vertices filled
    /// light blue with a heavy outline, matched edges heavy, unmatched
    /// edges grey.
    pub fn truth_match_defaults() -> Self {
        let mut emitter = Self::new();
        emitter.set_vertex_attr("color", "red");
        emitter.set_matched_vertex_attr("color", "red");
        emitter.set_matched_vertex_attr("style", "filled");
        emitter.set_matched_vertex_attr("fillcolor", "lightskyblue");
        emitter.set_matched_vertex_attr("penwidth", "3");
        emitter.set_edge_attr("color", "grey");
        emitter.set_matched_edge_attr("penwidth", "3");
        emitter
    }

    /// Attach an attribute to unmatched (or all, without a matching)
    /// vertices.
    pub fn set_vertex_attr(&mut self, name: &str, value: &str) -> &mut Self {
        set_attr(&mut self.vertex_attrs, name, value);
        self
    }

    /// Attach an attribute to matched vertices.
    pub fn set_matched_vertex_attr(&mut self, name: &str, value: &str) -> &mut Self {
        set_attr(&mut self.matched_vertex_attrs, name, value);
        self
    }

    /// Attach an attribute to unmatched (or all, without a matching) edges.
    pub fn set_edge_attr(&mut self, name: &str, value: &str) -> &mut Self {
        set_attr(&mut self.edge_attrs, name, value);
        self
    }

    /// Attach an attribute to edges with both endpoints matched.
    pub fn set_matched_edge_attr(&mut self, name: &str, value: &str) -> &mut Self {
        set_attr(&mut self.matched_edge_attrs, name, value);
        self
    }

    /// Write the graph as dot text.
    ///
    /// `matching` is indexed by event-local vertex index; entry `>= 0`
    /// marks a matched vertex. Pass `None` to style everything with the
    /// unmatched attribute sets.
    ///
    /// # Errors
    /// Propagates write failures and stale-vertex reads.
    pub fn emit<W: Write, L: LabelSource>(
        &self,
        out: &mut W,
        graph: &DecayGraph,
        labels: &L,
        matching: Option<&[i32]>,
    ) -> Result<()> {
        let is_matched = |idx: i32| {
            matching.is_some_and(|m| {
                usize::try_from(idx).is_ok_and(|i| m.get(i).is_some_and(|&v| v >= 0))
            })
        };

        writeln!(out, "digraph G {{")?;
        for v in graph.vertices() {
            let p = graph.particle(v)?;
            let attrs = if is_matched(p.idx) {
                &self.matched_vertex_attrs
            } else {
                &self.vertex_attrs
            };
            write!(out, "{}[label=\"{}\"", p.idx, labels.label(p.lund_id))?;
            for (name, value) in attrs {
                write!(out, ",{name}=\"{value}\"")?;
            }
            writeln!(out, "];")?;
        }
        for (u, v) in graph.edges() {
            let (pu, pv) = (graph.particle(u)?, graph.particle(v)?);
            let attrs = if matching.is_some() && is_matched(pu.idx) && is_matched(pv.idx) {
                &self.matched_edge_attrs
            } else {
                &self.edge_attrs
            };
            write!(out, "{}->{}", pu.idx, pv.idx)?;
            if !attrs.is_empty() {
                write!(out, "[")?;
                for (i, (name, value)) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(out, ",")?;
                    }
                    write!(out, "{name}=\"{value}\"")?;
                }
                write!(out, "]")?;
            }
            writeln!(out, ";")?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}

/// Insert or overwrite an attribute, keeping first-set order.
fn set_attr(attrs: &mut Vec<(String, String)>, name: &str, value: &str) {
    match attrs.iter_mut().find(|(n, _)| n == name) {
        Some((_, v)) => *v = value.to_owned(),
        None => attrs.push((name.to_owned(), value.to_owned())),
    }
}
