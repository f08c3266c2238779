//! A graph view over a single-inheritance type hierarchy.

use petgraph::{
    algo::is_cyclic_directed,
    graph::{DiGraph, NodeIndex},
    Direction,
};

use crate::{InterpreterError, InterpreterResult, MapT, TypeId};

/// Types as nodes, `base -> subtype` edges.
#[derive(Debug, Default)]
pub struct TypeTree {
    graph: DiGraph<(TypeId, String), ()>,
    nodes: MapT<TypeId, NodeIndex>,
}

impl TypeTree {
    /// Build from `(id, name, base)` triples. Bases may be listed after their subtypes.
    pub fn from_types<'a, I>(types: I) -> InterpreterResult<Self>
    where
        I: IntoIterator<Item = (TypeId, &'a str, Option<TypeId>)>,
    {
        let mut tree = Self::default();
        let mut edges = vec![];

        for (id, name, base) in types {
            let node = tree.graph.add_node((id, name.to_owned()));

            if tree.nodes.insert(id, node).is_some() {
                return Err(InterpreterError::MalformedHierarchy(format!(
                    "{} appears twice",
                    id
                )));
            }

            if let Some(base) = base {
                edges.push((base, id));
            }
        }

        for (base, sub) in edges {
            let from = tree.node(base)?;
            let to = tree.node(sub)?;
            tree.graph.add_edge(from, to, ());
        }

        Ok(tree)
    }

    fn node(&self, id: TypeId) -> InterpreterResult<NodeIndex> {
        self.nodes
            .get(&id)
            .copied()
            .ok_or(InterpreterError::UnknownType(id))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check that every node has at most one base and that no chain loops.
    pub fn verify(&self) -> InterpreterResult<()> {
        for node in self.graph.node_indices() {
            let bases = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .count();

            if bases > 1 {
                let (id, name) = &self.graph[node];
                return Err(InterpreterError::MalformedHierarchy(format!(
                    "{} ({}) has {} bases",
                    name, id, bases
                )));
            }
        }

        if is_cyclic_directed(&self.graph) {
            return Err(InterpreterError::MalformedHierarchy(
                "base chains form a cycle".to_owned(),
            ));
        }

        Ok(())
    }

    /// The ancestors of `id`, nearest first, not including `id` itself.
    pub fn ancestors(&self, id: TypeId) -> InterpreterResult<Vec<TypeId>> {
        let mut out = vec![];
        let mut cursor = self.node(id)?;

        while let Some(base) = self
            .graph
            .neighbors_directed(cursor, Direction::Incoming)
            .next()
        {
            let (base_id, _) = self.graph[base];

            if base_id == id || out.contains(&base_id) {
                return Err(InterpreterError::CyclicBase {
                    name: self.graph[cursor].1.clone(),
                    at: base_id,
                });
            }

            out.push(base_id);
            cursor = base;
        }

        Ok(out)
    }

    /// Render the subtree rooted at `root`, one type per line, indented by depth.
    pub fn render(&self, root: TypeId) -> InterpreterResult<String> {
        let mut out = String::new();
        self.render_into(self.node(root)?, 0, &mut out);
        Ok(out)
    }

    fn render_into(&self, node: NodeIndex, depth: usize, out: &mut String) {
        let (_, name) = &self.graph[node];

        for _ in 0..depth {
            out.push_str("  ");
        }

        out.push_str(name);
        out.push('\n');

        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();

        children.sort_by_key(|n| self.graph[*n].0);

        for child in children {
            self.render_into(child, depth + 1, out);
        }
    }
}
