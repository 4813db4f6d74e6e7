//! GraphML serialization.
//!
//! Pure output: walks the graph in insertion order and renders an XML
//! document with a fixed, typed key vocabulary. Element ids are `n{id}` for
//! nodes and `e{id}` for edges; edge `source`/`target` reference node
//! element ids. The element/attribute naming here is an output-compatibility
//! contract and must not drift.

use std::fmt;

use crate::graph::PageGraph;

/// XML-schema type of a data attribute.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum AttrType {
    String,
    Long,
    Boolean,
}

impl AttrType {
    fn as_str(self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Long => "long",
            AttrType::Boolean => "boolean",
        }
    }
}

/// Which element family a key applies to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum AttrDomain {
    Node,
    Edge,
}

impl AttrDomain {
    fn as_str(self) -> &'static str {
        match self {
            AttrDomain::Node => "node",
            AttrDomain::Edge => "edge",
        }
    }
}

struct GraphMlKey {
    id: &'static str,
    domain: AttrDomain,
    name: &'static str,
    ty: AttrType,
}

/// The full key vocabulary. Order fixes the `d{n}` key ids; appending is
/// safe, reordering is not.
const KEYS: &[GraphMlKey] = &[
    key("d0", AttrDomain::Node, "node type", AttrType::String),
    key("d1", AttrDomain::Node, "id", AttrType::Long),
    key("d2", AttrDomain::Node, "timestamp", AttrType::Long),
    key("d3", AttrDomain::Node, "tag name", AttrType::String),
    key("d4", AttrDomain::Node, "is deleted", AttrType::Boolean),
    key("d5", AttrDomain::Node, "text", AttrType::String),
    key("d6", AttrDomain::Node, "script id", AttrType::Long),
    key("d7", AttrDomain::Node, "url", AttrType::String),
    key("d8", AttrDomain::Node, "binding", AttrType::String),
    key("d9", AttrDomain::Node, "binding event", AttrType::String),
    key("d10", AttrDomain::Node, "shield name", AttrType::String),
    key("d11", AttrDomain::Node, "rule", AttrType::String),
    key("d12", AttrDomain::Node, "host", AttrType::String),
    key("d13", AttrDomain::Node, "frame id", AttrType::String),
    key("d14", AttrDomain::Edge, "edge type", AttrType::String),
    key("d15", AttrDomain::Edge, "id", AttrType::Long),
    key("d16", AttrDomain::Edge, "timestamp", AttrType::Long),
    key("d17", AttrDomain::Edge, "parent", AttrType::Long),
    key("d18", AttrDomain::Edge, "prior sibling", AttrType::Long),
    key("d19", AttrDomain::Edge, "key", AttrType::String),
    key("d20", AttrDomain::Edge, "value", AttrType::String),
    key("d21", AttrDomain::Edge, "is style", AttrType::Boolean),
    key("d22", AttrDomain::Edge, "event type", AttrType::String),
    key("d23", AttrDomain::Edge, "event listener id", AttrType::Long),
    key("d24", AttrDomain::Edge, "script id", AttrType::Long),
    key("d25", AttrDomain::Edge, "attr name", AttrType::String),
    key("d26", AttrDomain::Edge, "script position", AttrType::Long),
    key("d27", AttrDomain::Edge, "request id", AttrType::Long),
    key("d28", AttrDomain::Edge, "resource type", AttrType::String),
    key("d29", AttrDomain::Edge, "status", AttrType::String),
    key("d30", AttrDomain::Edge, "size", AttrType::Long),
    key("d31", AttrDomain::Edge, "response hash", AttrType::String),
    key("d32", AttrDomain::Edge, "text", AttrType::String),
];

const fn key(
    id: &'static str,
    domain: AttrDomain,
    name: &'static str,
    ty: AttrType,
) -> GraphMlKey {
    GraphMlKey {
        id,
        domain,
        name,
        ty,
    }
}

/// Key id for an attribute name within a domain. Unknown names are a
/// programming error in a kind's `serialized_attributes`.
fn key_id(domain: AttrDomain, name: &str) -> &'static str {
    KEYS.iter()
        .find(|k| k.domain == domain && k.name == name)
        .unwrap_or_else(|| panic!("no GraphML key for {} attribute {name:?}", domain.as_str()))
        .id
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for ch in value.chars() {
        match ch {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' => f.write_str("&quot;")?,
            '\'' => f.write_str("&apos;")?,
            other => fmt::Write::write_char(f, other)?,
        }
    }
    Ok(())
}

fn write_data(
    f: &mut fmt::Formatter<'_>,
    domain: AttrDomain,
    name: &str,
    value: &str,
) -> fmt::Result {
    write!(f, "    <data key=\"{}\">", key_id(domain, name))?;
    write_escaped(f, value)?;
    f.write_str("</data>\n")
}

/// Displayable GraphML rendering of a graph.
pub struct GraphMlDocument<'a>(pub &'a PageGraph);

impl fmt::Display for GraphMlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        f.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
        f.write_str(concat!(
            "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\"\n",
            "         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n",
            "         xsi:schemaLocation=\"http://graphml.graphdrawing.org/xmlns",
            " http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd\">\n"
        ))?;
        for k in KEYS {
            writeln!(
                f,
                "  <key id=\"{}\" for=\"{}\" attr.name=\"{}\" attr.type=\"{}\"/>",
                k.id,
                k.domain.as_str(),
                k.name,
                k.ty.as_str()
            )?;
        }
        f.write_str("  <graph id=\"G\" edgedefault=\"directed\">\n")?;

        let mut attrs: Vec<(&'static str, String)> = Vec::new();
        for node in graph.nodes() {
            writeln!(f, "  <node id=\"{}\">", node.graphml_id())?;
            write_data(f, AttrDomain::Node, "node type", node.item_name())?;
            write_data(f, AttrDomain::Node, "id", &node.id().to_string())?;
            write_data(
                f,
                AttrDomain::Node,
                "timestamp",
                &node.time_since_page_start().as_millis().to_string(),
            )?;
            attrs.clear();
            node.serialized_attributes(&mut attrs);
            for (name, value) in &attrs {
                write_data(f, AttrDomain::Node, name, value)?;
            }
            f.write_str("  </node>\n")?;
        }

        for edge in graph.edges() {
            writeln!(
                f,
                "  <edge id=\"{}\" source=\"n{}\" target=\"n{}\">",
                edge.graphml_id(),
                edge.out_node(),
                edge.in_node()
            )?;
            write_data(f, AttrDomain::Edge, "edge type", edge.item_name())?;
            write_data(f, AttrDomain::Edge, "id", &edge.id().to_string())?;
            write_data(
                f,
                AttrDomain::Edge,
                "timestamp",
                &edge.time_since_page_start().as_millis().to_string(),
            )?;
            attrs.clear();
            edge.serialized_attributes(&mut attrs);
            for (name, value) in &attrs {
                write_data(f, AttrDomain::Edge, name, value)?;
            }
            f.write_str("  </edge>\n")?;
        }

        f.write_str("  </graph>\n</graphml>\n")
    }
}
