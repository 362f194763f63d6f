//! XML data source: elements with children become nodes, leaf elements become attributes

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use graphlens_core::{AttrValue, DataSource, Edge, Graph, Node};
use roxmltree::NodeId;

pub const XML_LOADER_ID: &str = "xml-loader";

/// Edge type linking an element node to a nested element node.
pub const CHILD_EDGE: &str = "child";
/// Edge type created from `<reference>` / `<ref>` elements.
pub const REFERENCE_EDGE: &str = "reference";

type XmlNode<'a, 'i> = roxmltree::Node<'a, 'i>;

/// Loads graphs from XML documents.
///
/// Every element that has child elements becomes a node whose id is its
/// XPath (`/city/intersection[2]`). Leaf elements become attributes of
/// their parent, except `<reference>` and `<ref>`, whose text is an XPath
/// to another element node and yields a `reference` edge. The graph is
/// directed when the root element carries `type="directed"`.
#[derive(Debug, Clone, Default)]
pub struct XmlDataSource;

impl XmlDataSource {
    pub fn new() -> Self {
        XmlDataSource
    }

    /// Build a graph from XML text.
    pub fn parse(&self, text: &str) -> Result<Graph> {
        let document = roxmltree::Document::parse(text).context("malformed XML")?;
        build(document.root_element())
    }
}

/// Collected before the graph is built, so references can point anywhere.
#[derive(Default)]
struct Collected {
    ids: HashMap<NodeId, String>,
    nodes: Vec<Node>,
    edges: Vec<(String, String, &'static str)>,
}

fn build(root: XmlNode) -> Result<Graph> {
    let directed = root.attribute("type") == Some("directed");
    let mut collected = Collected::default();
    collect(root, &mut collected);

    for element in root.descendants() {
        let Some(source) = collected.ids.get(&element.id()).cloned() else {
            continue;
        };
        for reference in element.children().filter(|c| is_reference(*c)) {
            let Some(path) = reference.text().map(str::trim).filter(|p| !p.is_empty()) else {
                continue;
            };
            let target = resolve(element, path)
                .with_context(|| format!("element {source}: bad reference '{path}'"))?
                .and_then(|t| collected.ids.get(&t.id()));
            match target {
                Some(target) => collected.edges.push((source.clone(), target.clone(), REFERENCE_EDGE)),
                None => tracing::debug!("Skipping reference {} -> {}: no element node there", source, path),
            }
        }
    }

    let mut graph = Graph::new(directed);
    for node in collected.nodes {
        graph.add_node(node)?;
    }
    let mut seen: HashSet<(String, String, &str)> = HashSet::new();
    for (source, target, kind) in collected.edges {
        let key = if directed || source <= target {
            (source.clone(), target.clone(), kind)
        } else {
            (target.clone(), source.clone(), kind)
        };
        if !seen.insert(key) {
            continue;
        }
        let id = format!("{source}:{kind}:{target}");
        graph.add_edge(Edge::with_id(id, source, target, kind, directed))?;
    }
    Ok(graph)
}

/// Pre-order walk creating one node per element that has child elements.
fn collect(element: XmlNode, out: &mut Collected) -> String {
    let id = element_path(element);
    let tag = element.tag_name().name();
    let mut node = Node::new(id.as_str(), format!("{tag} {}", out.nodes.len() + 1));
    for child in element.children().filter(|c| c.is_element()) {
        if !has_child_elements(child) && !is_reference(child) {
            node.set_attr(child.tag_name().name(), leaf_value(child.text().unwrap_or_default()));
        }
    }
    out.ids.insert(element.id(), id.clone());
    out.nodes.push(node);

    for child in element.children().filter(|c| has_child_elements(*c)) {
        let child_id = collect(child, out);
        out.edges.push((id.clone(), child_id, CHILD_EDGE));
    }
    id
}

fn has_child_elements(element: XmlNode) -> bool {
    element.is_element() && element.children().any(|c| c.is_element())
}

fn is_reference(element: XmlNode) -> bool {
    element.is_element() && matches!(element.tag_name().name(), "reference" | "ref")
}

/// Leaf text typed like a JSON scalar: integer, float, boolean, ISO date, else string.
fn leaf_value(text: &str) -> AttrValue {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return AttrValue::Int(v);
    }
    if let Ok(v) = text.parse::<f64>() {
        if v.is_finite() {
            return AttrValue::Float(v);
        }
    }
    match text {
        "true" => AttrValue::Bool(true),
        "false" => AttrValue::Bool(false),
        _ => serde_json::from_value(serde_json::Value::String(text.to_string()))
            .unwrap_or_else(|_| AttrValue::Str(text.to_string())),
    }
}

/// Absolute XPath of an element; `[n]` only when same-tag siblings exist.
fn element_path(element: XmlNode) -> String {
    let mut steps: Vec<String> = element
        .ancestors()
        .filter(|e| e.is_element())
        .map(|e| {
            let tag = e.tag_name().name();
            let siblings: Vec<NodeId> = e
                .parent()
                .map(|p| {
                    p.children()
                        .filter(|c| c.is_element() && c.tag_name().name() == tag)
                        .map(|c| c.id())
                        .collect()
                })
                .unwrap_or_default();
            match siblings.iter().position(|id| *id == e.id()) {
                Some(pos) if siblings.len() > 1 => format!("{tag}[{}]", pos + 1),
                _ => tag.to_string(),
            }
        })
        .collect();
    steps.reverse();
    format!("/{}", steps.join("/"))
}

/// First element matched by `path`, evaluated from `context`.
///
/// Supports absolute and relative location paths, `//` descendant steps,
/// `.`, `..`, `*`, and the predicates `[n]`, `[@attr]` and `[@attr='value']`.
fn resolve<'a, 'i>(context: XmlNode<'a, 'i>, path: &str) -> Result<Option<XmlNode<'a, 'i>>> {
    let (mut current, rest) = match path.strip_prefix('/') {
        Some(rest) => (vec![context.document().root()], rest),
        None => (vec![context], path),
    };

    let mut descendant = false;
    for step in rest.split('/') {
        if step.is_empty() {
            if descendant {
                bail!("empty step");
            }
            descendant = true;
            continue;
        }
        current = match step {
            "." => current,
            ".." => current.iter().filter_map(|n| n.parent_element()).collect(),
            _ => select(&current, step, descendant)?,
        };
        descendant = false;
        if current.is_empty() {
            return Ok(None);
        }
    }
    if descendant {
        bail!("path ends with '/'");
    }
    Ok(current.into_iter().find(|n| n.is_element()))
}

/// Apply one `name[predicate]` step to every node in `from`.
fn select<'a, 'i>(from: &[XmlNode<'a, 'i>], step: &str, descendant: bool) -> Result<Vec<XmlNode<'a, 'i>>> {
    let (name, predicate) = match step.split_once('[') {
        Some((name, rest)) => {
            let Some(predicate) = rest.strip_suffix(']') else {
                bail!("unterminated predicate in '{step}'");
            };
            (name, Some(predicate))
        }
        None => (step, None),
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for node in from {
        let candidates: Vec<XmlNode> = if descendant {
            node.descendants().skip(1).filter(|c| c.is_element()).collect()
        } else {
            node.children().filter(|c| c.is_element()).collect()
        };
        let matching: Vec<XmlNode> = candidates
            .into_iter()
            .filter(|c| name == "*" || c.tag_name().name() == name)
            .collect();
        let kept = match predicate {
            None => matching,
            Some(p) => apply_predicate(matching, p)?,
        };
        out.extend(kept.into_iter().filter(|n| seen.insert(n.id())));
    }
    Ok(out)
}

fn apply_predicate<'a, 'i>(nodes: Vec<XmlNode<'a, 'i>>, predicate: &str) -> Result<Vec<XmlNode<'a, 'i>>> {
    let predicate = predicate.trim();
    if let Ok(position) = predicate.parse::<usize>() {
        return Ok(position
            .checked_sub(1)
            .and_then(|i| nodes.get(i).copied())
            .into_iter()
            .collect());
    }
    let Some(attribute) = predicate.strip_prefix('@') else {
        bail!("unsupported XPath predicate '[{predicate}]'");
    };
    let Some((key, value)) = attribute.split_once('=') else {
        return Ok(nodes.into_iter().filter(|n| n.has_attribute(attribute.trim())).collect());
    };
    let value = value.trim();
    let unquoted = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')));
    let Some(value) = unquoted else {
        bail!("unsupported XPath predicate '[{predicate}]'");
    };
    let key = key.trim();
    Ok(nodes.into_iter().filter(|n| n.attribute(key) == Some(value)).collect())
}

impl DataSource for XmlDataSource {
    fn id(&self) -> &str {
        XML_LOADER_ID
    }

    fn name(&self) -> &str {
        "XML Loader"
    }

    fn load(&self, path: &Path) -> Result<Graph> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let graph = self
            .parse(&text)
            .with_context(|| format!("Failed to load {} with '{}'", path.display(), XML_LOADER_ID))?;
        tracing::info!(
            "Loaded {} ({} nodes, {} edges) with {}",
            path.display(),
            graph.node_count(),
            graph.edge_count(),
            XML_LOADER_ID
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY: &str = r#"<?xml version="1.0"?>
<city type="directed">
  <name>Novi Sad</name>
  <intersection>
    <label>A</label>
    <lanes>4</lanes>
    <reference>/city/intersection[2]</reference>
  </intersection>
  <intersection>
    <label>B</label>
    <opened>2020-05-01</opened>
    <ref>../intersection[1]</ref>
  </intersection>
</city>"#;

    fn edge_list(graph: &Graph) -> Vec<(&str, &str, &str)> {
        graph
            .edges()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.kind.as_str()))
            .collect()
    }

    #[test]
    fn test_elements_become_nodes_and_leaves_attributes() {
        let graph = XmlDataSource::new().parse(CITY).unwrap();
        assert!(graph.directed());

        let ids: Vec<_> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["/city", "/city/intersection[1]", "/city/intersection[2]"]);

        let city = graph.node("/city").unwrap();
        assert_eq!(city.name, "city 1");
        assert_eq!(city.attr("name"), Some(&AttrValue::Str("Novi Sad".to_string())));

        let first = graph.node("/city/intersection[1]").unwrap();
        assert_eq!(first.attr("lanes"), Some(&AttrValue::Int(4)));
        assert!(first.attr("reference").is_none());
        let second = graph.node("/city/intersection[2]").unwrap();
        assert!(matches!(second.attr("opened"), Some(AttrValue::Date(_))));
        assert!(second.attr("ref").is_none());
    }

    #[test]
    fn test_child_and_reference_edges() {
        let graph = XmlDataSource::new().parse(CITY).unwrap();
        assert_eq!(
            edge_list(&graph),
            [
                ("/city", "/city/intersection[1]", CHILD_EDGE),
                ("/city", "/city/intersection[2]", CHILD_EDGE),
                ("/city/intersection[1]", "/city/intersection[2]", REFERENCE_EDGE),
                ("/city/intersection[2]", "/city/intersection[1]", REFERENCE_EDGE),
            ]
        );
        assert!(graph
            .edge("/city/intersection[1]:reference:/city/intersection[2]")
            .is_some());
    }

    #[test]
    fn test_undirected_references_are_deduplicated() {
        let xml = r#"<net>
          <a id="k"><x>1.5</x><reference>//b</reference></a>
          <b><y>true</y><reference>/net/a[@id='k']</reference><ref>/net/a/x</ref><ref>/net/gone</ref></b>
        </net>"#;
        let graph = XmlDataSource::new().parse(xml).unwrap();
        assert!(!graph.directed());
        assert_eq!(graph.node("/net/a").unwrap().attr("x"), Some(&AttrValue::Float(1.5)));
        assert_eq!(graph.node("/net/b").unwrap().attr("y"), Some(&AttrValue::Bool(true)));
        // a->b and b->a collapse; references to leaves or missing elements are skipped
        assert_eq!(
            edge_list(&graph),
            [
                ("/net", "/net/a", CHILD_EDGE),
                ("/net", "/net/b", CHILD_EDGE),
                ("/net/a", "/net/b", REFERENCE_EDGE),
            ]
        );
    }

    #[test]
    fn test_bad_documents_fail() {
        let source = XmlDataSource::new();
        assert!(source.parse("<graph><open></graph>").is_err());

        let err = source
            .parse("<g><a><x>1</x><reference>/g/a[last()]</reference></a></g>")
            .unwrap_err();
        assert!(format!("{err:#}").contains("unsupported XPath predicate"));
    }
}
