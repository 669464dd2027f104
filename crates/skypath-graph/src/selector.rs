//! Selector mini-language.
//!
//! Queries address the store through free-form selector strings:
//!
//! - `nodes(label = Person)` — all nodes carrying a label
//! - `nodes(id in (1, 2, 3))` — explicit node ids
//! - `type(KNOWS)` — a relationship-type token
//!
//! Selectors resolve two ways. Start/end selectors resolve to node ids;
//! preference/exclude selectors resolve to reward-table tokens, where a node
//! id is stringified in decimal and a relationship type contributes its name.
//! Both kinds of token land in one flat namespace by design: a node id `"42"`
//! and a relationship type named `"42"` share a reward bucket.
//!
//! Malformed selectors are fatal to the whole query.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char as pchar, digit1, multispace0},
    combinator::{all_consuming, map, map_res, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::{GraphStore, NodeId};

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    NodesByLabel(String),
    NodesById(Vec<u32>),
    RelType(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("malformed selector {input:?}: {message}")]
    Parse { input: String, message: String },
    #[error("selector {0:?} does not produce nodes")]
    NodeSelectorExpected(String),
    #[error("selector names unknown node id {0}")]
    UnknownNodeId(u32),
}

// ============================================================================
// Parser
// ============================================================================

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse)(input)
}

fn label_clause(input: &str) -> IResult<&str, Selector> {
    map(
        preceded(pair(ws(tag("label")), ws(pchar('='))), ws(ident)),
        |label| Selector::NodesByLabel(label.to_string()),
    )(input)
}

fn id_clause(input: &str) -> IResult<&str, Selector> {
    map(
        preceded(
            pair(ws(tag("id")), ws(tag("in"))),
            delimited(
                ws(pchar('(')),
                separated_list1(ws(pchar(',')), number),
                ws(pchar(')')),
            ),
        ),
        Selector::NodesById,
    )(input)
}

fn nodes_selector(input: &str) -> IResult<&str, Selector> {
    preceded(
        ws(tag("nodes")),
        delimited(ws(pchar('(')), alt((label_clause, id_clause)), ws(pchar(')'))),
    )(input)
}

fn type_selector(input: &str) -> IResult<&str, Selector> {
    map(
        preceded(
            ws(tag("type")),
            delimited(ws(pchar('(')), ws(ident), ws(pchar(')'))),
        ),
        |name| Selector::RelType(name.to_string()),
    )(input)
}

/// Parse a selector string.
pub fn parse_selector(input: &str) -> Result<Selector, SelectorError> {
    match all_consuming(ws(alt((nodes_selector, type_selector))))(input) {
        Ok((_, selector)) => Ok(selector),
        Err(err) => Err(SelectorError::Parse {
            input: input.to_string(),
            message: err.to_string(),
        }),
    }
}

// ============================================================================
// Resolution
// ============================================================================

impl GraphStore {
    /// Resolve a node-producing selector to node ids.
    pub fn resolve_node_ids(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        match parse_selector(selector)? {
            Selector::NodesByLabel(label) => Ok(self.nodes_with_label(&label)),
            Selector::NodesById(ids) => self.checked_ids(&ids),
            Selector::RelType(_) => {
                Err(SelectorError::NodeSelectorExpected(selector.to_string()))
            }
        }
    }

    /// Resolve a selector to reward-table tokens.
    pub fn resolve_tokens(&self, selector: &str) -> Result<Vec<String>, SelectorError> {
        match parse_selector(selector)? {
            Selector::NodesByLabel(label) => Ok(self
                .nodes_with_label(&label)
                .into_iter()
                .map(|n| n.raw().to_string())
                .collect()),
            Selector::NodesById(ids) => Ok(self
                .checked_ids(&ids)?
                .into_iter()
                .map(|n| n.raw().to_string())
                .collect()),
            Selector::RelType(name) => Ok(vec![name]),
        }
    }

    fn checked_ids(&self, ids: &[u32]) -> Result<Vec<NodeId>, SelectorError> {
        ids.iter()
            .map(|&raw| {
                let node = NodeId::new(raw);
                if self.node_exists(node) {
                    Ok(node)
                } else {
                    Err(SelectorError::UnknownNodeId(raw))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_forms() {
        assert_eq!(
            parse_selector("nodes(label = Person)").unwrap(),
            Selector::NodesByLabel("Person".to_string())
        );
        assert_eq!(
            parse_selector(" nodes( id in (1, 2,3) ) ").unwrap(),
            Selector::NodesById(vec![1, 2, 3])
        );
        assert_eq!(
            parse_selector("type(KNOWS)").unwrap(),
            Selector::RelType("KNOWS".to_string())
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "nodes(label)", "nodes(id in ())", "type()", "edges(x)"] {
            assert!(
                matches!(parse_selector(bad), Err(SelectorError::Parse { .. })),
                "expected parse failure for {bad:?}"
            );
        }
    }

    #[test]
    fn resolves_against_store() {
        let store = GraphStore::new();
        let a = store.add_node("Person");
        let b = store.add_node("Person");
        store.add_node("City");

        assert_eq!(
            store.resolve_node_ids("nodes(label = Person)").unwrap(),
            vec![a, b]
        );
        assert_eq!(
            store.resolve_tokens("nodes(id in (0, 1))").unwrap(),
            vec!["0".to_string(), "1".to_string()]
        );
        assert_eq!(
            store.resolve_tokens("type(KNOWS)").unwrap(),
            vec!["KNOWS".to_string()]
        );
        assert!(store.resolve_node_ids("nodes(label = Ghost)").unwrap().is_empty());
    }

    #[test]
    fn type_selector_does_not_produce_nodes() {
        let store = GraphStore::new();
        assert!(matches!(
            store.resolve_node_ids("type(KNOWS)"),
            Err(SelectorError::NodeSelectorExpected(_))
        ));
    }

    #[test]
    fn unknown_explicit_id_is_fatal() {
        let store = GraphStore::new();
        store.add_node("Person");
        assert!(matches!(
            store.resolve_node_ids("nodes(id in (7))"),
            Err(SelectorError::UnknownNodeId(7))
        ));
    }
}
