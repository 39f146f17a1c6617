//! A small CSS selector engine for the selectors this tool needs.
//!
//! Supported: type selectors, `*`, `.class`, `#id`, compound selectors and
//! the descendant (whitespace) and child (`>`) combinators. Parsing is a
//! small nom grammar; matching runs right to left over the rcdom parent
//! links.

use crate::parsing::dom;
use markup5ever_rcdom::Handle;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair, preceded},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected {found:?} at byte {position} in selector {selector:?}")]
    Unexpected {
        selector: String,
        position: usize,
        found: char,
    },

    #[error("selector {selector:?} ends with a combinator")]
    DanglingCombinator { selector: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, node: &Handle) -> bool {
        let Some(name) = dom::element_name(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if dom::get_attribute(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| dom::has_class(node, class))
    }
}

#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
    // combinators[i] sits between compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

enum Subclass {
    Class(String),
    Id(String),
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char).parse(input)
}

// `*` or a tag name; `None` inside means universal
fn type_selector(input: &str) -> IResult<&str, Option<String>> {
    alt((
        map(char('*'), |_| None),
        map(ident, |tag: &str| Some(tag.to_ascii_lowercase())),
    ))
    .parse(input)
}

fn subclass(input: &str) -> IResult<&str, Subclass> {
    alt((
        map(preceded(char('.'), ident), |name: &str| {
            Subclass::Class(name.to_string())
        }),
        map(preceded(char('#'), ident), |name: &str| {
            Subclass::Id(name.to_string())
        }),
    ))
    .parse(input)
}

fn compound(input: &str) -> IResult<&str, Compound> {
    let (rest, (tag, subclasses)) = pair(opt(type_selector), many0(subclass)).parse(input)?;
    if tag.is_none() && subclasses.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Verify,
        )));
    }

    let mut compound = Compound {
        tag: tag.flatten(),
        ..Compound::default()
    };
    for subclass in subclasses {
        match subclass {
            Subclass::Class(name) => compound.classes.push(name),
            Subclass::Id(name) => compound.id = Some(name),
        }
    }
    Ok((rest, compound))
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        map(delimited(multispace0, char('>'), multispace0), |_| {
            Combinator::Child
        }),
        map(multispace1, |_| Combinator::Descendant),
    ))
    .parse(input)
}

fn complex(input: &str) -> IResult<&str, (Compound, Vec<(Combinator, Compound)>)> {
    preceded(multispace0, pair(compound, many0(pair(combinator, compound)))).parse(input)
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        if selector.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let unexpected = |rest: &str| SelectorError::Unexpected {
            selector: selector.to_string(),
            position: selector.len() - rest.len(),
            found: rest.chars().next().unwrap_or_default(),
        };

        let (rest, (first, tail)) = match complex(selector) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => return Err(unexpected(e.input)),
            Err(nom::Err::Incomplete(_)) => return Err(unexpected("")),
        };

        let rest = rest.trim_start();
        if rest.strip_prefix('>').is_some_and(|after| after.trim().is_empty()) {
            return Err(SelectorError::DanglingCombinator {
                selector: selector.to_string(),
            });
        }
        if !rest.is_empty() {
            return Err(unexpected(rest));
        }

        let mut compounds = vec![first];
        let mut combinators = Vec::with_capacity(tail.len());
        for (combinator, compound) in tail {
            combinators.push(combinator);
            compounds.push(compound);
        }

        Ok(Self {
            source: selector.to_string(),
            compounds,
            combinators,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, node: &Handle) -> bool {
        self.matches_from(node, self.compounds.len() - 1)
    }

    fn matches_from(&self, node: &Handle, index: usize) -> bool {
        if !self.compounds[index].matches(node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => {
                dom::parent(node).is_some_and(|parent| self.matches_from(&parent, index - 1))
            }
            Combinator::Descendant => {
                let mut ancestor = dom::parent(node);
                while let Some(current) = ancestor {
                    if self.matches_from(&current, index - 1) {
                        return true;
                    }
                    ancestor = dom::parent(&current);
                }
                false
            }
        }
    }

    /// Matching elements below `root`, in document order.
    pub fn query_all(&self, root: &Handle) -> Vec<Handle> {
        dom::descendants(root)
            .into_iter()
            .filter(|node| self.matches(node))
            .collect()
    }

    pub fn query_first(&self, root: &Handle) -> Option<Handle> {
        dom::descendants(root)
            .into_iter()
            .find(|node| self.matches(node))
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::dom::{parse_html, text_content};

    const PAGE: &str = r#"
        <div id="table-of-contents">
          <div class="toctree-wrapper compound">
            <ul>
              <li class="toctree-l1"><a href="u1.html">1. One</a>
                <ul><li class="toctree-l2"><a href="u1/a.html">1.1. Nested</a></li></ul>
              </li>
              <li class="toctree-l1"><a href="u2.html">2. Two</a></li>
            </ul>
          </div>
        </div>
        <span class="section-number">3. </span>
    "#;

    fn texts(selector: &str) -> Vec<String> {
        let dom = parse_html(PAGE);
        Selector::parse(selector)
            .unwrap()
            .query_all(&dom.document)
            .iter()
            .map(text_content)
            .collect()
    }

    #[test]
    fn test_descendant_matches_nested_links() {
        assert_eq!(
            texts(".toctree-wrapper ul li a"),
            vec!["1. One", "1.1. Nested", "2. Two"]
        );
    }

    #[test]
    fn test_child_combinator_limits_depth() {
        let items = texts("#table-of-contents .toctree-wrapper > ul > li");
        assert_eq!(items.len(), 2);
        assert!(items[0].contains("1. One"));
        assert!(items[1].contains("2. Two"));
    }

    #[test]
    fn test_compound_tag_and_class() {
        assert_eq!(texts("span.section-number"), vec!["3. "]);
        assert!(texts("div.section-number").is_empty());
        assert_eq!(texts("li.toctree-l2 *"), vec!["1.1. Nested"]);
    }

    #[test]
    fn test_query_first_in_document_order() {
        let dom = parse_html(PAGE);
        let first = Selector::parse("ul li > a")
            .unwrap()
            .query_first(&dom.document)
            .unwrap();

        assert_eq!(text_content(&first), "1. One");
        assert!(Selector::parse("ol").unwrap().query_first(&dom.document).is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Selector::parse("   ").unwrap_err(), SelectorError::Empty);
        assert!(matches!(
            Selector::parse("ul >"),
            Err(SelectorError::DanglingCombinator { .. })
        ));
        assert!(matches!(
            Selector::parse("a[href]"),
            Err(SelectorError::Unexpected { found: '[', .. })
        ));
        assert!(matches!(
            Selector::parse("> li"),
            Err(SelectorError::Unexpected { found: '>', .. })
        ));
        assert_eq!(
            Selector::parse("li. a").unwrap_err(),
            SelectorError::Unexpected {
                selector: "li. a".to_string(),
                position: 2,
                found: '.',
            }
        );
        assert!(matches!(
            Selector::parse("ul > > li"),
            Err(SelectorError::Unexpected { found: '>', .. })
        ));
        assert!(matches!(
            Selector::parse("a**"),
            Err(SelectorError::Unexpected { found: '*', .. })
        ));
    }

    #[test]
    fn test_parse_whitespace_around_combinators() {
        assert_eq!(texts("  ul>li>a  "), texts("ul > li > a"));
        assert_eq!(texts("ul\n\tli a"), vec!["1. One", "1.1. Nested", "2. Two"]);
        assert_eq!(texts("li#missing"), Vec::<String>::new());
        assert_eq!(texts("*.section-number"), vec!["3. "]);
    }

    #[test]
    fn test_from_str_keeps_source() {
        let selector: Selector = "li.dropdown.globaltoc-container a".parse().unwrap();
        assert_eq!(selector.as_str(), "li.dropdown.globaltoc-container a");
    }
}
