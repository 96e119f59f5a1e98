//! CSS Selectors - Selector parsing and matching
//!
//! Supports selector lists, compound selectors (type, universal, id, class,
//! attribute), the structural and form pseudo-classes, `:not()`, and all
//! four combinators. Matching runs right-to-left against a [`DomArena`].

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;

/// A list of selectors (comma-separated in CSS).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

/// A complex selector: compounds joined by combinators.
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

/// A sequence of simple selectors with no combinator (`div.item[open]`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    pub components: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    /// Universal selector `*`
    Universal,
    /// Type/element selector (lowercased)
    Type(String),
    Id(String),
    Class(String),
    Attribute {
        name: String,
        operator: AttributeOperator,
        value: String,
        case_insensitive: bool,
    },
    PseudoClass(PseudoClass),
}

/// Attribute selector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]`
    Includes,
    /// `[attr|=value]`
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Checked,
    Disabled,
    Enabled,
    Not(SelectorList),
}

/// Selector combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (space)
    Descendant,
    /// Child combinator `>`
    Child,
    /// Next sibling combinator `+`
    NextSibling,
    /// Subsequent sibling combinator `~`
    SubsequentSibling,
}

/// Selector specificity as (ids, classes, types)
pub type Specificity = (u32, u32, u32);

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser::new(input);
        let list = parser.parse_list()?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(list)
    }

    /// Check whether any selector in the list matches the node
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(arena, node_id))
    }

    /// Highest specificity among selectors matching the node
    pub fn matching_specificity(&self, arena: &DomArena, node_id: NodeId) -> Option<Specificity> {
        self.selectors
            .iter()
            .filter(|s| s.matches(arena, node_id))
            .map(Selector::specificity)
            .max()
    }
}

impl Selector {
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        if !arena.is_element(node_id) || self.compounds.is_empty() {
            return false;
        }
        self.matches_at(arena, node_id, self.compounds.len() - 1)
    }

    fn matches_at(&self, arena: &DomArena, node_id: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(arena, node_id) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        match self.combinators[next] {
            Combinator::Descendant => arena
                .ancestors(node_id)
                .into_iter()
                .any(|a| self.matches_at(arena, a, next)),
            Combinator::Child => arena
                .parent_element(node_id)
                .is_some_and(|p| self.matches_at(arena, p, next)),
            Combinator::NextSibling => arena
                .previous_element_sibling(node_id)
                .is_some_and(|s| self.matches_at(arena, s, next)),
            Combinator::SubsequentSibling => {
                let mut current = arena.previous_element_sibling(node_id);
                while let Some(sibling) = current {
                    if self.matches_at(arena, sibling, next) {
                        return true;
                    }
                    current = arena.previous_element_sibling(sibling);
                }
                false
            }
        }
    }

    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .flat_map(|c| c.components.iter())
            .fold((0, 0, 0), |(a, b, c), component| match component {
                SimpleSelector::Id(_) => (a + 1, b, c),
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute { .. }
                | SimpleSelector::PseudoClass(_) => (a, b + 1, c),
                SimpleSelector::Type(_) => (a, b, c + 1),
                SimpleSelector::Universal => (a, b, c),
            })
    }
}

impl Compound {
    fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        self.components
            .iter()
            .all(|component| component.matches(arena, node_id))
    }
}

impl SimpleSelector {
    fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        let Ok(node) = arena.element(node_id) else {
            return false;
        };
        match self {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(tag) => node.node_name == *tag,
            SimpleSelector::Id(id) => node.attr("id") == Some(id.as_str()),
            SimpleSelector::Class(class) => node
                .attr("class")
                .is_some_and(|c| c.split_whitespace().any(|token| token == class)),
            SimpleSelector::Attribute {
                name,
                operator,
                value,
                case_insensitive,
            } => {
                let Some(actual) = node.attr(name) else {
                    return false;
                };
                let (actual, expected) = if *case_insensitive {
                    (actual.to_ascii_lowercase(), value.to_ascii_lowercase())
                } else {
                    (actual.to_string(), value.clone())
                };
                match operator {
                    AttributeOperator::Exists => true,
                    AttributeOperator::Equals => actual == expected,
                    AttributeOperator::Includes => {
                        actual.split_whitespace().any(|token| token == expected)
                    }
                    AttributeOperator::DashMatch => {
                        actual == expected || actual.starts_with(&format!("{}-", expected))
                    }
                    AttributeOperator::Prefix => {
                        !expected.is_empty() && actual.starts_with(&expected)
                    }
                    AttributeOperator::Suffix => {
                        !expected.is_empty() && actual.ends_with(&expected)
                    }
                    AttributeOperator::Substring => {
                        !expected.is_empty() && actual.contains(&expected)
                    }
                }
            }
            SimpleSelector::PseudoClass(pseudo) => pseudo.matches(arena, node_id),
        }
    }
}

impl PseudoClass {
    fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        match self {
            PseudoClass::FirstChild => {
                arena.parent(node_id).is_some() && arena.previous_element_sibling(node_id).is_none()
            }
            PseudoClass::LastChild => {
                arena.parent(node_id).is_some() && arena.next_element_sibling(node_id).is_none()
            }
            PseudoClass::OnlyChild => {
                arena.parent(node_id).is_some()
                    && arena.previous_element_sibling(node_id).is_none()
                    && arena.next_element_sibling(node_id).is_none()
            }
            PseudoClass::Empty => arena.children(node_id).iter().all(|&c| {
                arena
                    .get(c)
                    .map(|n| !n.is_element() && !(n.is_text() && !n.node_value.is_empty()))
                    .unwrap_or(true)
            }),
            PseudoClass::Root => {
                arena.parent(node_id).is_some() && arena.parent(node_id) == arena.root_id()
            }
            PseudoClass::Checked => arena.is_checked(node_id),
            PseudoClass::Disabled => arena.is_disabled(node_id),
            PseudoClass::Enabled => {
                let is_control = arena
                    .get(node_id)
                    .map(|n| {
                        ["button", "input", "select", "textarea", "option", "fieldset"]
                            .contains(&n.node_name.as_str())
                    })
                    .unwrap_or(false);
                is_control && !arena.is_disabled(node_id)
            }
            PseudoClass::Not(list) => !list.matches(arena, node_id),
        }
    }
}

/// Recursive-descent selector parser over chars
struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> DomError {
        DomError::selector(self.input, format!("{} at position {}", reason, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn parse_list(&mut self) -> Result<SelectorList> {
        let mut list = SelectorList::default();
        loop {
            self.skip_whitespace();
            list.selectors.push(self.parse_selector()?);
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.pos += 1;
            } else {
                return Ok(list);
            }
        }
    }

    fn parse_selector(&mut self) -> Result<Selector> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(',') | Some(')') | None => break,
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.error("unexpected character")),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(Selector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                compound.components.push(SimpleSelector::Universal);
            }
            Some(c) if is_ident_start(c) => {
                let tag = self.parse_ident()?;
                compound
                    .components
                    .push(SimpleSelector::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.components.push(SimpleSelector::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound
                        .components
                        .push(SimpleSelector::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.components.push(self.parse_attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.components.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if compound.components.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.peek() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err(self.error("dangling escape")),
                }
                self.pos += 1;
            } else if is_ident_char(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let operator = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(SimpleSelector::Attribute {
                    name,
                    operator: AttributeOperator::Exists,
                    value: String::new(),
                    case_insensitive: false,
                });
            }
            Some('=') => AttributeOperator::Equals,
            Some('~') => AttributeOperator::Includes,
            Some('|') => AttributeOperator::DashMatch,
            Some('^') => AttributeOperator::Prefix,
            Some('$') => AttributeOperator::Suffix,
            Some('*') => AttributeOperator::Substring,
            _ => return Err(self.error("expected attribute operator")),
        };
        self.pos += 1;
        if operator != AttributeOperator::Equals {
            self.expect('=')?;
        }
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_string(quote)?,
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.pos += 1;
            self.skip_whitespace();
        }
        self.expect(']')?;

        Ok(SimpleSelector::Attribute {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn parse_string(&mut self, quote: char) -> Result<String> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.pos += 1;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<SimpleSelector> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements are not supported"));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "empty" => PseudoClass::Empty,
            "root" => PseudoClass::Root,
            "checked" => PseudoClass::Checked,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "not" => {
                self.expect('(')?;
                let inner = self.parse_list()?;
                self.skip_whitespace();
                self.expect(')')?;
                PseudoClass::Not(inner)
            }
            _ => return Err(self.error(&format!("unknown pseudo-class ':{}'", name))),
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// doc > html > body > [div#main.box.wide > (span.a, p[lang=en-US]), ul > (li, li.last)]
    fn fixture() -> (DomArena, Vec<NodeId>) {
        let mut arena = DomArena::new();
        let doc = arena.create_document();
        let html = arena.create_element("html");
        let body = arena.create_element("body");
        let div = arena.create_element("div");
        let span = arena.create_element("span");
        let p = arena.create_element("p");
        let ul = arena.create_element("ul");
        let li1 = arena.create_element("li");
        let li2 = arena.create_element("li");
        arena.append_child(doc, html).unwrap();
        arena.append_child(html, body).unwrap();
        arena.append_child(body, div).unwrap();
        arena.append_child(div, span).unwrap();
        arena.append_child(div, p).unwrap();
        arena.append_child(body, ul).unwrap();
        arena.append_child(ul, li1).unwrap();
        arena.append_child(ul, li2).unwrap();
        arena.get_mut(div).unwrap().set_attr("id", "main");
        arena.get_mut(div).unwrap().set_attr("class", "box wide");
        arena.get_mut(span).unwrap().set_attr("class", "a");
        arena.get_mut(p).unwrap().set_attr("lang", "en-US");
        arena.get_mut(li2).unwrap().set_attr("class", "last");
        (arena, vec![html, body, div, span, p, ul, li1, li2])
    }

    fn matches(arena: &DomArena, selector: &str, node: NodeId) -> bool {
        SelectorList::parse(selector).unwrap().matches(arena, node)
    }

    #[test]
    fn test_compound_matching() {
        let (arena, n) = fixture();
        let (html, div, span, p) = (n[0], n[2], n[3], n[4]);
        assert!(matches(&arena, "div#main.box.wide", div));
        assert!(!matches(&arena, "div.narrow", div));
        assert!(matches(&arena, "*", span));
        assert!(matches(&arena, "[lang|=en]", p));
        assert!(matches(&arena, "[lang^='en']", p));
        assert!(matches(&arena, "[lang=EN-us i]", p));
        assert!(!matches(&arena, "[lang=EN-us]", p));
        assert!(matches(&arena, "[class~=wide]", div));
        assert!(matches(&arena, ":root", html));
        assert!(!matches(&arena, ":root", div));
    }

    #[test]
    fn test_combinators() {
        let (arena, n) = fixture();
        let (span, p, li1, li2) = (n[3], n[4], n[6], n[7]);
        assert!(matches(&arena, "body span", span));
        assert!(matches(&arena, "#main > .a", span));
        assert!(!matches(&arena, "body > span", span));
        assert!(matches(&arena, "span + p", p));
        assert!(matches(&arena, "li ~ li.last", li2));
        assert!(!matches(&arena, "li ~ li", li1));
        assert!(matches(&arena, "li:first-child, p", li1));
        assert!(matches(&arena, "li:not(.last)", li1));
        assert!(!matches(&arena, "li:not(.last)", li2));
    }

    #[test]
    fn test_specificity() {
        let list = SelectorList::parse("div#main .a[x]").unwrap();
        assert_eq!(list.selectors[0].specificity(), (1, 2, 1));
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "div >", "[x", ".1a", "p:hover", "a::before", "div,", "p )"] {
            assert!(
                SelectorList::parse(bad).is_err(),
                "expected '{}' to be rejected",
                bad
            );
        }
    }
}
