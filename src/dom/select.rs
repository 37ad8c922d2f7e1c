//! CSS selector matching over [`NodeArena`] using the `selectors` crate.
//!
//! Course widgets are recognized purely by class structure, so the supported
//! surface is what the player markup needs: type, class, id, attribute,
//! descendant/child/sibling combinators and selector lists. Dynamic
//! pseudo-classes never match a static snapshot.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use cssparser::{Parser as CssParser, ParserInput, ToCss};
use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, QuirksMode, SelectorCaches};
use selectors::matching::{
    ElementSelectorFlags, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags,
    matches_selector,
};
use selectors::parser::{ParseRelative, Selector, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{NodeArena, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSelectors;

/// Identifier and attribute-value string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct CssString(pub String);

impl precomputed_hash::PrecomputedHash for CssString {
    fn precomputed_hash(&self) -> u32 {
        // FNV-1a
        self.0.bytes().fold(0x811c_9dc5_u32, |h, b| {
            (h ^ u32::from(b)).wrapping_mul(0x0100_0193)
        })
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl<'a> From<&'a str> for CssString {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CssString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(Namespace::from(s))
    }
}

/// No pseudo-elements are supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = CourseSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

/// No non-tree-structural pseudo-classes are supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = CourseSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl<'i> selectors::parser::Parser<'i> for CourseSelectors {
    type Impl = CourseSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

impl SelectorImpl for CourseSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssString;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = CssString;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

/// An element of a [`NodeArena`] seen through the `selectors::Element` trait.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    arena: &'a NodeArena,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(arena: &'a NodeArena, id: NodeId) -> Self {
        Self { arena, id }
    }

    fn element_sibling(&self, forward: bool) -> Option<Self> {
        let step = |id: NodeId| {
            self.arena.get(id).map_or(NodeId::NONE, |n| {
                if forward { n.next_sibling } else { n.prev_sibling }
            })
        };
        let mut cursor = step(self.id);
        while cursor.is_some() {
            if self.arena.is_element(cursor) {
                return Some(Self::new(self.arena, cursor));
            }
            cursor = step(cursor);
        }
        None
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> #{}", self.arena.tag(self.id), self.id.0)
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = CourseSelectors;

    fn opaque(&self) -> OpaqueElement {
        match self.arena.get(self.id) {
            Some(node) => OpaqueElement::new(node),
            None => OpaqueElement::new(self.arena),
        }
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.arena.parent(self.id);
        self.arena
            .is_element(parent)
            .then(|| Self::new(self.arena, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.element_sibling(false)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.element_sibling(true)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.arena
            .child_elements(self.id)
            .next()
            .map(|c| Self::new(self.arena, c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.arena.local_name(self.id) == Some(&name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.arena.namespace(self.id) == Some(&ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.arena.local_name(self.id) == other.arena.local_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        let Some(el) = self.arena.element(self.id) else {
            return false;
        };
        el.attrs.iter().any(|attr| {
            let ns_ok = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            };
            ns_ok && attr.name.local == local_name.0 && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<'_, CourseSelectors>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, CourseSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        self.arena.is_tag(self.id, "a") && self.arena.attr(self.id, "href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.arena
            .element(self.id)
            .and_then(|el| el.id.as_deref())
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.arena.element(self.id).is_some_and(|el| {
            el.classes
                .iter()
                .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssString) -> Option<CssString> {
        None
    }

    fn is_part(&self, _name: &CssString) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.arena.children(self.id).all(|c| match self.arena.get(c) {
            Some(n) => match &n.kind {
                NodeKind::Element(_) => false,
                NodeKind::Text(t) => t.is_empty(),
                _ => true,
            },
            None => true,
        })
    }

    fn is_root(&self) -> bool {
        let parent = self.arena.parent(self.id);
        matches!(
            self.arena.get(parent).map(|n| &n.kind),
            Some(NodeKind::Document)
        )
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &CssString) -> bool {
        false
    }
}

/// A parsed selector list.
#[derive(Debug)]
pub struct CompiledSelector {
    selectors: Vec<Selector<CourseSelectors>>,
}

impl CompiledSelector {
    pub fn parse(source: &str) -> Option<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = CssParser::new(&mut input);
        let list = SelectorList::parse(&CourseSelectors, &mut parser, ParseRelative::No).ok()?;
        Some(Self {
            selectors: list.slice().to_vec(),
        })
    }

    /// Whether the element `id` matches any selector in the list.
    pub fn matches(&self, arena: &NodeArena, id: NodeId) -> bool {
        if !arena.is_element(id) {
            return false;
        }
        let element = ElementRef::new(arena, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        self.selectors
            .iter()
            .any(|s| matches_selector(s, 0, None, &element, &mut context))
    }

    /// Matching descendants of `scope` in document order. Ancestors outside
    /// the scope still take part in combinator matching, like
    /// `Element.querySelectorAll`.
    pub fn select<'a>(
        &'a self,
        arena: &'a NodeArena,
        scope: NodeId,
    ) -> impl Iterator<Item = NodeId> + 'a {
        arena
            .descendants(scope)
            .filter(move |&id| self.matches(arena, id))
    }
}

thread_local! {
    static SELECTOR_CACHE: RefCell<HashMap<String, Option<Rc<CompiledSelector>>>> =
        RefCell::new(HashMap::new());
}

/// Parse `source` once per thread. Invalid selectors yield `None` and match
/// nothing.
pub fn compile(source: &str) -> Option<Rc<CompiledSelector>> {
    SELECTOR_CACHE.with(|cache| {
        if let Some(hit) = cache.borrow().get(source) {
            return hit.clone();
        }
        let compiled = CompiledSelector::parse(source).map(Rc::new);
        if compiled.is_none() {
            log::debug!("ignoring unparsable selector {source:?}");
        }
        cache
            .borrow_mut()
            .insert(source.to_string(), compiled.clone());
        compiled
    })
}
