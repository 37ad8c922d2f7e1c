//! html5ever `TreeSink` that builds a [`NodeArena`].

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::driver::ParseOpts;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, QualName, parse_document};

use super::arena::{Attr, NodeArena, NodeId, NodeKind};

/// Parse a complete or partial HTML document.
///
/// Fragments are parsed as documents too; their nodes end up under `<body>`
/// (or `<head>` for head-only content), which is what callers walk.
pub fn parse_html(html: &str) -> NodeArena {
    parse_document(ArenaSink::default(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_arena()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(pub NodeId);

/// Interior mutability is required: html5ever drives the sink through `&self`.
#[derive(Default)]
pub struct ArenaSink {
    arena: RefCell<NodeArena>,
}

impl ArenaSink {
    pub fn into_arena(self) -> NodeArena {
        self.arena.into_inner()
    }

    fn insert(&self, parent: NodeId, child: NodeOrText<Handle>) {
        let mut arena = self.arena.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => arena.append(parent, node.0),
            NodeOrText::AppendText(text) => arena.append_text(parent, &text),
        }
    }
}

impl TreeSink for ArenaSink {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self {
        self
    }

    // Course pages are browser-rendered HTML; recover like a browser would.
    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> Handle {
        Handle(self.arena.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> &'a QualName {
        static NO_NAME: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let arena = self.arena.borrow();
        match arena.element(target.0) {
            Some(el) => {
                let name: *const QualName = &*el.name;
                // SAFETY: element names are boxed and never dropped or replaced
                // while the sink is alive, so the pointee outlives the RefCell
                // borrow that produced it.
                unsafe { &*name }
            }
            None => &NO_NAME,
        }
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _: ElementFlags) -> Handle {
        let attrs = attrs
            .into_iter()
            .map(|a| Attr {
                name: a.name,
                value: a.value.to_string(),
            })
            .collect();
        Handle(self.arena.borrow_mut().new_element(name, attrs))
    }

    fn create_comment(&self, _text: StrTendril) -> Handle {
        Handle(self.arena.borrow_mut().new_other())
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
        Handle(self.arena.borrow_mut().new_other())
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        self.insert(parent.0, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        let parent = self.arena.borrow().parent(element.0);
        if parent.is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.insert(prev_element.0, child);
        }
    }

    fn append_doctype_to_document(&self, _: StrTendril, _: StrTendril, _: StrTendril) {
        let mut arena = self.arena.borrow_mut();
        let doctype = arena.new_other();
        let doc = arena.document();
        arena.append(doc, doctype);
    }

    fn get_template_contents(&self, target: &Handle) -> Handle {
        *target
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Handle, new_node: NodeOrText<Handle>) {
        let mut arena = self.arena.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => arena.insert_before(sibling.0, node.0),
            NodeOrText::AppendText(text) => arena.insert_text_before(sibling.0, &text),
        }
    }

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Attribute>) {
        let mut arena = self.arena.borrow_mut();
        if let Some(node) = arena.get_mut(target.0)
            && let NodeKind::Element(el) = &mut node.kind
        {
            for attr in attrs {
                if !el.attrs.iter().any(|a| a.name == attr.name) {
                    el.attrs.push(Attr {
                        name: attr.name,
                        value: attr.value.to_string(),
                    });
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Handle) {
        self.arena.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let mut arena = self.arena.borrow_mut();
        let children: Vec<_> = arena.children(node.0).collect();
        for child in children {
            arena.append(new_parent.0, child);
        }
    }
}
