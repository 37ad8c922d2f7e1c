//! Arena-allocated HTML tree.
//!
//! html5ever parses course pages into this structure through [`super::tree_sink`].
//! Nodes live in one vector and link to each other by index, which keeps
//! selector matching and repeated subtree walks cheap.

use html5ever::{LocalName, Namespace, QualName};

/// Index of a node in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node".
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// An element attribute.
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: QualName,
    pub value: String,
}

/// Element payload. `id` and `classes` are split out at creation time since
/// almost every course selector is a class selector.
///
/// The name is boxed so its address survives arena growth; the tree sink hands
/// out references to it while parsing continues.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: Box<QualName>,
    pub attrs: Vec<Attr>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Element {
    fn new(name: QualName, attrs: Vec<Attr>) -> Self {
        let id = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "id")
            .map(|a| a.value.clone());
        let classes = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "class")
            .map(|a| a.value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Self {
            name: Box::new(name),
            attrs,
            id,
            classes,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.local.as_ref() == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    /// Comments, doctypes and processing instructions. Kept only so that
    /// html5ever has a handle to return; they never produce output.
    Other,
}

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// The parsed tree. Node 0 is always the document.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn new_element(&mut self, name: QualName, attrs: Vec<Attr>) -> NodeId {
        self.push(NodeKind::Element(Element::new(name, attrs)))
    }

    pub fn new_text(&mut self, text: String) -> NodeId {
        self.push(NodeKind::Text(text))
    }

    pub fn new_other(&mut self) -> NodeId {
        self.push(NodeKind::Other)
    }

    /// Unlink `id` from its parent and siblings. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        match self.get_mut(prev) {
            Some(p) => p.next_sibling = next,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = prev,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = prev;
                }
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);
        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
            c.prev_sibling = last;
        }
        match self.get_mut(last) {
            Some(l) => l.next_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = child;
                }
            }
        }
        if let Some(p) = self.get_mut(parent) {
            p.last_child = child;
        }
    }

    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        self.detach(child);
        let Some(sib) = self.get(sibling) else {
            return;
        };
        let (parent, prev) = (sib.parent, sib.prev_sibling);
        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
            c.prev_sibling = prev;
            c.next_sibling = sibling;
        }
        if let Some(s) = self.get_mut(sibling) {
            s.prev_sibling = child;
        }
        match self.get_mut(prev) {
            Some(p) => p.next_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = child;
                }
            }
        }
    }

    /// Append text, merging into a trailing text node when there is one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);
        if let Some(Node {
            kind: NodeKind::Text(existing),
            ..
        }) = self.get_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let node = self.new_text(text.to_string());
        self.append(parent, node);
    }

    pub fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        let prev = self.get(sibling).map_or(NodeId::NONE, |n| n.prev_sibling);
        if let Some(Node {
            kind: NodeKind::Text(existing),
            ..
        }) = self.get_mut(prev)
        {
            existing.push_str(text);
            return;
        }
        let node = self.new_text(text.to_string());
        self.insert_before(sibling, node);
    }

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            arena: self,
            next: self.get(parent).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Element children only.
    pub fn child_elements(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(|&c| self.is_element(c))
    }

    /// All nodes below `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            root,
            next: self.get(root).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.parent)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.get(id)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn local_name(&self, id: NodeId) -> Option<&LocalName> {
        self.element(id).map(|el| &el.name.local)
    }

    pub fn namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.element(id).map(|el| &el.name.ns)
    }

    /// Lower-case tag name, or `""` for non-elements.
    pub fn tag(&self, id: NodeId) -> &str {
        self.local_name(id).map_or("", |n| n.as_ref())
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == tag
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    /// First descendant element with the given tag.
    pub fn find_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root).find(|&id| self.is_tag(id, tag))
    }
}

pub struct Children<'a> {
    arena: &'a NodeArena,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.arena.get(current)?;
        self.next = node.next_sibling;
        Some(current)
    }
}

pub struct Descendants<'a> {
    arena: &'a NodeArena,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.arena.get(current)?;

        self.next = if node.first_child.is_some() {
            node.first_child
        } else {
            // Climb until a next sibling exists, stopping at the root.
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.arena.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_some() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if cursor.is_none() || cursor == self.root {
                    break NodeId::NONE;
                }
            }
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    fn attr(name: &str, value: &str) -> Attr {
        Attr {
            name: qname(name),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_element_splits_id_and_classes() {
        let mut arena = NodeArena::new();
        let div = arena.new_element(
            qname("div"),
            vec![attr("id", "main"), attr("class", "block-image  fr-view")],
        );
        let el = arena.element(div).unwrap();
        assert_eq!(el.id.as_deref(), Some("main"));
        assert_eq!(el.classes, vec!["block-image", "fr-view"]);
        assert!(arena.has_class(div, "fr-view"));
        assert!(!arena.has_class(div, "fr"));
    }

    #[test]
    fn test_append_and_insert_before() {
        let mut arena = NodeArena::new();
        let doc = arena.document();
        let ul = arena.new_element(qname("ul"), vec![]);
        let a = arena.new_element(qname("li"), vec![]);
        let b = arena.new_element(qname("li"), vec![]);
        let c = arena.new_element(qname("li"), vec![]);
        arena.append(doc, ul);
        arena.append(ul, a);
        arena.append(ul, c);
        arena.insert_before(c, b);

        let kids: Vec<_> = arena.children(ul).collect();
        assert_eq!(kids, vec![a, b, c]);
        assert_eq!(arena.parent(b), ul);
    }

    #[test]
    fn test_detach_relinks_siblings() {
        let mut arena = NodeArena::new();
        let p = arena.new_element(qname("p"), vec![]);
        let a = arena.new_text("a".to_string());
        let b = arena.new_element(qname("b"), vec![]);
        let c = arena.new_text("c".to_string());
        arena.append(arena.document(), p);
        arena.append(p, a);
        arena.append(p, b);
        arena.append(p, c);

        arena.detach(b);
        let kids: Vec<_> = arena.children(p).collect();
        assert_eq!(kids, vec![a, c]);
        assert!(arena.parent(b).is_none());
    }

    #[test]
    fn test_text_merging() {
        let mut arena = NodeArena::new();
        let p = arena.new_element(qname("p"), vec![]);
        arena.append(arena.document(), p);
        arena.append_text(p, "Hello, ");
        arena.append_text(p, "course!");

        let kids: Vec<_> = arena.children(p).collect();
        assert_eq!(kids.len(), 1);
        assert_eq!(arena.text(kids[0]), Some("Hello, course!"));
    }

    #[test]
    fn test_descendants_stay_inside_root() {
        let mut arena = NodeArena::new();
        let doc = arena.document();
        let first = arena.new_element(qname("div"), vec![]);
        let inner = arena.new_element(qname("span"), vec![]);
        let second = arena.new_element(qname("div"), vec![]);
        arena.append(doc, first);
        arena.append(first, inner);
        arena.append(doc, second);

        let below_first: Vec<_> = arena.descendants(first).collect();
        assert_eq!(below_first, vec![inner]);

        let all: Vec<_> = arena.descendants(doc).collect();
        assert_eq!(all, vec![first, inner, second]);
    }
}
