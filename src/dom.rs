//! Element tree - declarative construction of detached subtrees
//!
//! A tiny document model: elements carry a tag, plain attributes, event
//! listeners and child nodes. [`Element`] is a shared handle, so the same
//! element can be held by its parent and by whoever needs to write into it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Event listener attached to an element
pub type Listener = Rc<dyn Fn()>;

/// Value side of an attribute map entry
#[derive(Clone)]
pub enum Attr {
    /// Plain attribute value (`class`, `id`, ...)
    Value(String),
    /// Listener for the event named by the key (e.g. `"click"`)
    Listener(Listener),
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Attr::Listener(_) => f.write_str("Listener(..)"),
        }
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Attr::Value(value.to_string())
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Attr::Value(value)
    }
}

/// Attribute and listener map passed to [`el`]
#[derive(Clone, Debug, Default)]
pub struct Attrs {
    entries: Vec<(String, Attr)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Attr>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.with("class", Attr::Value(class.into()))
    }

    /// Register `listener` for the `event` type.
    pub fn on(self, event: impl Into<String>, listener: impl Fn() + 'static) -> Self {
        self.with(event, Attr::Listener(Rc::new(listener)))
    }
}

impl<K: Into<String>, V: Into<Attr>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A child node: nested element or text
#[derive(Clone, Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    listeners: Vec<(String, Listener)>,
    children: Vec<Node>,
    parent: Weak<RefCell<ElementData>>,
}

/// Shared handle to an element
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

/// Non-owning handle; fails to upgrade once the element is gone
#[derive(Clone, Debug, Default)]
pub struct WeakElement(Weak<RefCell<ElementData>>);

impl WeakElement {
    pub fn upgrade(&self) -> Option<Element> {
        self.0.upgrade().map(Element)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Element")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("children", &data.children)
            .finish()
    }
}

impl Element {
    /// Create a detached element with no attributes or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0
            .borrow()
            .attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_event_listener(&self, event: impl Into<String>, listener: Listener) {
        self.0.borrow_mut().listeners.push((event.into(), listener));
    }

    /// Invoke every listener registered for `event`, returning how many ran.
    pub fn dispatch(&self, event: &str) -> usize {
        // Listeners may touch this element, so release the borrow first.
        let listeners: Vec<Listener> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    /// Append `child` as the last child. An element that already has a
    /// parent is moved out of it first.
    pub fn append_child(&self, child: impl Into<Node>) {
        let child = child.into();
        if let Node::Element(element) = &child {
            if let Some(previous) = element.parent() {
                previous.remove_child(element);
            }
            element.0.borrow_mut().parent = Rc::downgrade(&self.0);
        }
        self.0.borrow_mut().children.push(child);
    }

    /// Detach `child` from this element. Returns false if it was not a child.
    pub fn remove_child(&self, child: &Element) -> bool {
        let mut data = self.0.borrow_mut();
        let position = data
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.ptr_eq(child)));
        match position {
            Some(index) => {
                data.children.remove(index);
                child.0.borrow_mut().parent = Weak::new();
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_elements(&self) -> Vec<Element> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element.clone()),
                Node::Text(_) => None,
            })
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for node in self.0.borrow().children.iter() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Descendants with the given tag, in document order
    pub fn find_all(&self, tag: &str) -> Vec<Element> {
        let mut found = Vec::new();
        self.collect_matching(&mut found, &|element| element.0.borrow().tag == tag);
        found
    }

    /// First descendant carrying `class`
    pub fn find_by_class(&self, class: &str) -> Option<Element> {
        let mut found = Vec::new();
        self.collect_matching(&mut found, &|element| element.has_class(class));
        found.into_iter().next()
    }

    fn collect_matching(&self, found: &mut Vec<Element>, predicate: &dyn Fn(&Element) -> bool) {
        for child in self.child_elements() {
            if predicate(&child) {
                found.push(child.clone());
            }
            child.collect_matching(found, predicate);
        }
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    /// Topmost ancestor, or the element itself when it has no parent
    pub fn root(&self) -> Element {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Whether `ancestor` is this element or one of its ancestors
    pub fn is_within(&self, ancestor: &Element) -> bool {
        let mut current = Some(self.clone());
        while let Some(element) = current {
            if element.ptr_eq(ancestor) {
                return true;
            }
            current = element.parent();
        }
        false
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement(Rc::downgrade(&self.0))
    }
}

/// Build a detached element from a tag, an attribute/listener map and children.
///
/// Plain attribute values are stored on the element; listeners are registered
/// for the event type named by their key. Strings among `children` become
/// text nodes.
pub fn el<C>(tag: &str, attributes: Attrs, children: C) -> Element
where
    C: IntoIterator,
    C::Item: Into<Node>,
{
    let element = Element::new(tag);
    for (key, value) in attributes.entries {
        match value {
            Attr::Value(value) => element.set_attribute(key, value),
            Attr::Listener(listener) => element.add_event_listener(key, listener),
        }
    }
    for child in children {
        element.append_child(child);
    }
    element
}

/// Remove every child of `element`, leaving the element itself untouched.
pub fn clear(element: &Element) {
    let children = std::mem::take(&mut element.0.borrow_mut().children);
    for child in children {
        if let Node::Element(child) = child {
            child.0.borrow_mut().parent = Weak::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_el_sets_attributes_and_text_children() {
        let element = el("td", Attrs::new().class("cell"), ["5 °C"]);

        assert_eq!(element.tag(), "td");
        assert_eq!(element.attribute("class").as_deref(), Some("cell"));
        assert!(element.has_class("cell"));
        assert_eq!(element.child_count(), 1);
        assert_eq!(element.text_content(), "5 °C");
    }

    #[test]
    fn test_el_mixes_elements_and_text() {
        let heading = el("h2", Attrs::new(), ["Title"]);
        let section = el(
            "section",
            Attrs::new(),
            [Node::from(heading), Node::from("tail")],
        );

        assert_eq!(section.child_count(), 2);
        assert_eq!(section.child_elements().len(), 1);
        assert_eq!(section.text_content(), "Titletail");
    }

    #[test]
    fn test_el_without_children() {
        let element = el("div", Attrs::new(), Vec::<Node>::new());
        assert_eq!(element.child_count(), 0);
        assert_eq!(element.text_content(), "");
    }

    #[test]
    fn test_listener_keys_register_handlers() {
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let button = el(
            "button",
            Attrs::new().on("click", move || counter.set(counter.get() + 1)),
            ["Go"],
        );

        assert_eq!(button.attribute("click"), None);
        assert_eq!(button.dispatch("click"), 1);
        assert_eq!(button.dispatch("click"), 1);
        assert_eq!(button.dispatch("keydown"), 0);
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn test_listener_may_mutate_its_own_element() {
        let button = Element::new("button");
        let weak = button.downgrade();
        button.add_event_listener(
            "click",
            Rc::new(move || {
                if let Some(button) = weak.upgrade() {
                    button.append_child("clicked");
                }
            }),
        );

        button.dispatch("click");
        assert_eq!(button.text_content(), "clicked");
    }

    #[test]
    fn test_clear_is_idempotent_and_keeps_attributes() {
        let list = el(
            "ul",
            Attrs::new().class("locations__list"),
            [el("li", Attrs::new(), ["a"]), el("li", Attrs::new(), ["b"])],
        );

        clear(&list);
        assert_eq!(list.child_count(), 0);
        clear(&list);
        assert_eq!(list.child_count(), 0);
        assert!(list.has_class("locations__list"));
    }

    #[test]
    fn test_find_all_in_document_order() {
        let table = el(
            "table",
            Attrs::new(),
            [
                el("tr", Attrs::new(), [el("th", Attrs::new(), ["h"])]),
                el("tr", Attrs::new(), [el("td", Attrs::new(), ["1"])]),
                el("tr", Attrs::new(), [el("td", Attrs::new(), ["2"])]),
            ],
        );

        let cells: Vec<String> = table
            .find_all("td")
            .iter()
            .map(Element::text_content)
            .collect();
        assert_eq!(cells, vec!["1", "2"]);
        assert_eq!(table.find_all("tr").len(), 3);
    }

    #[test]
    fn test_parent_links_follow_tree_edits() {
        let body = Element::new("body");
        let main = el("main", Attrs::new(), Vec::<Node>::new());
        let output = el("div", Attrs::new().class("output"), Vec::<Node>::new());
        body.append_child(main.clone());
        main.append_child(output.clone());

        assert!(output.parent().unwrap().ptr_eq(&main));
        assert!(output.root().ptr_eq(&body));
        assert!(output.is_within(&body));

        assert!(main.remove_child(&output));
        assert!(output.parent().is_none());
        assert!(output.root().ptr_eq(&output));
        assert!(!output.is_within(&body));

        main.append_child(output.clone());
        clear(&main);
        assert!(output.parent().is_none());
    }

    #[test]
    fn test_append_moves_element_between_parents() {
        let first = Element::new("ul");
        let second = Element::new("ul");
        let item = el("li", Attrs::new(), ["a"]);

        first.append_child(item.clone());
        second.append_child(item.clone());

        assert_eq!(first.child_count(), 0);
        assert_eq!(second.child_count(), 1);
        assert!(item.parent().unwrap().ptr_eq(&second));
    }

    #[test]
    fn test_removed_child_can_no_longer_be_upgraded() {
        let root = Element::new("main");
        let output = el("div", Attrs::new().class("output"), Vec::<Node>::new());
        root.append_child(output.clone());
        let handle = output.downgrade();
        drop(output);

        let found = root.find_by_class("output").expect("output mounted");
        assert!(root.remove_child(&found));
        drop(found);

        assert!(handle.upgrade().is_none());
        assert!(root.find_by_class("output").is_none());
    }
}
