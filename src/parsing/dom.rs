//! Tree helpers over the `markup5ever_rcdom` document produced by html5ever.
//!
//! The rcdom tree keeps weak parent links next to the strong child lists;
//! every mutation helper here keeps the two in sync.

use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{QualName, local_name, namespace_url, ns};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

pub fn serialize_document(dom: &RcDom) -> std::io::Result<String> {
    let document: SerializableHandle = dom.document.clone().into();
    let mut bytes = Vec::new();
    serialize(&mut bytes, &document, SerializeOpts::default())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn element_name(node: &Node) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_element(node: &Node, tag: &str) -> bool {
    element_name(node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

pub fn get_attribute(node: &Node, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

pub fn has_class(node: &Node, class: &str) -> bool {
    get_attribute(node, "class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

pub fn parent(node: &Node) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// All nodes below `root` in document order, `root` excluded.
pub fn descendants(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    // explicit stack: generated pages can nest deeper than the call stack allows
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        stack.extend(node.children.borrow().iter().rev().cloned());
        out.push(node);
    }
    out
}

pub fn find_element_by_id(root: &Handle, id: &str) -> Option<Handle> {
    descendants(root)
        .into_iter()
        .find(|node| get_attribute(node, "id").as_deref() == Some(id))
}

pub fn first_descendant_element(root: &Handle, tag: &str) -> Option<Handle> {
    descendants(root)
        .into_iter()
        .find(|node| is_element(node, tag))
}

/// Concatenated text of every text node below `node`.
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    for node in std::iter::once(node.clone()).chain(descendants(node)) {
        if let NodeData::Text { ref contents } = node.data {
            text.push_str(&contents.borrow());
        }
    }
    text
}

pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

pub fn new_html_element(name: QualName) -> Handle {
    Node::new(NodeData::Element {
        name,
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn new_list() -> Handle {
    new_html_element(QualName::new(None, ns!(html), local_name!("ul")))
}

/// Replaces all children of `node` with a single text node.
pub fn set_text_content(node: &Handle, text: &str) {
    let old_children = std::mem::take(&mut *node.children.borrow_mut());
    for child in old_children {
        child.parent.set(None);
    }
    append_child(node, new_text(text));
}

/// Copies the node itself without its children, like `cloneNode()`.
pub fn shallow_clone(node: &Handle) -> Handle {
    let data = match node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            ref name,
            ref public_id,
            ref system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { ref contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { ref contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            ref name,
            ref attrs,
            ref template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(template_contents.borrow().as_ref().map(deep_clone)),
            mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction {
            ref target,
            ref contents,
        } => NodeData::ProcessingInstruction {
            target: target.clone(),
            contents: contents.clone(),
        },
    };
    Node::new(data)
}

/// Copies the whole subtree, like `cloneNode(true)`. The copy is detached.
pub fn deep_clone(node: &Handle) -> Handle {
    let copy = shallow_clone(node);
    let mut pending = vec![(node.clone(), copy.clone())];
    while let Some((source, target)) = pending.pop() {
        for child in source.children.borrow().iter() {
            let child_copy = shallow_clone(child);
            append_child(&target, child_copy.clone());
            pending.push((child.clone(), child_copy));
        }
    }
    copy
}

/// Removes `node` from its parent, if it has one.
pub fn detach(node: &Handle) {
    if let Some(parent) = parent(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub fn append_text(parent: &Handle, text: &str) {
    append_child(parent, new_text(text));
}

pub fn prepend_text(parent: &Handle, text: &str) {
    let child = new_text(text);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}

/// Puts `replacement` where `old` was. Returns false if `old` is detached.
pub fn replace_node(old: &Handle, replacement: Handle) -> bool {
    let Some(parent) = parent(old) else {
        return false;
    };
    detach(&replacement);
    let mut children = parent.children.borrow_mut();
    let Some(index) = children.iter().position(|child| Rc::ptr_eq(child, old)) else {
        return false;
    };
    replacement.parent.set(Some(Rc::downgrade(&parent)));
    children[index] = replacement;
    old.parent.set(None);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(dom: &RcDom) -> Handle {
        first_descendant_element(&dom.document, "body").unwrap()
    }

    #[test]
    fn test_deeply_nested_document() {
        const DEPTH: usize = 50_000;
        let html = format!(
            "<html><body>{}<span id=\"deep\">3. Leaf</span>{}</body></html>",
            "<div>".repeat(DEPTH),
            "</div>".repeat(DEPTH)
        );
        let dom = parse_html(&html);

        let all = descendants(&dom.document);
        assert!(all.len() > DEPTH);
        let leaf = find_element_by_id(&dom.document, "deep").unwrap();
        assert_eq!(text_content(&dom.document), "3. Leaf");

        let copy = deep_clone(&body(&dom));
        assert_eq!(text_content(&copy), "3. Leaf");
        assert_eq!(descendants(&copy).len(), DEPTH + 2);
        assert_eq!(text_content(&leaf), "3. Leaf");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let dom = parse_html(r#"<div id="a"><p id="b"><em id="c"></em></p><p id="d"></p></div>"#);
        let ids: Vec<String> = descendants(&body(&dom))
            .iter()
            .filter_map(|node| get_attribute(node, "id"))
            .collect();

        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_text_content_flattens_markup() {
        let dom = parse_html(r#"<p id="x">Hello <em>big</em> world<!-- skip --></p>"#);
        let p = find_element_by_id(&dom.document, "x").unwrap();

        assert_eq!(text_content(&p), "Hello big world");
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let dom = parse_html(r#"<a id="l" href="a.html"><span>1.</span> Intro</a>"#);
        let link = find_element_by_id(&dom.document, "l").unwrap();
        let old_span = first_descendant_element(&link, "span").unwrap();

        set_text_content(&link, "√2. Intro");

        assert_eq!(text_content(&link), "√2. Intro");
        assert_eq!(link.children.borrow().len(), 1);
        assert!(parent(&old_span).is_none());
        assert_eq!(get_attribute(&link, "href").as_deref(), Some("a.html"));
    }

    #[test]
    fn test_shallow_and_deep_clone() {
        let dom = parse_html(r#"<ul><li class="toctree-l1" id="u"><a href="u1.html">Unit</a></li></ul>"#);
        let li = find_element_by_id(&dom.document, "u").unwrap();

        let shallow = shallow_clone(&li);
        assert!(shallow.children.borrow().is_empty());
        assert!(has_class(&shallow, "toctree-l1"));
        assert!(parent(&shallow).is_none());

        let deep = deep_clone(&li);
        assert_eq!(text_content(&deep), "Unit");
        let link = first_descendant_element(&deep, "a").unwrap();
        assert!(Rc::ptr_eq(&parent(&link).unwrap(), &deep));

        // the source subtree is untouched
        assert_eq!(li.children.borrow().len(), 1);
    }

    #[test]
    fn test_append_moves_rather_than_duplicates() {
        let dom = parse_html("<div id=a></div><div id=b></div>");
        let a = find_element_by_id(&dom.document, "a").unwrap();
        let b = find_element_by_id(&dom.document, "b").unwrap();
        let text = new_text("moving");

        append_child(&a, text.clone());
        append_child(&b, text.clone());
        append_child(&b, text);

        assert_eq!(text_content(&a), "");
        assert_eq!(text_content(&b), "moving");
    }

    #[test]
    fn test_replace_node_and_serialize() {
        let dom = parse_html(r#"<div id="box"><ul><li>old</li></ul></div>"#);
        let old = first_descendant_element(&body(&dom), "ul").unwrap();
        let list = new_list();
        append_text(&list, "new");
        prepend_text(&list, "brand ");

        assert!(replace_node(&old, list));
        assert!(!replace_node(&old, new_list()));

        let html = serialize_document(&dom).unwrap();
        assert!(html.contains(r#"<div id="box"><ul>brand new</ul></div>"#), "{html}");
    }
}
