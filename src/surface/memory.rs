//! In-memory element tree implementing [`OutputSurface`].
//!
//! Every mutating call is appended to a log, which tests use to check that
//! revalidation only touches what changed.
use std::{fmt::Write as _, rc::Rc};

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    runtime::value::Value,
    surface::{ElementId, OutputSurface, SlotContent, SlotId, SlotKind, SlotOptions, SurfaceError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("invalid tag name `{0}`")]
    InvalidTagName(String),
    #[error("close_element called with no open element")]
    UnbalancedClose,
    #[error("element {0} does not exist or was removed")]
    UnknownElement(u32),
    #[error("slot {0} does not exist or was removed")]
    UnknownSlot(u32),
    #[error("exit_slot called outside of a slot")]
    NotInSlot,
}

#[derive(Debug, Clone)]
struct Attribute {
    value: String,
    namespace: Option<Rc<str>>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element {
        tag: Rc<str>,
        attrs: IndexMap<Rc<str>, Attribute>,
        props: IndexMap<Rc<str>, Value>,
    },
    Text(String),
    Comment(String),
    Html(String),
    Slot(SlotOptions),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    children: Vec<usize>,
    parent: Option<usize>,
    live: bool,
}

const ROOT: usize = 0;

#[derive(Debug, Clone)]
pub struct MemorySurface {
    nodes: Vec<Node>,
    /// Containers receiving appended nodes; the last one is current.
    cursor: Vec<usize>,
    log: Vec<String>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                children: Vec::new(),
                parent: None,
                live: true,
            }],
            cursor: vec![ROOT],
            log: Vec::new(),
        }
    }

    /// Mutations applied so far, oldest first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn mutation_count(&self) -> usize {
        self.log.len()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Serializes the live tree. Slots are transparent and properties are
    /// not part of the markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_children(ROOT, &mut out);
        out
    }

    /// First live element with `tag`, in document order.
    pub fn find_element(&self, tag: &str) -> Option<ElementId> {
        self.find_live(ROOT, &|node| {
            matches!(&node.kind, NodeKind::Element { tag: t, .. } if t.as_ref() == tag)
        })
        .map(|index| ElementId(index as u32))
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        match &self.nodes.get(element.0 as usize)?.kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(|attr| attr.value.as_str()),
            _ => None,
        }
    }

    pub fn attribute_namespace(&self, element: ElementId, name: &str) -> Option<&str> {
        match &self.nodes.get(element.0 as usize)?.kind {
            NodeKind::Element { attrs, .. } => attrs.get(name)?.namespace.as_deref(),
            _ => None,
        }
    }

    pub fn property(&self, element: ElementId, name: &str) -> Option<&Value> {
        match &self.nodes.get(element.0 as usize)?.kind {
            NodeKind::Element { props, .. } => props.get(name),
            _ => None,
        }
    }

    pub fn slot_options(&self, slot: SlotId) -> Option<SlotOptions> {
        match self.nodes.get(slot.0 as usize)?.kind {
            NodeKind::Slot(options) => Some(options),
            _ => None,
        }
    }

    /// Live slots in document order.
    pub fn slots(&self) -> Vec<(SlotId, SlotOptions)> {
        let mut out = Vec::new();
        self.collect_slots(ROOT, &mut out);
        out
    }

    fn collect_slots(&self, index: usize, out: &mut Vec<(SlotId, SlotOptions)>) {
        for &child in &self.nodes[index].children {
            if let NodeKind::Slot(options) = self.nodes[child].kind {
                out.push((SlotId(child as u32), options));
            }
            self.collect_slots(child, out);
        }
    }

    fn find_live(&self, index: usize, pred: &dyn Fn(&Node) -> bool) -> Option<usize> {
        self.nodes[index].children.iter().find_map(|&child| {
            if pred(&self.nodes[child]) {
                Some(child)
            } else {
                self.find_live(child, pred)
            }
        })
    }

    fn write_children(&self, index: usize, out: &mut String) {
        for &child in &self.nodes[index].children {
            self.write_node(child, out);
        }
    }

    fn write_node(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        match &node.kind {
            NodeKind::Root | NodeKind::Slot(_) => self.write_children(index, out),
            NodeKind::Element { tag, attrs, .. } => {
                out.push('<');
                out.push_str(tag);
                for (name, attr) in attrs {
                    let _ = write!(out, " {}=\"{}\"", name, escape(&attr.value, true));
                }
                out.push('>');
                self.write_children(index, out);
                let _ = write!(out, "</{}>", tag);
            }
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Comment(value) => {
                let _ = write!(out, "<!--{}-->", value);
            }
            NodeKind::Html(html) => out.push_str(html),
        }
    }

    fn current(&self) -> usize {
        self.cursor.last().copied().unwrap_or(ROOT)
    }

    fn push_node(&mut self, kind: NodeKind) -> usize {
        let parent = self.current();
        let index = self.nodes.len();
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
            parent: Some(parent),
            live: true,
        });
        self.nodes[parent].children.push(index);
        index
    }

    #[allow(clippy::type_complexity)]
    fn element_mut(
        &mut self,
        element: ElementId,
    ) -> Result<(&Rc<str>, &mut IndexMap<Rc<str>, Attribute>, &mut IndexMap<Rc<str>, Value>), DomError>
    {
        match self.nodes.get_mut(element.0 as usize) {
            Some(Node {
                kind: NodeKind::Element { tag, attrs, props },
                live: true,
                ..
            }) => Ok((&*tag, attrs, props)),
            _ => Err(DomError::UnknownElement(element.0)),
        }
    }

    fn slot_index(&self, slot: SlotId) -> Result<usize, DomError> {
        match self.nodes.get(slot.0 as usize) {
            Some(Node {
                kind: NodeKind::Slot(_),
                live: true,
                ..
            }) => Ok(slot.0 as usize),
            _ => Err(DomError::UnknownSlot(slot.0)),
        }
    }

    /// Detaches every child of `index` and marks the detached subtrees dead.
    fn drop_children(&mut self, index: usize) {
        let children = std::mem::take(&mut self.nodes[index].children);
        for child in children {
            self.kill(child);
        }
    }

    fn kill(&mut self, index: usize) {
        self.nodes[index].live = false;
        let children = std::mem::take(&mut self.nodes[index].children);
        for child in children {
            self.kill(child);
        }
    }
}

fn validate_tag(tag: &str) -> Result<(), DomError> {
    let mut chars = tag.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
    if valid {
        Ok(())
    } else {
        Err(DomError::InvalidTagName(tag.to_string()))
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn slot_kind_name(kind: SlotKind) -> &'static str {
    match kind {
        SlotKind::Value => "value",
        SlotKind::Block => "block",
        SlotKind::Yield => "yield",
        SlotKind::Contents => "contents",
    }
}

impl OutputSurface for MemorySurface {
    fn open_element(&mut self, tag: &str) -> Result<ElementId, SurfaceError> {
        validate_tag(tag)?;
        let index = self.push_node(NodeKind::Element {
            tag: Rc::from(tag),
            attrs: IndexMap::new(),
            props: IndexMap::new(),
        });
        self.cursor.push(index);
        self.log.push(format!("open_element <{}>", tag));
        Ok(ElementId(index as u32))
    }

    fn close_element(&mut self) -> Result<(), SurfaceError> {
        let current = self.current();
        if !matches!(self.nodes[current].kind, NodeKind::Element { .. }) {
            return Err(DomError::UnbalancedClose.into());
        }
        self.cursor.pop();
        Ok(())
    }

    fn set_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), SurfaceError> {
        let (tag, attrs, _) = self.element_mut(element)?;
        let entry = format!("set_attribute <{}> {}={:?}", tag, name, value);
        attrs.insert(
            Rc::from(name),
            Attribute {
                value: value.to_string(),
                namespace: None,
            },
        );
        self.log.push(entry);
        Ok(())
    }

    fn set_attribute_ns(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
        namespace: &str,
    ) -> Result<(), SurfaceError> {
        let (tag, attrs, _) = self.element_mut(element)?;
        let entry = format!(
            "set_attribute_ns <{}> {}={:?} ({})",
            tag, name, value, namespace
        );
        attrs.insert(
            Rc::from(name),
            Attribute {
                value: value.to_string(),
                namespace: Some(Rc::from(namespace)),
            },
        );
        self.log.push(entry);
        Ok(())
    }

    fn remove_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<(), SurfaceError> {
        let (tag, attrs, _) = self.element_mut(element)?;
        // An attribute is only removed under the namespace it was set with.
        if !attrs
            .get(name)
            .is_some_and(|attr| attr.namespace.as_deref() == namespace)
        {
            return Ok(());
        }
        let entry = match namespace {
            Some(namespace) => format!("remove_attribute <{}> {} ({})", tag, name, namespace),
            None => format!("remove_attribute <{}> {}", tag, name),
        };
        attrs.shift_remove(name);
        self.log.push(entry);
        Ok(())
    }

    fn set_property(
        &mut self,
        element: ElementId,
        name: &str,
        value: &Value,
    ) -> Result<(), SurfaceError> {
        let (tag, _, props) = self.element_mut(element)?;
        let entry = format!("set_property <{}> {}={}", tag, name, value.to_json());
        props.insert(Rc::from(name), value.clone());
        self.log.push(entry);
        Ok(())
    }

    fn append_text(&mut self, content: &str) -> Result<(), SurfaceError> {
        self.push_node(NodeKind::Text(content.to_string()));
        self.log.push(format!("append_text {:?}", content));
        Ok(())
    }

    fn append_comment(&mut self, value: &str) -> Result<(), SurfaceError> {
        self.push_node(NodeKind::Comment(value.to_string()));
        self.log.push(format!("append_comment {:?}", value));
        Ok(())
    }

    fn append_slot(&mut self, options: SlotOptions) -> Result<SlotId, SurfaceError> {
        let index = self.push_node(NodeKind::Slot(options));
        self.log
            .push(format!("append_slot #{} {}", index, slot_kind_name(options.kind)));
        Ok(SlotId(index as u32))
    }

    fn set_slot_content(
        &mut self,
        slot: SlotId,
        content: SlotContent<'_>,
    ) -> Result<(), SurfaceError> {
        let index = self.slot_index(slot)?;
        self.drop_children(index);
        let (kind, entry) = match content {
            SlotContent::Text(text) => (
                NodeKind::Text(text.to_string()),
                format!("set_slot_content #{} text {:?}", index, text),
            ),
            SlotContent::Html(html) => (
                NodeKind::Html(html.to_string()),
                format!("set_slot_content #{} html {:?}", index, html),
            ),
        };
        let child = self.nodes.len();
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
            parent: Some(index),
            live: true,
        });
        self.nodes[index].children.push(child);
        self.log.push(entry);
        Ok(())
    }

    fn clear_slot(&mut self, slot: SlotId) -> Result<(), SurfaceError> {
        let index = self.slot_index(slot)?;
        self.drop_children(index);
        self.log.push(format!("clear_slot #{}", index));
        Ok(())
    }

    fn enter_slot(&mut self, slot: SlotId) -> Result<(), SurfaceError> {
        let index = self.slot_index(slot)?;
        self.cursor.push(index);
        Ok(())
    }

    fn exit_slot(&mut self) -> Result<(), SurfaceError> {
        let current = self.current();
        if !matches!(self.nodes[current].kind, NodeKind::Slot(_)) {
            return Err(DomError::NotInSlot.into());
        }
        self.cursor.pop();
        Ok(())
    }

    fn remove_slot(&mut self, slot: SlotId) -> Result<(), SurfaceError> {
        let index = self.slot_index(slot)?;
        if let Some(parent) = self.nodes[index].parent {
            self.nodes[parent].children.retain(|&child| child != index);
        }
        self.kill(index);
        self.log.push(format!("remove_slot #{}", index));
        Ok(())
    }
}
