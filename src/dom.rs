use std::collections::HashMap;

use crate::selector::{matches_selector_list, parse_selector_list};
use crate::Result;

/// Handle into the page's node arena. Stable for the lifetime of the page,
/// even after the node is detached from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) required: bool,
    pub(crate) custom_validity_message: String,
}

pub(crate) fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| {
            value
                .split_whitespace()
                .filter(|token| !token.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

pub(crate) fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), classes.join(" "));
    }
}

pub(crate) fn has_class_token(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// Arena-backed document tree with the form-control state the page's
/// interaction layer reads and writes.
#[derive(Debug, Clone)]
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, Vec<NodeId>>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    fn push_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let required = attrs.contains_key("required");
        let element = Element {
            tag_name,
            attrs,
            value,
            checked,
            disabled,
            required,
            custom_validity_message: String::new(),
        };
        let id = self.push_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.entry(id_attr).or_default().push(id);
        }
        id
    }

    pub(crate) fn create_detached_element(&mut self, tag_name: &str) -> NodeId {
        let element = Element {
            tag_name: tag_name.to_string(),
            attrs: HashMap::new(),
            value: String::new(),
            checked: false,
            disabled: false,
            required: false,
            custom_validity_message: String::new(),
        };
        self.push_node(None, NodeType::Element(element))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.push_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0)?.parent
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.nodes
            .get(node_id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn is_attached(&self, node_id: NodeId) -> bool {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if node == self.root {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.tag_name.as_str())
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name))
            .map(String::as_str)
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) {
        if name == "id" {
            if let Some(old) = self.attr(node_id, "id").map(ToOwned::to_owned) {
                if let Some(ids) = self.id_index.get_mut(&old) {
                    ids.retain(|id| *id != node_id);
                }
            }
            self.id_index
                .entry(value.to_string())
                .or_default()
                .push(node_id);
        }
        if let Some(element) = self.element_mut(node_id) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub(crate) fn value(&self, node_id: NodeId) -> String {
        self.element(node_id)
            .map(|element| element.value.clone())
            .unwrap_or_default()
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) {
        if let Some(element) = self.element_mut(node_id) {
            element.value = value.to_string();
        }
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> bool {
        self.element(node_id)
            .map(|element| element.checked)
            .unwrap_or(false)
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) {
        if let Some(element) = self.element_mut(node_id) {
            element.checked = checked;
        }
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id)
            .map(|element| element.disabled)
            .unwrap_or(false)
    }

    pub(crate) fn set_disabled(&mut self, node_id: NodeId, disabled: bool) {
        if let Some(element) = self.element_mut(node_id) {
            element.disabled = disabled;
            if disabled {
                element.attrs.insert("disabled".to_string(), String::new());
            } else {
                element.attrs.remove("disabled");
            }
        }
    }

    pub(crate) fn required(&self, node_id: NodeId) -> bool {
        self.element(node_id)
            .map(|element| element.required)
            .unwrap_or(false)
    }

    pub(crate) fn custom_validity(&self, node_id: NodeId) -> &str {
        self.element(node_id)
            .map(|element| element.custom_validity_message.as_str())
            .unwrap_or("")
    }

    pub(crate) fn set_custom_validity(&mut self, node_id: NodeId, message: &str) {
        if let Some(element) = self.element_mut(node_id) {
            element.custom_validity_message = message.to_string();
        }
    }

    /// Lowercased `type` attribute, defaulting to `text` for inputs.
    pub(crate) fn input_type(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return String::new();
        };
        if let Some(kind) = element.attrs.get("type") {
            return kind.to_ascii_lowercase();
        }
        if element.tag_name.eq_ignore_ascii_case("input") {
            "text".to_string()
        } else {
            String::new()
        }
    }

    pub(crate) fn has_class(&self, node_id: NodeId, class_name: &str) -> bool {
        self.element(node_id)
            .map(|element| has_class_token(element, class_name))
            .unwrap_or(false)
    }

    pub(crate) fn add_class(&mut self, node_id: NodeId, class_name: &str) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|c| c == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
    }

    pub(crate) fn remove_class(&mut self, node_id: NodeId, class_name: &str) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|c| c != class_name);
        set_class_attr(element, &classes);
    }

    pub(crate) fn toggle_class(&mut self, node_id: NodeId, class_name: &str, on: bool) {
        if on {
            self.add_class(node_id, class_name);
        } else {
            self.remove_class(node_id, class_name);
        }
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node_id, &mut out);
        out
    }

    fn collect_text(&self, node_id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(node_id.0) else {
            return;
        };
        if let NodeType::Text(text) = &node.node_type {
            out.push_str(text);
        }
        for child in node.children.clone() {
            self.collect_text(child, out);
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) {
        let children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub(crate) fn insert_first_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    pub(crate) fn remove_node(&mut self, node_id: NodeId) {
        self.detach(node_id);
    }

    fn detach(&mut self, node_id: NodeId) {
        if let Some(parent) = self.nodes[node_id.0].parent.take() {
            self.nodes[parent.0].children.retain(|id| *id != node_id);
        }
    }

    /// Inline-style property access. The runtime keeps the `style` attribute
    /// as the single source of truth, the way it keeps classes.
    pub(crate) fn style_get(&self, node_id: NodeId, prop: &str) -> Option<String> {
        let style = self.attr(node_id, "style")?;
        for decl in style.split(';') {
            let mut parts = decl.splitn(2, ':');
            let name = parts.next()?.trim();
            if name.eq_ignore_ascii_case(prop) {
                return Some(parts.next().unwrap_or("").trim().to_string());
            }
        }
        None
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, prop: &str, value: &str) {
        let mut decls: Vec<(String, String)> = self
            .attr(node_id, "style")
            .map(|style| {
                style
                    .split(';')
                    .filter_map(|decl| {
                        let mut parts = decl.splitn(2, ':');
                        let name = parts.next()?.trim();
                        if name.is_empty() {
                            return None;
                        }
                        Some((
                            name.to_string(),
                            parts.next().unwrap_or("").trim().to_string(),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        decls.retain(|(name, _)| !name.eq_ignore_ascii_case(prop));
        if !value.is_empty() {
            decls.push((prop.to_string(), value.to_string()));
        }

        if decls.is_empty() {
            if let Some(element) = self.element_mut(node_id) {
                element.attrs.remove("style");
            }
        } else {
            let rendered = decls
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_attr(node_id, "style", &rendered);
        }
    }

    pub(crate) fn is_display_hidden(&self, node_id: NodeId) -> bool {
        self.style_get(node_id, "display")
            .map(|value| value == "none")
            .unwrap_or(false)
    }

    pub(crate) fn is_form_control(&self, node_id: NodeId) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        element.tag_name.eq_ignore_ascii_case("input")
            || element.tag_name.eq_ignore_ascii_case("select")
            || element.tag_name.eq_ignore_ascii_case("textarea")
    }

    pub(crate) fn is_checkbox_input(&self, node_id: NodeId) -> bool {
        self.is_input_of_type(node_id, "checkbox")
    }

    pub(crate) fn is_radio_input(&self, node_id: NodeId) -> bool {
        self.is_input_of_type(node_id, "radio")
    }

    fn is_input_of_type(&self, node_id: NodeId, kind: &str) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        if !element.tag_name.eq_ignore_ascii_case("input") {
            return false;
        }
        element
            .attrs
            .get("type")
            .map(|t| t.eq_ignore_ascii_case(kind))
            .unwrap_or(false)
    }

    pub(crate) fn is_submit_control(&self, node_id: NodeId) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        if element.tag_name.eq_ignore_ascii_case("button") {
            return element
                .attrs
                .get("type")
                .map(|kind| kind.eq_ignore_ascii_case("submit"))
                .unwrap_or(true);
        }
        if element.tag_name.eq_ignore_ascii_case("input") {
            return element
                .attrs
                .get("type")
                .map(|kind| kind.eq_ignore_ascii_case("submit"))
                .unwrap_or(false);
        }
        false
    }

    pub(crate) fn radios_in_group(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .filter(|id| {
                self.is_radio_input(*id) && self.attr(*id, "name").map(|n| n == name).unwrap_or(false)
            })
            .collect()
    }

    /// Built-in constraint validity: custom validity message empty and, for
    /// required controls, a value present (checked member for radio groups).
    pub(crate) fn control_validity_ok(&self, node_id: NodeId) -> bool {
        let Some(element) = self.element(node_id) else {
            return true;
        };
        if !element.custom_validity_message.is_empty() {
            return false;
        }
        if !element.required || element.disabled {
            return true;
        }
        if self.is_checkbox_input(node_id) {
            return element.checked;
        }
        if self.is_radio_input(node_id) {
            let scope = self
                .closest_tag(node_id, "form")
                .unwrap_or(self.root);
            let Some(name) = element.attrs.get("name") else {
                return element.checked;
            };
            return self
                .radios_in_group(scope, name)
                .iter()
                .any(|radio| self.checked(*radio));
        }
        !element.value.trim().is_empty()
    }

    pub(crate) fn form_check_validity(&self, form: NodeId) -> bool {
        self.descendant_elements(form)
            .into_iter()
            .filter(|id| self.is_form_control(*id))
            .all(|id| self.control_validity_ok(id))
    }

    pub(crate) fn first_invalid_control(&self, form: NodeId) -> Option<NodeId> {
        self.descendant_elements(form)
            .into_iter()
            .filter(|id| self.is_form_control(*id))
            .find(|id| !self.control_validity_ok(*id))
    }

    pub(crate) fn closest_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if self
                .tag_name(node)
                .map(|t| t.eq_ignore_ascii_case(tag))
                .unwrap_or(false)
            {
                return Some(node);
            }
            cursor = self.parent(node);
        }
        None
    }

    pub(crate) fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let groups = parse_selector_list(selector)?;
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if self.element(node).is_some() && matches_selector_list(self, node, &groups) {
                return Ok(Some(node));
            }
            cursor = self.parent(node);
        }
        Ok(None)
    }

    /// All attached element nodes in document order.
    pub(crate) fn document_elements(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root)
    }

    pub(crate) fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.children(scope).to_vec();
        stack.reverse();
        while let Some(node) = stack.pop() {
            if self.element(node).is_some() {
                out.push(node);
            }
            let mut children = self.children(node).to_vec();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_list(selector)?;
        if let Some(id) = crate::selector::id_only_of_list(&groups) {
            if let Some(candidates) = self.id_index.get(id) {
                return Ok(candidates
                    .iter()
                    .copied()
                    .filter(|node| self.is_attached(*node))
                    .collect());
            }
            return Ok(Vec::new());
        }
        Ok(self
            .document_elements()
            .into_iter()
            .filter(|node| matches_selector_list(self, *node, &groups))
            .collect())
    }

    pub(crate) fn matches(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        let groups = parse_selector_list(selector)?;
        Ok(matches_selector_list(self, node_id, &groups))
    }

    /// Name/value pairs a native submission of `form` would carry.
    pub(crate) fn submission_pairs(&self, form: NodeId) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for control in self.descendant_elements(form) {
            if !self.is_form_control(control) || self.disabled(control) {
                continue;
            }
            let Some(name) = self.attr(control, "name") else {
                continue;
            };
            if self.is_checkbox_input(control) || self.is_radio_input(control) {
                if !self.checked(control) {
                    continue;
                }
                let value = self.attr(control, "value").unwrap_or("on").to_string();
                pairs.push((name.to_string(), value));
            } else {
                pairs.push((name.to_string(), self.value(control)));
            }
        }
        pairs
    }

    /// Short serialized form of a node for assertion messages.
    pub(crate) fn snippet(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return "<non-element>".to_string();
        };
        let mut out = format!("<{}", element.tag_name);
        let mut attrs: Vec<_> = element.attrs.iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in attrs {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        let text = self.text_content(node_id);
        let text = text.trim();
        if !text.is_empty() {
            let mut shortened = text.chars().take(40).collect::<String>();
            if shortened.len() < text.len() {
                shortened.push('…');
            }
            out.push_str(shortened.as_str());
        }
        out.push_str(&format!("</{}>", element.tag_name));
        out
    }
}
