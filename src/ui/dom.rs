//! In-memory document: a small HTML node tree with id lookup, listeners
//! and chart instances, serializable back to markup.

use std::collections::{BTreeMap, HashSet};

use super::{escape_html, unescape_html, ChartHandle, EventKind, Listener, Ui};
use crate::charts::ChartConfig;
use crate::error::UiError;

type NodeId = usize;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub canvas_id: String,
    pub config: ChartConfig,
}

/// Removed subtrees give their arena slots back to `free` and drop their
/// listeners, so repeated card and fragment swaps do not grow the document.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
    listeners: Vec<(NodeId, EventKind, Listener)>,
    charts: BTreeMap<ChartHandle, ChartInstance>,
    next_chart: u64,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Element { tag: "body".to_string(), attrs: Vec::new() },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            free: Vec::new(),
            root: 0,
            listeners: Vec::new(),
            charts: BTreeMap::new(),
            next_chart: 0,
        }
    }

    /// Document whose body holds the given markup.
    pub fn parse(html: &str) -> Self {
        let mut dom = Self::new();
        let top = dom.parse_fragment(html);
        dom.attach(dom.root, top, false);
        dom
    }

    /// Serialized body content.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in &self.nodes[self.root].children {
            self.write_node(child, &mut out);
        }
        out
    }

    pub fn inner_html(&self, id: &str) -> Result<String, UiError> {
        let node = self.require(id)?;
        let mut out = String::new();
        for &child in &self.nodes[node].children {
            self.write_node(child, &mut out);
        }
        Ok(out)
    }

    /// Concatenated text of the element and its descendants.
    pub fn text_content(&self, id: &str) -> Result<String, UiError> {
        let node = self.require(id)?;
        let mut out = String::new();
        self.collect_text(node, &mut out);
        Ok(out)
    }

    /// Text content of every descendant with the given tag, in document order.
    pub fn texts_by_tag(&self, within: &str, tag: &str) -> Result<Vec<String>, UiError> {
        let node = self.require(within)?;
        let mut found = Vec::new();
        self.walk(node, &mut |n| {
            if self.tag(n) == Some(tag) {
                found.push(n);
            }
        });
        Ok(found
            .into_iter()
            .filter(|&n| n != node)
            .map(|n| {
                let mut s = String::new();
                self.collect_text(n, &mut s);
                s
            })
            .collect())
    }

    /// Ids of the element's direct element children, in order.
    pub fn child_ids(&self, id: &str) -> Result<Vec<String>, UiError> {
        let node = self.require(id)?;
        Ok(self.nodes[node]
            .children
            .iter()
            .filter_map(|&c| self.attr(c, "id").map(str::to_string))
            .collect())
    }

    pub fn live_charts(&self) -> impl Iterator<Item = (&ChartHandle, &ChartInstance)> {
        self.charts.iter()
    }

    pub fn chart_for_canvas(&self, canvas_id: &str) -> Vec<&ChartInstance> {
        self.charts.values().filter(|c| c.canvas_id == canvas_id).collect()
    }

    // -------------------------------------------------------------------------
    // tree plumbing
    // -------------------------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let node = Node { kind, parent: None, children: Vec::new() };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node].kind {
            NodeKind::Element { attrs, .. } => {
                attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
            }
            NodeKind::Text(_) => None,
        }
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: Option<String>) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[node].kind {
            attrs.retain(|(k, _)| k != name);
            if let Some(v) = value {
                attrs.push((name.to_string(), v));
            }
        }
    }

    fn walk(&self, node: NodeId, f: &mut dyn FnMut(NodeId)) {
        f(node);
        for &child in &self.nodes[node].children {
            self.walk(child, f);
        }
    }

    fn find(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(n) = stack.pop() {
            if self.attr(n, "id") == Some(id) {
                return Some(n);
            }
            stack.extend(self.nodes[n].children.iter().rev());
        }
        None
    }

    fn require(&self, id: &str) -> Result<NodeId, UiError> {
        self.find(id).ok_or_else(|| UiError::MissingElement(id.to_string()))
    }

    /// Remove every child subtree, releasing its slots and listeners.
    fn detach_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node].children);
        let mut removed = HashSet::new();
        for child in children {
            self.walk(child, &mut |n| {
                removed.insert(n);
            });
        }
        self.listeners.retain(|(n, _, _)| !removed.contains(n));
        for n in removed {
            self.nodes[n] = Node { kind: NodeKind::Text(String::new()), parent: None, children: Vec::new() };
            self.free.push(n);
        }
    }

    fn attach(&mut self, parent: NodeId, nodes: Vec<NodeId>, front: bool) {
        for &n in &nodes {
            self.nodes[n].parent = Some(parent);
        }
        let children = &mut self.nodes[parent].children;
        if front {
            children.splice(0..0, nodes);
        } else {
            children.extend(nodes);
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node].kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element { tag, .. } if RAW_TEXT_TAGS.contains(&tag.as_str()) => {}
            NodeKind::Element { .. } => {
                for &child in &self.nodes[node].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node].kind {
            NodeKind::Text(t) => out.push_str(&escape_html(t)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    if !v.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_html(v));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                let raw = RAW_TEXT_TAGS.contains(&tag.as_str());
                for &child in &self.nodes[node].children {
                    match &self.nodes[child].kind {
                        NodeKind::Text(t) if raw => out.push_str(t),
                        _ => self.write_node(child, out),
                    }
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        self.attr(node, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn set_classes(&mut self, node: NodeId, classes: Vec<String>) {
        let value = if classes.is_empty() { None } else { Some(classes.join(" ")) };
        self.set_attr(node, "class", value);
    }

    // -------------------------------------------------------------------------
    // fragment parser
    // -------------------------------------------------------------------------

    /// Parse markup into detached nodes; returns the top-level ones.
    fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let bytes = html.as_bytes();
        let mut top = Vec::new();
        let mut open: Vec<NodeId> = Vec::new();
        let mut pos = 0;

        while pos < html.len() {
            let rest = &html[pos..];
            if rest.starts_with("<!--") {
                pos = rest.find("-->").map(|e| pos + e + 3).unwrap_or(html.len());
                continue;
            }
            if rest.starts_with("</") {
                let end = rest.find('>').map(|e| pos + e + 1).unwrap_or(html.len());
                let name = rest[2..].split('>').next().unwrap_or("").trim().to_ascii_lowercase();
                if let Some(depth) = open.iter().rposition(|&n| self.tag(n) == Some(name.as_str())) {
                    open.truncate(depth);
                }
                pos = end;
                continue;
            }
            if rest.starts_with("<!") {
                pos = rest.find('>').map(|e| pos + e + 1).unwrap_or(html.len());
                continue;
            }
            if bytes[pos] == b'<' && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_alphabetic()) {
                let end = tag_end(html, pos);
                let (tag, attrs, self_closing) = parse_tag(&html[pos + 1..end]);
                let node = self.push(NodeKind::Element { tag: tag.clone(), attrs });
                self.adopt(&open, &mut top, node);
                pos = (end + 1).min(html.len());

                if RAW_TEXT_TAGS.contains(&tag.as_str()) {
                    let close = format!("</{}", tag);
                    let body_end = html[pos..]
                        .to_ascii_lowercase()
                        .find(&close)
                        .map(|e| pos + e)
                        .unwrap_or(html.len());
                    if body_end > pos {
                        let text = self.push(NodeKind::Text(html[pos..body_end].to_string()));
                        self.attach(node, vec![text], false);
                    }
                    pos = html[body_end..].find('>').map(|e| body_end + e + 1).unwrap_or(html.len());
                } else if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                    open.push(node);
                }
                continue;
            }

            // a stray '<' that opens no tag is plain text
            let from = if bytes[pos] == b'<' { pos + 1 } else { pos };
            let next = html[from..].find('<').map(|e| from + e).unwrap_or(html.len());
            let text = self.push(NodeKind::Text(unescape_html(&html[pos..next])));
            self.adopt(&open, &mut top, text);
            pos = next;
        }
        top
    }

    fn adopt(&mut self, open: &[NodeId], top: &mut Vec<NodeId>, node: NodeId) {
        match open.last() {
            Some(&parent) => self.attach(parent, vec![node], false),
            None => top.push(node),
        }
    }

    fn insert_fragment(&mut self, id: &str, html: &str, mode: Insert) -> Result<(), UiError> {
        let node = self.require(id)?;
        let parsed = self.parse_fragment(html);
        match mode {
            Insert::Replace => {
                self.detach_children(node);
                self.attach(node, parsed, false);
            }
            Insert::Append => self.attach(node, parsed, false),
            Insert::Prepend => self.attach(node, parsed, true),
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Insert {
    Replace,
    Append,
    Prepend,
}

/// Index of the `>` closing the tag opened at `start`, honoring quotes.
fn tag_end(html: &str, start: usize) -> usize {
    let mut quote: Option<u8> = None;
    for (i, &b) in html.as_bytes().iter().enumerate().skip(start + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return i,
            None => {}
        }
    }
    html.len()
}

fn parse_tag(body: &str) -> (String, Vec<(String, String)>, bool) {
    let body = body.trim_end();
    let self_closing = body.ends_with('/');
    let body = body.trim_end_matches('/');
    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let tag = body[..name_end].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let chars: Vec<char> = body[name_end..].chars().collect();
    let mut i = 0;
    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' {
            i += 1;
        }
        if start == i {
            break;
        }
        let name: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if i < chars.len() && chars[i] == '=' {
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                let q = chars[i];
                i += 1;
                let vstart = i;
                while i < chars.len() && chars[i] != q {
                    i += 1;
                }
                value = chars[vstart..i].iter().collect();
                i += 1;
            } else {
                let vstart = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                value = chars[vstart..i].iter().collect();
            }
            value = unescape_html(&value);
        }
        attrs.push((name, value));
    }
    (tag, attrs, self_closing)
}

fn without_display(style: &str) -> Vec<String> {
    style
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter(|d| !d.replace(' ', "").starts_with("display:"))
        .map(str::to_string)
        .collect()
}

impl Ui for MemoryDom {
    fn exists(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    fn set_html(&mut self, id: &str, html: &str) -> Result<(), UiError> {
        self.insert_fragment(id, html, Insert::Replace)
    }

    fn append_html(&mut self, id: &str, html: &str) -> Result<(), UiError> {
        self.insert_fragment(id, html, Insert::Append)
    }

    fn prepend_html(&mut self, id: &str, html: &str) -> Result<(), UiError> {
        self.insert_fragment(id, html, Insert::Prepend)
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), UiError> {
        let node = self.require(id)?;
        self.detach_children(node);
        let text = self.push(NodeKind::Text(text.to_string()));
        self.attach(node, vec![text], false);
        Ok(())
    }

    fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), UiError> {
        let node = self.require(id)?;
        let mut decls = without_display(self.attr(node, "style").unwrap_or(""));
        if !visible {
            decls.push("display: none".to_string());
        }
        let value = if decls.is_empty() { None } else { Some(decls.join("; ")) };
        self.set_attr(node, "style", value);
        Ok(())
    }

    fn is_visible(&self, id: &str) -> Result<bool, UiError> {
        let node = self.require(id)?;
        let style = self.attr(node, "style").unwrap_or("");
        Ok(!style
            .split(';')
            .any(|d| d.replace(' ', "").eq_ignore_ascii_case("display:none")))
    }

    fn has_class(&self, id: &str, class: &str) -> Result<bool, UiError> {
        let node = self.require(id)?;
        Ok(self.classes(node).iter().any(|c| c == class))
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<(), UiError> {
        let node = self.require(id)?;
        let mut classes = self.classes(node);
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        self.set_classes(node, classes);
        Ok(())
    }

    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), UiError> {
        let node = self.require(id)?;
        let mut classes = self.classes(node);
        classes.retain(|c| c != class);
        self.set_classes(node, classes);
        Ok(())
    }

    fn value(&self, id: &str) -> Result<Option<String>, UiError> {
        let node = self.require(id)?;
        Ok(self.attr(node, "value").map(str::to_string))
    }

    fn set_value(&mut self, id: &str, value: &str) -> Result<(), UiError> {
        let node = self.require(id)?;
        self.set_attr(node, "value", Some(value.to_string()));
        Ok(())
    }

    fn is_checked(&self, id: &str) -> Result<bool, UiError> {
        let node = self.require(id)?;
        Ok(self.attr(node, "checked").is_some())
    }

    fn set_checked(&mut self, id: &str, checked: bool) -> Result<(), UiError> {
        let node = self.require(id)?;
        if checked && self.attr(node, "type") == Some("radio") {
            // radios sharing a name are mutually exclusive
            if let Some(group) = self.attr(node, "name").map(str::to_string) {
                let mut peers = Vec::new();
                self.walk(self.root, &mut |n| {
                    if self.attr(n, "type") == Some("radio") && self.attr(n, "name") == Some(group.as_str()) {
                        peers.push(n);
                    }
                });
                for peer in peers {
                    self.set_attr(peer, "checked", None);
                }
            }
        }
        self.set_attr(node, "checked", checked.then(String::new));
        Ok(())
    }

    fn listen(&mut self, id: &str, event: EventKind, listener: Listener) -> Result<bool, UiError> {
        let node = self.require(id)?;
        let entry = (node, event, listener);
        if self.listeners.contains(&entry) {
            return Ok(false);
        }
        self.listeners.push(entry);
        Ok(true)
    }

    fn listeners(&self, id: &str, event: EventKind) -> Vec<Listener> {
        let Some(node) = self.find(id) else {
            return Vec::new();
        };
        self.listeners
            .iter()
            .filter(|(n, e, _)| *n == node && *e == event)
            .map(|(_, _, l)| *l)
            .collect()
    }

    fn create_chart(&mut self, canvas_id: &str, config: ChartConfig) -> Result<ChartHandle, UiError> {
        self.require(canvas_id)?;
        let handle = ChartHandle(self.next_chart);
        self.next_chart += 1;
        self.charts.insert(handle, ChartInstance { canvas_id: canvas_id.to_string(), config });
        Ok(handle)
    }

    fn destroy_chart(&mut self, handle: ChartHandle) -> Result<(), UiError> {
        self.charts
            .remove(&handle)
            .map(|_| ())
            .ok_or(UiError::UnknownChart(handle.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let dom = MemoryDom::parse(r#"<div id="a" class="x y"><p>hi <b>there</b></p><br><input id="i" value="5"/></div>"#);
        assert_eq!(
            dom.to_html(),
            r#"<div id="a" class="x y"><p>hi <b>there</b></p><br><input id="i" value="5"></div>"#
        );
        assert_eq!(dom.text_content("a").unwrap(), "hi there");
        assert_eq!(dom.value("i").unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn test_quoted_gt_and_comments() {
        let dom = MemoryDom::parse(r#"<!-- note --><span id="s" title="a > b">ok</span>"#);
        assert_eq!(dom.text_content("s").unwrap(), "ok");
    }

    #[test]
    fn test_set_html_detaches_old_children() {
        let mut dom = MemoryDom::parse(r#"<div id="c"><span id="old"></span></div>"#);
        dom.set_html("c", r#"<em id="new">n</em>"#).unwrap();
        assert!(!dom.exists("old"));
        assert!(dom.exists("new"));
    }

    #[test]
    fn test_prepend_orders_front() {
        let mut dom = MemoryDom::parse(r#"<div id="c"></div>"#);
        dom.prepend_html("c", r#"<div id="one"></div>"#).unwrap();
        dom.prepend_html("c", r#"<div id="two"></div>"#).unwrap();
        assert_eq!(dom.child_ids("c").unwrap(), vec!["two", "one"]);
    }

    #[test]
    fn test_visibility_and_classes() {
        let mut dom = MemoryDom::parse(r#"<div id="p" style="color: red; display: none"></div>"#);
        assert!(!dom.is_visible("p").unwrap());
        dom.set_visible("p", true).unwrap();
        assert!(dom.is_visible("p").unwrap());
        assert!(dom.to_html().contains(r#"style="color: red""#));

        dom.add_class("p", "show").unwrap();
        dom.add_class("p", "show").unwrap();
        assert!(dom.has_class("p", "show").unwrap());
        dom.remove_class("p", "show").unwrap();
        assert!(!dom.has_class("p", "show").unwrap());
    }

    #[test]
    fn test_radio_group_exclusive() {
        let mut dom = MemoryDom::parse(
            r#"<input type="radio" name="k" id="a" checked><input type="radio" name="k" id="b">"#,
        );
        dom.set_checked("b", true).unwrap();
        assert!(!dom.is_checked("a").unwrap());
        assert!(dom.is_checked("b").unwrap());
    }

    #[test]
    fn test_listen_dedupes() {
        let mut dom = MemoryDom::parse(r#"<button id="t"></button>"#);
        assert!(dom.listen("t", EventKind::Click, Listener::ToggleInfoBox).unwrap());
        assert!(!dom.listen("t", EventKind::Click, Listener::ToggleInfoBox).unwrap());
        assert_eq!(dom.listeners("t", EventKind::Click).len(), 1);
        assert!(dom.listen("missing", EventKind::Click, Listener::ToggleInfoBox).is_err());
    }

    #[test]
    fn test_replaced_subtrees_release_slots_and_listeners() {
        let mut dom = MemoryDom::parse(r#"<div id="c"></div>"#);
        let fragment = r#"<button id="t">Show</button><div id="p"><p>a</p><p>b</p></div>"#;
        dom.set_html("c", fragment).unwrap();
        dom.listen("t", EventKind::Click, Listener::ToggleInfoBox).unwrap();
        let arena = dom.nodes.len();

        for _ in 0..5 {
            dom.set_html("c", fragment).unwrap();
            dom.listen("t", EventKind::Click, Listener::ToggleInfoBox).unwrap();
        }
        assert_eq!(dom.listeners.len(), 1);
        assert!(dom.nodes.len() <= arena + 8, "arena grew to {}", dom.nodes.len());
        assert_eq!(dom.texts_by_tag("p", "p").unwrap(), vec!["a", "b"]);
        assert_eq!(dom.listeners("t", EventKind::Click), vec![Listener::ToggleInfoBox]);
    }

    #[test]
    fn test_text_and_values_round_trip_unescaped() {
        let mut dom = MemoryDom::parse(r#"<p id="p">R&amp;D &lt;1&gt;</p><input id="x" value="a&amp;b">"#);
        assert_eq!(dom.text_content("p").unwrap(), "R&D <1>");
        assert_eq!(dom.value("x").unwrap().as_deref(), Some("a&b"));

        dom.set_value("x", "c&d").unwrap();
        dom.set_text("p", "<b>&").unwrap();
        assert_eq!(dom.value("x").unwrap().as_deref(), Some("c&d"));
        assert_eq!(dom.text_content("p").unwrap(), "<b>&");
        assert_eq!(dom.to_html(), r#"<p id="p">&lt;b&gt;&amp;</p><input id="x" value="c&amp;d">"#);
    }

    #[test]
    fn test_script_body_kept_raw() {
        let dom = MemoryDom::parse(r#"<script>if (a < b) { x(); }</script><p id="p">t</p>"#);
        assert!(dom.to_html().starts_with("<script>if (a < b) { x(); }</script>"));
        assert!(dom.exists("p"));
    }

    #[test]
    fn test_texts_by_tag_in_order() {
        let dom = MemoryDom::parse(r#"<table id="t"><tr><td>1</td></tr><tr><td>2</td></tr></table>"#);
        assert_eq!(dom.texts_by_tag("t", "tr").unwrap(), vec!["1", "2"]);
    }
}
