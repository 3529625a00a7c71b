//! Output tree → HTML string.

use crate::node::Node;

/// Options for HTML serialization
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Put block elements on their own lines
    pub pretty: bool,
    pub indent: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

const BLOCK_ELEMENTS: &[&str] = &[
    "blockquote", "caption", "dd", "div", "dl", "dt", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "li", "ol", "pre", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

struct Context {
    options: HtmlOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn break_line(&mut self) {
        if !self.options.pretty {
            return;
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize nodes as compact HTML
pub fn to_html(nodes: &[Node]) -> String {
    to_html_with(nodes, HtmlOptions::default())
}

pub fn to_html_with(nodes: &[Node], options: HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    for node in nodes {
        write_node(node, &mut ctx);
    }
    ctx.get_output()
}

fn write_node(node: &Node, ctx: &mut Context) {
    match node {
        Node::Text { content } => ctx.add(&escape_text(content)),
        Node::Raw { html } => ctx.add(html),
        Node::Error { message } => {
            ctx.add("<span class=\"error\">");
            ctx.add(&escape_text(message));
            ctx.add("</span>");
        }
        Node::Element {
            tag,
            attributes,
            styles,
            children,
        } => {
            let block = BLOCK_ELEMENTS.contains(&tag.as_str());
            if block {
                ctx.break_line();
            }

            ctx.add("<");
            ctx.add(tag);
            for (key, value) in attributes {
                ctx.add(&format!(" {}=\"{}\"", key, escape_attr(value)));
            }
            if !styles.is_empty() {
                let style: String = styles
                    .iter()
                    .map(|(key, value)| format!("{}:{};", key, value))
                    .collect();
                ctx.add(&format!(" style=\"{}\"", escape_attr(&style)));
            }

            if VOID_ELEMENTS.contains(&tag.as_str()) {
                ctx.add("/>");
                return;
            }
            ctx.add(">");

            ctx.depth += 1;
            for child in children {
                write_node(child, ctx);
            }
            ctx.depth -= 1;

            if block && children.iter().any(|c| c.tag().map_or(false, |t| BLOCK_ELEMENTS.contains(&t))) {
                ctx.break_line();
            }
            ctx.add("</");
            ctx.add(tag);
            ctx.add(">");
        }
    }
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
