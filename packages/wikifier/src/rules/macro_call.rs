use super::FormatterRule;
use crate::node::Node;
use crate::params::parse_params;
use crate::wikifier::Wikifier;
use std::ops::Range;
use tracing::warn;

/// `<<name params>>`
pub struct MacroCall;

impl MacroCall {
    pub fn new() -> Self {
        MacroCall
    }
}

/// Split `<<name params>>` at `start`, returning name, raw params and the end
/// offset. Params run to the first `>>`.
fn parse_call(source: &str, start: usize) -> Option<(&str, &str, usize)> {
    let body_start = start + 2;
    let body = source.get(body_start..)?;
    let name_len = body
        .find(|c: char| c == '>' || c.is_whitespace())
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = &body[..name_len];
    let close = body[name_len..].find(">>")? + name_len;
    let params = body[name_len..close].trim_start();
    Some((name, params, body_start + close + 2))
}

/// Look up `name` and render it, turning failures into inline error nodes
pub fn invoke_macro(w: &mut Wikifier<'_>, output: &mut Vec<Node>, name: &str, params: &str) {
    let ctx = w.context();
    let Some(handler) = ctx.macros.get(name) else {
        warn!(name, "No such macro");
        output.push(Node::element("span").with_class("errorNoSuchMacro").with_child(Node::error(format!(
            "Error in macro <<{}>>: no such macro",
            name
        ))));
        return;
    };

    let params = parse_params(params);
    let result = handler.params().check(&params).and_then(|_| handler.render(w, output, &params));
    if let Err(e) = result {
        warn!(name, error = %e, tiddler = ?ctx.tiddler, "Macro failed");
        output.push(Node::error(format!("Error in macro <<{}>>: {}", name, e)));
    }
}

impl FormatterRule for MacroCall {
    fn name(&self) -> &'static str {
        "macro"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        let offset = source.get(from..limit)?.find("<<")?;
        let start = from + offset;
        Some(start..start + 2)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some((name, params, end)) = parse_call(w.source(), found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        w.set_position(end);
        invoke_macro(w, output, name, params);
    }
}
