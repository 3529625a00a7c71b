//! Sparklines and gradient panels.

use super::{Macro, ParamSpec};
use crate::errors::{MacroError, MacroResult};
use crate::node::Node;
use crate::wikifier::Wikifier;
use once_cell::sync::Lazy;
use regex::Regex;

static COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#[0-9a-fA-F]{3}|#[0-9a-fA-F]{6}|rgb\(\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*\)|[a-zA-Z]+)$")
        .expect("valid color pattern")
});

static GRADIENT_END: Lazy<Regex> = Lazy::new(|| Regex::new(">>").expect("valid gradient terminator"));

/// `<<sparkline 1 5 3 ...>>`: one tick per value, scaled between min and max
pub struct Sparkline;

impl Macro for Sparkline {
    fn name(&self) -> &'static str {
        "sparkline"
    }

    fn render(&self, _w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let data = params
            .iter()
            .map(|p| {
                p.parse::<i64>()
                    .map_err(|_| MacroError::invalid(p.as_str(), "expected an integer"))
            })
            .collect::<MacroResult<Vec<i64>>>()?;
        if data.is_empty() {
            return Ok(());
        }

        // The scale always includes zero; i128 holds any i64 span times 100
        let min = i128::from(data.iter().copied().min().unwrap_or(0).min(0));
        let max = i128::from(data.iter().copied().max().unwrap_or(0).max(0));
        let range = (max - min).max(1);

        let title = data.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
        let mut line = Node::element("span")
            .with_class("sparkline")
            .with_attr("title", title)
            .with_style("position", "relative")
            .with_style("display", "inline-block")
            .with_style("width", format!("{}px", data.len() * 2))
            .with_style("height", "1em");

        for (index, value) in data.iter().enumerate() {
            let height = (i128::from(*value) - min) * 100 / range;
            line = line.with_child(
                Node::element("span")
                    .with_class("sparktick")
                    .with_style("position", "absolute")
                    .with_style("bottom", "0")
                    .with_style("left", format!("{}px", index * 2))
                    .with_style("width", "2px")
                    .with_style("height", format!("{}%", height)),
            );
        }

        output.push(line);
        Ok(())
    }
}

/// `<<gradient vert|horiz color...>>content>>`: the content after the call,
/// up to the next `>>`, is rendered inside the gradient panel
pub struct Gradient;

impl Macro for Gradient {
    fn name(&self) -> &'static str {
        "gradient"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::at_least(1)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let direction = if params[0] == "vert" { "to bottom" } else { "to right" };
        for color in &params[1..] {
            if !COLOR.is_match(color) {
                return Err(MacroError::invalid(color.as_str(), "not a color"));
            }
        }

        let mut panel = Node::element("div")
            .with_class("gradient")
            .with_style("position", "relative")
            .with_style("overflow", "hidden")
            .with_style("z-index", "0");
        match &params[1..] {
            [] => {}
            [only] => panel.set_style("background-color", only.as_str()),
            colors => panel.set_style(
                "background-image",
                format!("linear-gradient({}, {})", direction, colors.join(", ")),
            ),
        }

        for (name, value) in w.inline_css() {
            panel.set_style(name, value);
        }
        let mut children = Vec::new();
        w.sub_wikify(&mut children, Some(&*GRADIENT_END));
        output.push(panel.with_children(children));
        Ok(())
    }
}
