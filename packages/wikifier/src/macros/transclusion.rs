//! Macros that render other tiddlers inside the current one.

use super::{button, Macro, ParamSpec};
use crate::errors::MacroResult;
use crate::node::Node;
use crate::wikifier::Wikifier;

/// `<<tiddler Title>>`
pub struct TiddlerMacro;

impl Macro for TiddlerMacro {
    fn name(&self) -> &'static str {
        "tiddler"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(1, 1)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let title = params[0].as_str();
        let mut children = Vec::new();
        if let Some(text) = w.context().store.text_of(title) {
            w.transclude(title, text, &mut children)?;
        }
        output.push(
            Node::element("span")
                .with_attr("refresh", "content")
                .with_attr("tiddler", title)
                .with_children(children),
        );
        Ok(())
    }
}

/// `<<slider chkOption Title label [tooltip]>>`: a button toggling a panel
/// with the tiddler's content; open when the option is `true`
pub struct Slider;

impl Macro for Slider {
    fn name(&self) -> &'static str {
        "slider"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(3, 4)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let (option, title, label) = (&params[0], &params[1], &params[2]);
        let tooltip = params.get(3).map_or("", String::as_str);
        let ctx = w.context();

        let mut content = Vec::new();
        if let Some(text) = ctx.store.text_of(title) {
            w.transclude(title, text, &mut content)?;
        }

        output.push(button(label, tooltip).with_class("sliderButton"));
        output.push(
            Node::element("div")
                .with_class("sliderPanel")
                .with_attr("cookie", option.as_str())
                .with_attr("refresh", "content")
                .with_attr("tiddler", title.as_str())
                .with_style("display", if ctx.options.flag(option) { "block" } else { "none" })
                .with_children(content),
        );
        Ok(())
    }
}

/// `<<tabs txtOption label tooltip Title ...>>`: the option names the
/// selected tab; an unknown or missing value selects the first
pub struct Tabs;

impl Macro for Tabs {
    fn name(&self) -> &'static str {
        "tabs"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::at_least(4)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let option = params[0].as_str();
        let tabs: Vec<&[String]> = params[1..].chunks_exact(3).collect();
        let ctx = w.context();

        let selected = ctx
            .options
            .get(option)
            .filter(|value| tabs.iter().any(|tab| tab[0] == *value))
            .unwrap_or(tabs[0][0].as_str());

        let mut tabset = Node::element("div").with_class("tabset").with_attr("cookie", option);
        let mut selected_title = None;
        for tab in &tabs {
            let (label, tooltip, title) = (tab[0].as_str(), tab[1].as_str(), tab[2].as_str());
            let is_selected = label == selected;
            if is_selected {
                selected_title = Some(title);
            }
            tabset = tabset.with_child(
                button(label, tooltip)
                    .with_attr("class", if is_selected { "tab tabSelected" } else { "tab tabUnselected" })
                    .with_attr("tab", label)
                    .with_attr("content", title),
            );
        }

        let mut content = Vec::new();
        if let Some(title) = selected_title {
            if let Some(text) = ctx.store.text_of(title) {
                w.transclude(title, text, &mut content)?;
            }
        }

        output.push(
            Node::element("div")
                .with_class(option)
                .with_child(tabset)
                .with_child(Node::element("div").with_class("tabContents").with_children(content)),
        );
        Ok(())
    }
}
