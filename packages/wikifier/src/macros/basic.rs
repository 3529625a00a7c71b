//! Macros that render a single control or value.

use super::{button, Macro, ParamSpec};
use crate::errors::{MacroError, MacroResult};
use crate::node::Node;
use crate::wikifier::Wikifier;
use tiddly_store::dates::format_date;

const DEFAULT_TODAY_FORMAT: &str = "DDD MMM DD hh:0mm:0ss YYYY";
const DEFAULT_JOURNAL_FORMAT: &str = "DD MMM YYYY";

/// `<<today [format]>>`
pub struct Today;

impl Macro for Today {
    fn name(&self) -> &'static str {
        "today"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(0, 1)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let template = params.first().map_or(DEFAULT_TODAY_FORMAT, String::as_str);
        let text = format_date(&w.context().now, template);
        output.push(Node::element("span").with_child(Node::text(text)));
        Ok(())
    }
}

/// `<<version>>`
pub struct Version;

impl Macro for Version {
    fn name(&self) -> &'static str {
        "version"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::NONE
    }

    fn render(&self, _w: &mut Wikifier<'_>, output: &mut Vec<Node>, _params: &[String]) -> MacroResult<()> {
        output.push(
            Node::element("span")
                .with_class("version")
                .with_child(Node::text(env!("CARGO_PKG_VERSION"))),
        );
        Ok(())
    }
}

/// `<<search [default]>>`
pub struct Search;

impl Macro for Search {
    fn name(&self) -> &'static str {
        "search"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(0, 1)
    }

    fn render(&self, _w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let value = params.first().map_or("", String::as_str);
        output.push(
            Node::element("span")
                .with_class("searchBox")
                .with_child(button("search", "Search this TiddlyWiki").with_class("searchButton"))
                .with_child(
                    Node::element("input")
                        .with_class("searchField")
                        .with_attr("type", "text")
                        .with_attr("size", "15")
                        .with_attr("value", value),
                ),
        );
        Ok(())
    }
}

/// Toolbar buttons that only carry a command for the host
pub struct CommandButton {
    name: &'static str,
    label: &'static str,
    tooltip: &'static str,
}

impl CommandButton {
    pub fn close_all() -> Self {
        Self {
            name: "closeAll",
            label: "close all",
            tooltip: "Close all displayed tiddlers (except any that are being edited)",
        }
    }

    pub fn permaview() -> Self {
        Self {
            name: "permaview",
            label: "permaview",
            tooltip: "Link to an URL that retrieves all the currently displayed tiddlers",
        }
    }

    pub fn save_changes() -> Self {
        Self {
            name: "saveChanges",
            label: "save changes",
            tooltip: "Save all tiddlers to create a new TiddlyWiki",
        }
    }

    pub fn new_tiddler() -> Self {
        Self {
            name: "newTiddler",
            label: "new tiddler",
            tooltip: "Create a new tiddler",
        }
    }
}

impl Macro for CommandButton {
    fn name(&self) -> &'static str {
        self.name
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::NONE
    }

    fn render(&self, _w: &mut Wikifier<'_>, output: &mut Vec<Node>, _params: &[String]) -> MacroResult<()> {
        output.push(button(self.label, self.tooltip).with_attr("command", self.name));
        Ok(())
    }
}

/// `<<newJournal [format]>>`; the new tiddler's title is today's date
pub struct NewJournal;

impl Macro for NewJournal {
    fn name(&self) -> &'static str {
        "newJournal"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(0, 1)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let template = params.first().map_or(DEFAULT_JOURNAL_FORMAT, String::as_str);
        let title = format_date(&w.context().now, template);
        output.push(button("new journal", &title).with_attr("command", "newJournal"));
        Ok(())
    }
}

/// `<<option chkName>>` checkbox or `<<option txtName>>` text field
pub struct OptionInput;

impl Macro for OptionInput {
    fn name(&self) -> &'static str {
        "option"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(1, 1)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let name = params[0].as_str();
        let options = w.context().options;

        let input = if name.starts_with("chk") {
            let mut input = Node::element("input")
                .with_attr("type", "checkbox")
                .with_attr("option", name);
            if options.flag(name) {
                input.set_attr("checked", "checked");
            }
            input
        } else if name.starts_with("txt") {
            Node::element("input")
                .with_class("txtOptionInput")
                .with_attr("type", "text")
                .with_attr("option", name)
                .with_attr("value", options.get(name).unwrap_or(""))
        } else {
            return Err(MacroError::invalid(name, "option names start with 'chk' or 'txt'"));
        };

        output.push(input);
        Ok(())
    }
}
