//! Macros listing tiddlers and tags.

use super::{button, Macro, ParamSpec};
use crate::context::RenderContext;
use crate::errors::{MacroError, MacroResult};
use crate::node::Node;
use crate::rules::tiddly_link;
use crate::wikifier::Wikifier;
use tiddly_store::dates::format_date;
use tiddly_store::{Query, SortField, Tiddler};

const TIMELINE_DATE_FORMAT: &str = "DD MMM YYYY";

fn link_item(ctx: &RenderContext<'_>, title: &str) -> Node {
    Node::element("li").with_child(tiddly_link(ctx, title, vec![Node::text(title)]))
}

/// Live tiddlers without the store's lists exclusion tag, sorted by `sort`
fn listed_tiddlers<'s>(ctx: &RenderContext<'s>, sort: SortField) -> MacroResult<Vec<&'s Tiddler>> {
    let query = Query::ByTag {
        tag: ctx.store.exclude_lists_tag().to_string(),
        invert: true,
    };
    ctx.store
        .query(&query, sort)
        .map_err(|e| MacroError::Failed(e.to_string()))
}

/// `<<tag name>>`: button for a tag with a popup of the tiddlers carrying it
pub struct TagButton;

impl Macro for TagButton {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(1, 1)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let ctx = w.context();
        let tag = params[0].as_str();
        let tagged = ctx
            .store
            .query(
                &Query::ByTag {
                    tag: tag.to_string(),
                    invert: false,
                },
                SortField::Title,
            )
            .map_err(|e| MacroError::Failed(e.to_string()))?;

        let tooltip = format!("Show tiddlers tagged with '{}' ({})", tag, tagged.len());
        output.push(button(tag, &tooltip).with_class("tagButton").with_attr("tag", tag));

        let mut popup = Node::element("ul").with_class("popup").with_style("display", "none");
        if tagged.is_empty() {
            popup = popup.with_child(
                Node::element("li")
                    .with_class("disabled")
                    .with_child(Node::text(format!("No tiddlers tagged with '{}'", tag))),
            );
        }
        for tiddler in tagged {
            popup = popup.with_child(link_item(ctx, &tiddler.title));
        }
        output.push(popup);
        Ok(())
    }
}

/// `<<timeline [modified|created] [length]>>`: newest first, grouped by day
pub struct Timeline;

impl Macro for Timeline {
    fn name(&self) -> &'static str {
        "timeline"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(0, 2)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let ctx = w.context();
        let field = match params.first().map(String::as_str) {
            None | Some("modified") => SortField::Modified,
            Some("created") => SortField::Created,
            Some(other) => return Err(MacroError::invalid(other, "expected 'modified' or 'created'")),
        };
        let length = match params.get(1) {
            Some(n) => Some(
                n.parse::<usize>()
                    .map_err(|_| MacroError::invalid(n.as_str(), "expected a count"))?,
            ),
            None => None,
        };

        let mut tiddlers = listed_tiddlers(ctx, field)?;
        tiddlers.reverse();
        if let Some(length) = length {
            tiddlers.truncate(length);
        }

        let mut last_day = String::new();
        let mut group: Option<Node> = None;
        for tiddler in tiddlers {
            let date = if field == SortField::Created {
                tiddler.created
            } else {
                tiddler.modified
            };
            let day = format_date(&date, "YYYY0MM0DD");
            if day != last_day {
                output.extend(group.take());
                group = Some(
                    Node::element("ul").with_class("timeline").with_child(
                        Node::element("li")
                            .with_class("listTitle")
                            .with_child(Node::text(format_date(&date, TIMELINE_DATE_FORMAT))),
                    ),
                );
                last_day = day;
            }
            if let Some(list) = group.as_mut().and_then(Node::children_mut) {
                list.push(link_item(ctx, &tiddler.title).with_class("listLink"));
            }
        }
        output.extend(group);
        Ok(())
    }
}

/// `<<allTags>>`: every tag with its count
pub struct AllTags;

impl Macro for AllTags {
    fn name(&self) -> &'static str {
        "allTags"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::NONE
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, _params: &[String]) -> MacroResult<()> {
        let tags = w.context().store.all_tags();
        let mut list = Node::element("ul");
        if tags.is_empty() {
            list = list.with_child(Node::element("li").with_class("listTitle").with_child(Node::text("No tags")));
        }
        for (tag, count) in tags {
            let tooltip = format!("Show tiddlers tagged with '{}'", tag);
            list = list.with_child(Node::element("li").with_child(
                button(&format!("{} ({})", tag, count), &tooltip)
                    .with_class("tagButton")
                    .with_attr("tag", tag),
            ));
        }
        output.push(list);
        Ok(())
    }
}

/// `<<list all|missing|orphans|shadowed|touched>>`
pub struct ListMacro;

impl Macro for ListMacro {
    fn name(&self) -> &'static str {
        "list"
    }

    fn params(&self) -> ParamSpec {
        ParamSpec::between(0, 1)
    }

    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
        let ctx = w.context();
        let store = ctx.store;
        let kind = params.first().map_or("all", String::as_str);

        let titles: Vec<String> = match kind {
            "all" => listed_tiddlers(ctx, SortField::Title)?
                .into_iter()
                .map(|t| t.title.clone())
                .collect(),
            "missing" => store.missing_titles(),
            "orphans" => store.orphan_titles(),
            "shadowed" => store.shadowed_titles(),
            "touched" => match ctx.touched_since {
                Some(since) => store
                    .tiddlers()
                    .filter(|t| t.modified >= since)
                    .map(|t| t.title.clone())
                    .collect(),
                None => Vec::new(),
            },
            other => {
                return Err(MacroError::invalid(
                    other,
                    "expected all, missing, orphans, shadowed or touched",
                ))
            }
        };

        let mut list = Node::element("ul");
        for title in &titles {
            list = list.with_child(link_item(ctx, title));
        }
        output.push(list);
        Ok(())
    }
}
