use crate::{Wiki, WikiConfig, WorkspaceError};
use chrono::{TimeZone, Utc};
use std::cell::Cell;
use std::rc::Rc;
use tiddly_animation::Animation;
use tiddly_persistence::{GatewayConfig, HydrateError, MemoryGateway};
use tiddly_wikifier::{find_all, text_content};

fn wiki() -> Wiki {
    let config = WikiConfig {
        user_name: "alice".to_string(),
        ..WikiConfig::default()
    };
    Wiki::new(config)
        .unwrap()
        .with_gateway(Box::new(MemoryGateway::new(GatewayConfig::default())))
}

fn gateway_titles(wiki: &Wiki) -> Vec<String> {
    wiki.forwarder()
        .unwrap()
        .port()
        .rows()
        .unwrap()
        .into_iter()
        .map(|row| row.title)
        .collect()
}

#[test]
fn test_saving_rerenders_open_view() {
    let mut wiki = wiki();
    wiki.save_tiddler("", "Home", "Hello ''world''", "").unwrap();

    let view = wiki.display("Home");
    assert_eq!(view.borrow().renders(), 1);
    assert!(view.borrow().html().contains("<strong>world</strong>"));

    wiki.save_tiddler("Home", "Home", "Bye", "").unwrap();
    assert_eq!(view.borrow().renders(), 2);
    assert_eq!(text_content(view.borrow().nodes()), "Bye");

    // displaying again returns the same view
    assert!(Rc::ptr_eq(&view, &wiki.display("Home")));
    assert_eq!(wiki.open_titles(), vec!["Home"]);
}

#[test]
fn test_unchanged_save_is_skipped() {
    let mut wiki = wiki();
    assert!(wiki.save_tiddler("", "Home", "text", "a b").unwrap());
    let view = wiki.display("Home");

    assert!(!wiki.save_tiddler("Home", "Home", "text", "b a").unwrap());
    assert_eq!(view.borrow().renders(), 1);
    assert_eq!(wiki.forwarder().unwrap().submitted(), 1);
    assert_eq!(wiki.store().tiddler("Home").unwrap().version, 0);
}

#[test]
fn test_edits_are_signed_and_forwarded() {
    let mut wiki = wiki();
    wiki.save_tiddler("", "Signed", "x", "[[to do]]").unwrap();
    assert_eq!(wiki.store().tiddler("Signed").unwrap().modifier, "alice");

    wiki.set_option("txtUserName", "bob");
    wiki.save_tiddler("Signed", "Signed", "y", "[[to do]]").unwrap();
    assert_eq!(wiki.store().tiddler("Signed").unwrap().modifier, "bob");

    let row = wiki.forwarder().unwrap().port().load("Signed").unwrap().unwrap();
    assert_eq!((row.version, row.modifier.as_str()), (1, "bob"));
    assert_eq!(row.tags, "[[to do]]");
}

#[test]
fn test_rename_moves_view_and_lineage() {
    let mut wiki = wiki();
    wiki.save_tiddler("", "Draft", "first", "").unwrap();
    let view = wiki.display("Draft");

    wiki.save_tiddler("Draft", "Final", "second", "").unwrap();

    assert_eq!(wiki.open_titles(), vec!["Final"]);
    assert_eq!(view.borrow().title(), "Final");
    assert_eq!(text_content(view.borrow().nodes()), "second");
    assert!(wiki.store().tiddler("Draft").is_none());
    assert_eq!(wiki.store().tiddler("Final").unwrap().version, 1);
    assert_eq!(gateway_titles(&wiki), vec!["Final"]);

    // later edits still reach the renamed view
    wiki.save_tiddler("Final", "Final", "third", "").unwrap();
    assert_eq!(text_content(view.borrow().nodes()), "third");
}

#[test]
fn test_delete_closes_view_and_restyles_referrers() {
    let mut wiki = wiki();
    wiki.save_tiddler("", "Target", "here", "").unwrap();
    wiki.save_tiddler("", "Index", "See [[Target]]", "").unwrap();
    let index = wiki.display("Index");
    wiki.display("Target");

    let link_class = |wiki: &Wiki| {
        let view = wiki.view("Index").unwrap();
        let view = view.borrow();
        let existing = find_all(view.nodes(), "a")[0].has_class("tiddlyLinkExisting");
        existing
    };
    assert!(link_class(&wiki));

    assert!(wiki.delete_tiddler("Target"));
    assert_eq!(wiki.open_titles(), vec!["Index"]);
    assert!(!link_class(&wiki));
    assert_eq!(index.borrow().renders(), 2);
    assert!(gateway_titles(&wiki).contains(&"Index".to_string()));
    assert!(!gateway_titles(&wiki).contains(&"Target".to_string()));

    assert!(!wiki.delete_tiddler("Target"));
}

#[test]
fn test_view_of_missing_tiddler() {
    let mut wiki = wiki();
    let view = wiki.display("Nowhere");
    assert!(view.borrow().html().contains("doesn't yet exist"));

    wiki.save_tiddler("", "Nowhere", "now here", "").unwrap();
    assert_eq!(text_content(view.borrow().nodes()), "now here");
}

#[test]
fn test_close_and_close_all() {
    let mut wiki = wiki();
    wiki.display("A");
    wiki.display("B");
    wiki.display("C");
    let subscribers = wiki.store().subscriber_count();

    assert!(wiki.close("B"));
    assert!(!wiki.close("B"));
    assert_eq!(wiki.store().subscriber_count(), subscribers - 1);
    assert_eq!(wiki.close_all(), 2);
    assert!(wiki.open_titles().is_empty());
}

#[test]
fn test_refresh_all_rerenders_each_view_once() {
    let mut wiki = wiki();
    let a = wiki.display("A");
    let b = wiki.display("B");
    wiki.refresh_all();
    assert_eq!((a.borrow().renders(), b.borrow().renders()), (2, 2));
}

#[test]
fn test_query_surface() {
    let mut wiki = wiki();
    wiki.save_tiddler("", "Alpha", "links to MissingOne", "journal").unwrap();
    wiki.save_tiddler("", "Beta", "see [[Alpha]] about needles", "journal").unwrap();
    wiki.save_tiddler("", "Hidden", "needle", "excludeLists excludeSearch").unwrap();

    assert_eq!(wiki.list_all(), vec!["Alpha", "Beta"]);
    assert_eq!(wiki.list_by_tag("journal"), vec!["Alpha", "Beta"]);
    assert_eq!(wiki.list_missing(), vec!["MissingOne"]);
    assert_eq!(wiki.list_orphans(), vec!["Beta"]);
    assert!(wiki.list_shadowed().contains(&"SiteTitle".to_string()));

    assert_eq!(wiki.search("NEEDLE", false, false).unwrap(), vec!["Beta"]);
    assert!(wiki.search("NEEDLE", true, false).unwrap().is_empty());
    assert_eq!(wiki.search("^see", false, true).unwrap(), vec!["Beta"]);
    assert!(matches!(
        wiki.search("(", false, true),
        Err(WorkspaceError::Store(_))
    ));
}

#[test]
fn test_configured_exclude_lists_tag() {
    let config = WikiConfig {
        exclude_lists_tag: "hidden".to_string(),
        ..WikiConfig::default()
    };
    let mut wiki = Wiki::new(config).unwrap();
    wiki.save_tiddler("", "Public", "open", "").unwrap();
    wiki.save_tiddler("", "Private", "closed", "hidden").unwrap();
    wiki.save_tiddler("", "Legacy", "old", "excludeLists").unwrap();

    assert_eq!(wiki.list_all(), vec!["Legacy", "Public"]);
    assert_eq!(wiki.list_orphans(), vec!["Legacy", "Public"]);

    let items = |source: &str| -> Vec<String> {
        find_all(&wiki.render_text(source), "li")
            .iter()
            .map(|li| li.text_content())
            .collect()
    };
    assert_eq!(items("<<list all>>"), vec!["Legacy", "Public"]);
    assert_eq!(items("<<list orphans>>"), vec!["Legacy", "Public"]);
}

#[test]
fn test_render_shadow_and_text() {
    let mut wiki = wiki();
    assert_eq!(text_content(&wiki.render("SiteTitle").unwrap()), "My TiddlyWiki");
    assert!(wiki.render("NoSuchTiddler").is_none());

    wiki.set_clock(Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()));
    assert_eq!(text_content(&wiki.render_text("<<today YYYY-0MM-0DD>>")), "2024-03-09");
}

#[test]
fn test_empty_title_rejected() {
    let mut wiki = wiki();
    assert!(matches!(
        wiki.save_tiddler("", "  ", "x", ""),
        Err(WorkspaceError::EmptyTitle)
    ));
}

const PAGE: &str = r#"<html><body><div id="storeArea">
<div title="HelloThere" modifier="alice" modified="202401021530" tags="intro">Welcome\nto [[Other]]</div>
</div></body></html>"#;

#[test]
fn test_hydrate_and_export() {
    let mut wiki = wiki();
    let view = wiki.display("HelloThere");
    assert_eq!(wiki.hydrate(PAGE).unwrap(), 1);
    assert_eq!(text_content(view.borrow().nodes()), "Welcometo Other");
    assert_eq!(find_all(view.borrow().nodes(), "br").len(), 1);
    assert_eq!(wiki.list_missing(), vec!["Other"]);

    wiki.save_tiddler("", "Other", "second", "").unwrap();
    let exported = wiki.export_store_area(PAGE).unwrap();
    assert!(exported.contains(r#"<div title="HelloThere" modifier="alice""#));
    assert!(exported.contains(r#"<div title="Other" modifier="alice""#));

    let mut reloaded = Wiki::new(WikiConfig::default()).unwrap();
    assert_eq!(reloaded.hydrate(&exported).unwrap(), 2);
    assert_eq!(reloaded.store().text_of("HelloThere"), Some("Welcome\nto [[Other]]"));
}

#[test]
fn test_hydrate_without_store_area() {
    let mut wiki = wiki();
    assert!(matches!(
        wiki.hydrate("<html></html>"),
        Err(WorkspaceError::Hydrate(HydrateError::ContainerMissing))
    ));
}

struct Flag {
    ticks: Rc<Cell<usize>>,
    stopped: Rc<Cell<bool>>,
}

impl Animation for Flag {
    fn step(&self) -> f64 {
        0.5
    }

    fn tick(&mut self, _progress: f64) {
        self.ticks.set(self.ticks.get() + 1);
    }

    fn stop(&mut self) {
        self.stopped.set(true);
    }
}

#[test]
fn test_animations_follow_chk_animate() {
    let mut wiki = wiki();
    let (ticks, stopped) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(false)));
    let flag = || {
        Box::new(Flag {
            ticks: ticks.clone(),
            stopped: stopped.clone(),
        })
    };

    assert!(wiki.animate(flag()).unwrap().is_none());
    assert!(stopped.get());
    assert_eq!(ticks.get(), 0);
    assert!(!wiki.scheduler().is_running());

    stopped.set(false);
    wiki.set_option("chkAnimate", "true");
    assert!(wiki.animate(flag()).unwrap().is_some());
    assert!(wiki.scheduler().is_running());
    while wiki.tick_animations() > 0 {}
    assert_eq!(ticks.get(), 2);
    assert!(stopped.get());
}
