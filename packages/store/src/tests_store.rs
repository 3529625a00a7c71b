use crate::*;
use chrono::{TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;

fn tags(list: &str) -> TagSet {
    parse_tag_list(list)
}

fn at(minute: u32) -> Option<chrono::DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap())
}

#[test]
fn test_upsert_creates_with_version_zero() {
    let mut store = TiddlerStore::new();
    let tiddler = store.upsert("Note", "Note", "hello", "alice", tags("a"), at(0));

    assert_eq!(tiddler.version, 0);
    assert_eq!(tiddler.created, tiddler.modified);
    assert!(store.exists("Note"));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_upsert_updates_in_place_and_bumps_version() {
    let mut store = TiddlerStore::new();
    let id = store.upsert("Note", "Note", "one", "alice", tags(""), at(0)).id;
    store.upsert("Note", "Note", "two", "bob", tags(""), at(1));
    let tiddler = store.upsert("Note", "Note", "three", "bob", tags(""), at(2));

    assert_eq!(tiddler.id, id);
    assert_eq!(tiddler.version, 2);
    assert_eq!(tiddler.text, "three");
    assert_eq!(tiddler.modifier, "bob");
    assert_eq!(tiddler.created, at(0).unwrap());
}

#[test]
fn test_rename_keeps_identity() {
    let mut store = TiddlerStore::new();
    let id = store.upsert("Old", "Old", "text", "alice", tags(""), at(0)).id;
    let renamed = store.upsert("Old", "New", "text", "alice", tags(""), at(1));

    assert_eq!(renamed.id, id);
    assert_eq!(renamed.version, 1);
    assert!(store.tiddler("Old").is_none());
    assert_eq!(store.tiddler("New").map(|t| t.id), Some(id));
}

#[test]
fn test_rename_over_existing_replaces_it() {
    let mut store = TiddlerStore::new();
    let a = store.upsert("A", "A", "a", "x", tags(""), at(0)).id;
    store.upsert("B", "B", "b", "x", tags(""), at(0));
    store.upsert("A", "B", "a2", "x", tags(""), at(1));

    assert_eq!(store.len(), 1);
    let b = store.tiddler("B").unwrap();
    assert_eq!(b.id, a);
    assert_eq!(b.text, "a2");
}

#[test]
fn test_link_extraction_property() {
    let mut store = TiddlerStore::new();
    store.upsert("Target Page", "Target Page", "", "x", tags(""), at(0));
    let tiddler = store.upsert(
        "Source",
        "Source",
        "See [[Target Page]] and NotExisting and ~NotALink",
        "x",
        tags(""),
        at(0),
    );

    assert!(tiddler.links_to("Target Page"));
    // NotExisting is a wiki word, so it is recorded even though it is missing
    assert!(tiddler.links_to("NotExisting"));
    assert!(!tiddler.links().iter().any(|l| l.contains("NotALink")));
}

#[test]
fn test_aliased_link_requires_existing_target() {
    let mut store = TiddlerStore::new();
    let tiddler = store.upsert("Source", "Source", "[[click|Nowhere]]", "x", tags(""), at(0));
    assert!(tiddler.links().is_empty());

    store.upsert("Nowhere", "Nowhere", "", "x", tags(""), at(0));
    let tiddler = store.upsert("Source", "Source", "[[click|Nowhere]]", "x", tags(""), at(1));
    assert_eq!(tiddler.links(), ["Nowhere".to_string()]);
}

#[test]
fn test_links_recomputed_on_every_write() {
    let mut store = TiddlerStore::new();
    store.upsert("Source", "Source", "FirstLink", "x", tags(""), at(0));
    let tiddler = store.upsert("Source", "Source", "SecondLink", "x", tags(""), at(1));
    assert_eq!(tiddler.links(), ["SecondLink".to_string()]);
}

#[test]
fn test_orphan_and_missing_consistency() {
    let mut store = TiddlerStore::with_shadows(Default::default());
    store.upsert("X", "X", "links to [[Y]]", "x", tags(""), at(0));
    store.upsert("Y", "Y", "no links here", "x", tags(""), at(0));

    assert!(store.missing_titles().is_empty());
    assert!(!store.orphan_titles().contains(&"Y".to_string()));

    store.remove("X");
    assert!(store.missing_titles().is_empty());
    assert_eq!(store.orphan_titles(), vec!["Y".to_string()]);
}

#[test]
fn test_missing_ignores_shadowed_titles() {
    let mut store = TiddlerStore::new();
    store.upsert("Home", "Home", "MainMenu and MissingPage", "x", tags(""), at(0));
    assert_eq!(store.missing_titles(), vec!["MissingPage".to_string()]);
}

#[test]
fn test_orphans_skip_exclude_lists() {
    let mut store = TiddlerStore::with_shadows(Default::default());
    store.upsert("Hidden", "Hidden", "", "x", tags(EXCLUDE_LISTS_TAG), at(0));
    store.upsert("Shown", "Shown", "", "x", tags(""), at(0));
    assert_eq!(store.orphan_titles(), vec!["Shown".to_string()]);

    store.set_exclude_lists_tag("hidden");
    store.upsert("Secret", "Secret", "", "x", tags("hidden"), at(0));
    assert_eq!(store.exclude_lists_tag(), "hidden");
    assert_eq!(
        store.orphan_titles(),
        vec!["Hidden".to_string(), "Shown".to_string()]
    );
}

#[test]
fn test_get_falls_back_to_shadow() {
    let mut store = TiddlerStore::new();
    assert!(matches!(store.get("MainMenu"), Some(Lookup::Shadow(_))));
    assert!(store.get("NoSuchThing").is_none());

    store.upsert("MainMenu", "MainMenu", "custom", "x", tags(""), at(0));
    assert!(matches!(store.get("MainMenu"), Some(Lookup::Live(_))));
    assert_eq!(store.text_of("MainMenu"), Some("custom"));

    store.remove("MainMenu");
    assert_eq!(store.text_of("MainMenu"), Some("GettingStarted"));
}

#[test]
fn test_query_by_tag_and_invert() {
    let mut store = TiddlerStore::new();
    store.upsert("B", "B", "", "x", tags("journal"), at(0));
    store.upsert("A", "A", "", "x", tags("journal [[to do]]"), at(1));
    store.upsert("C", "C", "", "x", tags("to"), at(2));

    let tagged = store
        .query(&Query::ByTag { tag: "journal".into(), invert: false }, SortField::Title)
        .unwrap();
    let titles: Vec<_> = tagged.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);

    let untagged = store
        .query(&Query::ByTag { tag: "journal".into(), invert: true }, SortField::Title)
        .unwrap();
    assert_eq!(untagged.len(), 1);
    assert_eq!(untagged[0].title, "C");
}

#[test]
fn test_query_by_link() {
    let mut store = TiddlerStore::new();
    store.upsert("One", "One", "[[Target]]", "x", tags(""), at(0));
    store.upsert("Two", "Two", "nothing", "x", tags(""), at(0));

    let hits = store
        .query(&Query::ByLink { target: "Target".into(), invert: false }, SortField::Title)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "One");
}

#[test]
fn test_search_sorted_and_excluding_tag() {
    let mut store = TiddlerStore::new();
    store.upsert("Zed", "Zed", "apple pie", "x", tags(""), at(2));
    store.upsert("Alpha", "Alpha", "APPLE", "x", tags(""), at(1));
    store.upsert("Hidden", "Hidden", "apple", "x", tags(EXCLUDE_SEARCH_TAG), at(0));

    let hits = store
        .query(&Query::Search(SearchSpec::literal("apple")), SortField::Title)
        .unwrap();
    let titles: Vec<_> = hits.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Zed"]);

    let by_modified = store
        .query(&Query::Search(SearchSpec::literal("apple")), SortField::Modified)
        .unwrap();
    assert_eq!(by_modified[0].title, "Alpha");

    let mut sensitive = SearchSpec::literal("apple");
    sensitive.case_sensitive = true;
    let hits = store.query(&Query::Search(sensitive), SortField::Title).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_search_literal_escapes_regex() {
    let mut store = TiddlerStore::new();
    store.upsert("Cost", "Cost", "price (USD)", "x", tags(""), at(0));
    let hits = store
        .query(&Query::Search(SearchSpec::literal("(USD)")), SortField::Title)
        .unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_search_invalid_regex() {
    let store = TiddlerStore::new();
    let mut spec = SearchSpec::literal("(unclosed");
    spec.regex = true;
    let result = store.query(&Query::Search(spec), SortField::Title);
    assert!(matches!(result, Err(StoreError::InvalidPattern { .. })));
}

#[test]
fn test_all_tags_counts() {
    let mut store = TiddlerStore::new();
    store.upsert("A", "A", "", "x", tags("one two"), at(0));
    store.upsert("B", "B", "", "x", tags("two"), at(0));
    assert_eq!(
        store.all_tags(),
        vec![("one".to_string(), 1), ("two".to_string(), 2)]
    );
}

#[test]
fn test_title_subscriber_fires_for_old_and_new_titles() {
    let mut store = TiddlerStore::new();
    store.upsert("Old", "Old", "", "x", tags(""), at(0));

    let seen = Rc::new(RefCell::new(Vec::new()));
    for title in ["Old", "New"] {
        let seen = seen.clone();
        store.subscribe(
            Subscription::Title(title.to_string()),
            Box::new(move |store, notice| {
                seen.borrow_mut()
                    .push((notice.title.clone(), store.exists("New")));
            }),
        );
    }

    store.upsert("Old", "New", "", "x", tags(""), at(1));
    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![(Some("Old".to_string()), true), (Some("New".to_string()), true)]
    );
}

#[test]
fn test_wildcard_subscriber_only_fires_on_blanket() {
    let mut store = TiddlerStore::new();
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    store.subscribe(Subscription::All, Box::new(move |_, _| *counter.borrow_mut() += 1));

    store.upsert("A", "A", "", "x", tags(""), at(0));
    assert_eq!(*count.borrow(), 0);

    store.remove("A");
    assert_eq!(*count.borrow(), 1);

    store.notify_all();
    assert_eq!(*count.borrow(), 2);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let mut store = TiddlerStore::new();
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    let handle = store.subscribe(
        Subscription::Title("A".into()),
        Box::new(move |_, _| *counter.borrow_mut() += 1),
    );

    store.upsert("A", "A", "", "x", tags(""), at(0));
    assert!(store.unsubscribe(handle));
    assert!(!store.unsubscribe(handle));
    store.upsert("A", "A", "again", "x", tags(""), at(1));

    assert_eq!(*count.borrow(), 1);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn test_suspended_notifications_are_dropped() {
    let mut store = TiddlerStore::new();
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    store.subscribe(
        Subscription::Title("A".into()),
        Box::new(move |_, _| *counter.borrow_mut() += 1),
    );

    store.suspend_notifications();
    store.upsert("A", "A", "", "x", tags(""), at(0));
    store.resume_notifications();
    assert_eq!(*count.borrow(), 0);

    store.notify_all();
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_load_relinks_against_full_store() {
    let mut store = TiddlerStore::with_shadows(Default::default());
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    store.load(vec![
        TiddlerStore::draft("First", "[[go|Second]]", "x", tags(""), now, now),
        TiddlerStore::draft("Second", "", "x", tags(""), now, now),
    ]);

    assert_eq!(store.tiddler("First").unwrap().links(), ["Second".to_string()]);
    assert_ne!(
        store.tiddler("First").unwrap().id,
        store.tiddler("Second").unwrap().id
    );
}

#[test]
fn test_tiddler_serializes_to_json() {
    let mut store = TiddlerStore::new();
    let tiddler = store.upsert("A", "A", "body", "x", tags("t"), at(0)).clone();
    let json = serde_json::to_string(&tiddler).unwrap();
    let back: Tiddler = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tiddler);
}
