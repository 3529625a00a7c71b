use crate::{
    hydrate, parse_fragment, parse_store_area, write_fragment, write_store_area, CodecError,
    HydrateError,
};
use tiddly_store::dates::from_compact;
use tiddly_store::{parse_tag_list, Tiddler, TiddlerStore};

fn tiddler(title: &str, text: &str, tags: &str) -> Tiddler {
    let when = from_compact("202401021530").unwrap();
    TiddlerStore::draft(title, text, "alice", parse_tag_list(tags), when, when)
}

const PAGE: &str = r#"<html><body>
<div id="storeArea">
<div title="HelloThere" modifier="alice" modified="202401021530" created="202312250900" tags="intro [[to do]]">Welcome to MainPage\nSee [[Other Page]]</div>
<div title="MainPage" modifier="bob" modified="202401030800" tags="">A &lt;b&gt; tag \s here</div>
</div>
<div id="shadowArea"></div>
</body></html>"#;

#[test]
fn test_write_fragment_escapes_everything() {
    let html = write_fragment(&tiddler("Say \"hi\"", "a\\b\r\n<c> & d", "[[to do]] x"));
    assert_eq!(
        html,
        r#"<div title="Say &quot;hi&quot;" modifier="alice" modified="202401021530" created="202401021530" tags="[[to do]] x">a\sb\n&lt;c&gt; &amp; d</div>"#
    );
}

#[test]
fn test_fragment_round_trip() {
    let original = tiddler("Odd <Title>", "line one\\\nline \"two\"\n\n", "b [[a c]]");
    let parsed = parse_fragment(&write_fragment(&original)).unwrap();
    assert_eq!(parsed.title, original.title);
    assert_eq!(parsed.text, original.text);
    assert_eq!(parsed.tags, original.tags);
    assert_eq!(parsed.modified, original.modified);
    assert_eq!(parsed.created, original.created);
    assert_eq!(parsed.modifier, "alice");
}

#[test]
fn test_parse_fragment_defaults() {
    let parsed = parse_fragment(r#"<div title="Bare" modified="202402010000">x</div>"#).unwrap();
    assert_eq!(parsed.modifier, "");
    assert!(parsed.tags.is_empty());
    assert_eq!(parsed.created, parsed.modified);
}

#[test]
fn test_parse_fragment_errors() {
    assert!(matches!(
        parse_fragment(r#"<div modifier="x">body</div>"#),
        Err(CodecError::MissingAttribute { attribute: "title", .. })
    ));
    assert!(matches!(
        parse_fragment(r#"<div title="T" modified="2024">body</div>"#),
        Err(CodecError::InvalidTimestamp { attribute: "modified", .. })
    ));
    assert!(matches!(
        parse_fragment("<p>not a fragment</p>"),
        Err(CodecError::Malformed { offset: 0 })
    ));
}

#[test]
fn test_parse_store_area() {
    let fragments = parse_store_area(PAGE).unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].title, "HelloThere");
    assert_eq!(fragments[0].text, "Welcome to MainPage\nSee [[Other Page]]");
    assert_eq!(fragments[0].created, from_compact("202312250900").unwrap());
    assert!(fragments[0].tags.contains("to do"));
    assert_eq!(fragments[1].text, "A <b> tag \\ here");
}

#[test]
fn test_missing_container_is_fatal() {
    let mut store = TiddlerStore::new();
    assert_eq!(
        hydrate("<html><body></body></html>", &mut store),
        Err(HydrateError::ContainerMissing)
    );
    assert_eq!(
        parse_store_area(r#"<div id="storeArea"> "#),
        Err(HydrateError::ContainerUnterminated)
    );
}

#[test]
fn test_hydrate_loads_without_notifying() {
    let mut store = TiddlerStore::new();
    let fired = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = fired.clone();
    store.subscribe(
        tiddly_store::Subscription::Title("HelloThere".into()),
        Box::new(move |_, _| counter.set(counter.get() + 1)),
    );

    assert_eq!(hydrate(PAGE, &mut store).unwrap(), 2);
    assert_eq!(fired.get(), 0);

    let hello = store.tiddler("HelloThere").unwrap();
    assert_eq!(hello.modifier, "alice");
    assert!(hello.links_to("MainPage"));
    assert!(hello.links_to("Other Page"));
    assert_eq!(store.text_of("MainPage"), Some("A <b> tag \\ here"));
}

#[test]
fn test_write_store_area_replaces_content_only() {
    let page = write_store_area(PAGE, [&tiddler("Solo", "one\ntwo", "")]).unwrap();
    assert!(page.starts_with("<html><body>\n<div id=\"storeArea\">\n<div title=\"Solo\""));
    assert!(page.contains(r#"<div id="shadowArea"></div>"#));

    let fragments = parse_store_area(&page).unwrap();
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].text, "one\ntwo");
}
