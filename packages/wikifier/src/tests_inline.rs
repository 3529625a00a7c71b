use crate::*;
use tiddly_store::TiddlerStore;

fn store_with(titles: &[&str]) -> TiddlerStore {
    let mut store = TiddlerStore::new();
    for title in titles {
        store.upsert(title, title, "body", "alice", Default::default(), None);
    }
    store
}

fn html(source: &str) -> String {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    to_html(&wikify(source, &ctx))
}

#[test]
fn test_links_existing_missing_and_escaped() {
    let store = store_with(&["Target Page"]);
    let ctx = RenderContext::new(&store);
    let nodes = wikify("[[Target Page]] and NotExisting and ~NotALink", &ctx);

    let links = find_all(&nodes, "a");
    let targets: Vec<_> = links.iter().map(|a| a.attr("tiddlylink")).collect();
    assert_eq!(targets, vec![Some("Target Page"), Some("NotExisting")]);
    assert!(links[0].has_class("tiddlyLinkExisting"));
    assert!(links[1].has_class("tiddlyLinkNonExisting"));
    assert_eq!(text_content(&nodes), "Target Page and NotExisting and NotALink");
}

#[test]
fn test_pretty_link_external_detection() {
    let store = store_with(&["Target Page"]);
    let ctx = RenderContext::new(&store);

    let nodes = wikify("[[site|http://example.com]] [[doc|readme.txt]] [[doc|~readme.txt]] [[x|Target Page]]", &ctx);
    let links = find_all(&nodes, "a");

    assert!(links[0].has_class("externalLink"));
    assert_eq!(links[0].attr("href"), Some("http://example.com"));
    assert!(links[1].has_class("externalLink"));
    assert!(links[2].has_class("tiddlyLink"));
    assert_eq!(links[2].attr("tiddlylink"), Some("readme.txt"));
    assert_eq!(links[3].attr("tiddlylink"), Some("Target Page"));
    assert_eq!(links[3].text_content(), "x");
}

#[test]
fn test_unterminated_pretty_link_is_text() {
    assert_eq!(html("[[oops"), "[[oops");
}

#[test]
fn test_wiki_word_glued_to_letter_is_text() {
    assert_eq!(html("aWikiWord"), "aWikiWord");
}

#[test]
fn test_auto_link_off_still_links_shadows() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store).with_auto_link(false);
    let nodes = wikify("SomeWord MainMenu", &ctx);

    let links = find_all(&nodes, "a");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].attr("tiddlylink"), Some("MainMenu"));
    assert!(links[0].has_class("shadow"));
    assert!(links[0].has_class("tiddlyLinkNonExisting"));
}

#[test]
fn test_url_link_stops_before_trailing_punctuation() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("see http://example.com/a.", &ctx);

    let links = find_all(&nodes, "a");
    assert_eq!(links[0].attr("href"), Some("http://example.com/a"));
    assert_eq!(links[0].attr("target"), Some("_blank"));
    assert_eq!(text_content(&nodes), "see http://example.com/a.");
}

#[test]
fn test_image_with_link_and_float() {
    let store = store_with(&["Target Page"]);
    let ctx = RenderContext::new(&store);

    let nodes = wikify("[img[Alt|pic.png][Target Page]]", &ctx);
    let link = find_all(&nodes, "a")[0];
    assert!(link.has_class("imageLink"));
    let img = find_all(&nodes, "img")[0];
    assert_eq!(img.attr("src"), Some("pic.png"));
    assert_eq!(img.attr("title"), Some("Alt"));

    let nodes = wikify("[<img[pic.png]]", &ctx);
    assert_eq!(find_all(&nodes, "img")[0].attr("align"), Some("left"));
}

#[test]
fn test_character_formats() {
    assert_eq!(
        html("''b'' //i// __u__ --s-- ^^sup^^ ~~sub~~"),
        "<strong>b</strong> <em>i</em> <u>u</u> <strike>s</strike> <sup>sup</sup> <sub>sub</sub>"
    );
}

#[test]
fn test_dashes_before_space_are_not_strike() {
    assert_eq!(html("a -- b"), "a -- b");
}

#[test]
fn test_strike_ends_at_blank_line() {
    assert_eq!(html("--gone\n\nnext"), "<strike>gone</strike><br/><br/>next");
}

#[test]
fn test_inline_code_is_verbatim() {
    assert_eq!(html("{{{''x''}}}"), "<code>''x''</code>");
}

#[test]
fn test_styled_runs() {
    assert_eq!(html("@@color:red;hot@@"), "<span style=\"color:red;\">hot</span>");
    assert_eq!(html("@@mark@@"), "<span class=\"marked\">mark</span>");
}

#[test]
fn test_custom_classes() {
    assert_eq!(html("{{big{text}}}"), "<span class=\"big\">text</span>");
    assert_eq!(html("{{box{\nblock}}}"), "<div class=\"box\">block</div>");
}

#[test]
fn test_raw_text_html_entities_comments() {
    assert_eq!(html("\"\"\"''not bold''\"\"\""), "''not bold''");
    assert_eq!(html("<nowiki>//x//</nowiki>"), "//x//");
    assert_eq!(html("<html><b>x</b></html>"), "<span><b>x</b></span>");
    assert_eq!(html("&copy; 2024"), "&copy; 2024");
    assert_eq!(html("a/%hidden%/b"), "ab");
    assert_eq!(html("a<br>b<br />c"), "a<br/>b<br/>c");
}

#[test]
fn test_text_is_escaped_in_html() {
    assert_eq!(html("a < b"), "a &lt; b");
}

#[test]
fn test_highlight_wraps_matches() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify_highlighted("find the needle here", &ctx, Some("needle"), false);

    assert_eq!(
        nodes,
        vec![
            Node::text("find the "),
            Node::element("span").with_class("highlight").with_child(Node::text("needle")),
            Node::text(" here"),
        ]
    );
}

#[test]
fn test_highlight_never_changes_dispatch() {
    let store = store_with(&["Needle Page"]);
    let ctx = RenderContext::new(&store);
    let source = "''bold needle'' and [[Needle Page]]";

    let plain = wikify(source, &ctx);
    let marked = wikify_highlighted(source, &ctx, Some("needle"), false);

    assert_eq!(text_content(&plain), text_content(&marked));
    assert_eq!(find_all(&marked, "span").len(), 2);
    assert_eq!(find_all(&marked, "a")[0].attr("tiddlylink"), Some("Needle Page"));
}

#[test]
fn test_invalid_highlight_pattern_is_ignored() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify_highlighted("text (", &ctx, Some("("), true);

    assert_eq!(nodes, vec![Node::text("text (")]);
}

#[test]
fn test_tree_serializes_with_node_type() {
    let store = TiddlerStore::new();
    let nodes = wikify("''hi'' there", &RenderContext::new(&store));
    let json = serde_json::to_value(&nodes).unwrap();
    assert_eq!(json[0]["type"], "Element");
    assert_eq!(json[0]["tag"], "strong");
    assert_eq!(json[0]["children"][0]["content"], "hi");
    assert_eq!(json[1], serde_json::json!({ "type": "Text", "content": " there" }));

    let back: Vec<Node> = serde_json::from_value(json).unwrap();
    assert_eq!(back, nodes);
}
