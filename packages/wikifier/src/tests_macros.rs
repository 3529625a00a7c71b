use crate::*;
use chrono::{TimeZone, Utc};
use tiddly_store::{parse_tag_list, TiddlerStore};

fn errors(nodes: &[Node]) -> Vec<String> {
    fn collect(node: &Node, out: &mut Vec<String>) {
        if let Node::Error { message } = node {
            out.push(message.clone());
        }
        for child in node.children() {
            collect(child, out);
        }
    }
    let mut out = Vec::new();
    for node in nodes {
        collect(node, &mut out);
    }
    out
}

fn with_class<'a>(nodes: &'a [Node], tag: &str, class: &str) -> Vec<&'a Node> {
    find_all(nodes, tag)
        .into_iter()
        .filter(|n| n.has_class(class))
        .collect()
}

fn sample_store() -> TiddlerStore {
    let mut store = TiddlerStore::new();
    let day = |d: u32| Some(Utc.with_ymd_and_hms(2024, 5, d, 9, 30, 0).unwrap());
    store.upsert("Inner", "Inner", "''deep''", "alice", parse_tag_list("journal"), day(1));
    store.upsert("Other", "Other", "other text", "alice", parse_tag_list("journal"), day(2));
    store.upsert("Hidden", "Hidden", "x", "alice", parse_tag_list("excludeLists"), day(3));
    store
}

#[test]
fn test_standard_registry_has_every_macro() {
    let names: Vec<_> = MacroRegistry::standard().names().collect();
    assert_eq!(names.len(), 18);
    for name in [
        "today", "version", "search", "tiddler", "tag", "timeline", "allTags", "list", "closeAll",
        "permaview", "saveChanges", "slider", "option", "newTiddler", "newJournal", "sparkline",
        "tabs", "gradient",
    ] {
        assert!(names.contains(&name), "missing macro {}", name);
    }
}

#[test]
fn test_unknown_macro_renders_inline_error() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("a <<nope>> b", &ctx);

    assert_eq!(with_class(&nodes, "span", "errorNoSuchMacro").len(), 1);
    assert!(errors(&nodes)[0].contains("<<nope>>"));
    assert_eq!(nodes.last(), Some(&Node::text(" b")));
}

#[test]
fn test_failing_macro_renders_error_and_continues() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<option bogus>>''after''", &ctx);

    let errors = errors(&nodes);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error in macro <<option>>"));
    assert_eq!(find_all(&nodes, "strong").len(), 1);
}

#[test]
fn test_missing_parameter() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<tiddler>>", &ctx);

    assert!(errors(&nodes)[0].contains("expected at least 1 parameter(s), got 0"));
}

#[test]
fn test_unterminated_macro_is_text() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    assert_eq!(to_html(&wikify("<<today", &ctx)), "&lt;&lt;today");
}

#[test]
fn test_today_and_new_journal_use_context_clock() {
    let store = TiddlerStore::new();
    let now = Utc.with_ymd_and_hms(2006, 3, 2, 10, 5, 0).unwrap();
    let ctx = RenderContext::new(&store).with_now(now);

    let nodes = wikify("<<today YYYY-0MM-0DD>>", &ctx);
    assert_eq!(text_content(&nodes), "2006-03-02");

    let nodes = wikify("<<newJournal>>", &ctx);
    let button = find_all(&nodes, "a")[0];
    assert_eq!(button.attr("title"), Some("2 March 2006"));
    assert_eq!(button.attr("command"), Some("newJournal"));
}

#[test]
fn test_version_and_command_buttons() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);

    let nodes = wikify("<<version>>", &ctx);
    assert_eq!(text_content(&nodes), env!("CARGO_PKG_VERSION"));

    let nodes = wikify("<<closeAll>><<permaview>><<saveChanges>><<newTiddler>>", &ctx);
    let commands: Vec<_> = find_all(&nodes, "a").iter().map(|a| a.attr("command")).collect();
    assert_eq!(
        commands,
        vec![Some("closeAll"), Some("permaview"), Some("saveChanges"), Some("newTiddler")]
    );
}

#[test]
fn test_search_box() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<search term>>", &ctx);

    assert_eq!(with_class(&nodes, "span", "searchBox").len(), 1);
    assert_eq!(find_all(&nodes, "input")[0].attr("value"), Some("term"));
}

#[test]
fn test_tiddler_transclusion() {
    let store = sample_store();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<tiddler Inner>>", &ctx);

    let span = find_all(&nodes, "span")[0];
    assert_eq!(span.attr("tiddler"), Some("Inner"));
    assert_eq!(find_all(&nodes, "strong")[0].text_content(), "deep");
}

#[test]
fn test_self_transclusion_is_refused() {
    let mut store = TiddlerStore::new();
    store.upsert("Loop", "Loop", "<<tiddler Loop>>", "alice", Default::default(), None);
    let ctx = RenderContext::new(&store).for_tiddler("Loop");
    let nodes = wikify("<<tiddler Loop>>", &ctx);

    let errors = errors(&nodes);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].ends_with("transclusion of 'Loop' is recursive"));
}

#[test]
fn test_fanned_out_self_transclusion_stays_linear() {
    let mut store = TiddlerStore::new();
    let body = "<<tiddler Fan>>".repeat(4);
    store.upsert("Fan", "Fan", &body, "alice", Default::default(), None);
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<tiddler Fan>>", &ctx);

    // one level of Fan, each of its four calls refused
    assert_eq!(find_all(&nodes, "span").len(), 1);
    let errors = errors(&nodes);
    assert_eq!(errors.len(), 4);
    assert!(errors.iter().all(|e| e.contains("is recursive")));
}

#[test]
fn test_mutual_transclusion_is_refused_and_siblings_allowed() {
    let mut store = TiddlerStore::new();
    store.upsert("Ping", "Ping", "<<tiddler Pong>>", "alice", Default::default(), None);
    store.upsert("Pong", "Pong", "<<tiddler Ping>> <<tiddler Leaf>><<tiddler Leaf>>", "alice", Default::default(), None);
    store.upsert("Leaf", "Leaf", "leaf", "alice", Default::default(), None);
    let ctx = RenderContext::new(&store).for_tiddler("Ping");
    let nodes = wikify("<<tiddler Pong>>", &ctx);

    let errors = errors(&nodes);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].ends_with("transclusion of 'Ping' is recursive"));
    assert_eq!(text_content(&nodes).matches("leaf").count(), 2);
}

#[test]
fn test_long_transclusion_chain_is_bounded() {
    let mut store = TiddlerStore::new();
    for n in 0..=MAX_TRANSCLUSION_DEPTH + 1 {
        let body = format!("<<tiddler Step{}>>", n + 1);
        let title = format!("Step{}", n);
        store.upsert(&title, &title, &body, "alice", Default::default(), None);
    }
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<tiddler Step0>>", &ctx);

    let errors = errors(&nodes);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("nested too deeply"));
}

#[test]
fn test_list_macro() {
    let store = sample_store();
    let ctx = RenderContext::new(&store);

    let nodes = wikify("<<list all>>", &ctx);
    let titles: Vec<_> = find_all(&nodes, "a").iter().map(|a| a.text_content()).collect();
    assert_eq!(titles, vec!["Inner", "Other"]);

    let nodes = wikify("<<list shadowed>>", &ctx);
    assert_eq!(find_all(&nodes, "li").len(), store.shadowed_titles().len());

    let nodes = wikify("<<list bogus>>", &ctx);
    assert_eq!(errors(&nodes).len(), 1);
}

#[test]
fn test_list_touched_uses_context_cutoff() {
    let store = sample_store();
    let since = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
    let ctx = RenderContext::new(&store).with_touched_since(since);
    let nodes = wikify("<<list touched>>", &ctx);

    let titles: Vec<_> = find_all(&nodes, "a").iter().map(|a| a.text_content()).collect();
    assert_eq!(titles, vec!["Hidden", "Other"]);
}

#[test]
fn test_tag_button_and_popup() {
    let store = sample_store();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<tag journal>>", &ctx);

    let button = with_class(&nodes, "a", "tagButton")[0];
    assert_eq!(button.attr("tag"), Some("journal"));
    let popup = with_class(&nodes, "ul", "popup")[0];
    assert_eq!(popup.children().len(), 2);
}

#[test]
fn test_all_tags() {
    let empty = TiddlerStore::new();
    let nodes = wikify("<<allTags>>", &RenderContext::new(&empty));
    assert_eq!(text_content(&nodes), "No tags");

    let store = sample_store();
    let nodes = wikify("<<allTags>>", &RenderContext::new(&store));
    let labels: Vec<_> = find_all(&nodes, "a").iter().map(|a| a.text_content()).collect();
    assert_eq!(labels, vec!["excludeLists (1)", "journal (2)"]);
}

#[test]
fn test_timeline_groups_by_day_newest_first() {
    let store = sample_store();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<timeline>>", &ctx);

    let groups = with_class(&nodes, "ul", "timeline");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].children()[0].text_content(), "2 May 2024");
    assert_eq!(groups[0].children()[1].text_content(), "Other");
    assert_eq!(groups[1].children()[1].text_content(), "Inner");

    let nodes = wikify("<<timeline modified 1>>", &ctx);
    assert_eq!(with_class(&nodes, "ul", "timeline").len(), 1);
}

#[test]
fn test_option_inputs() {
    let store = TiddlerStore::new();
    let mut options = Options::new();
    options.set("chkAnimate", "true");
    options.set("txtUserName", "JoeBloggs");
    let ctx = RenderContext::new(&store).with_options(&options);

    let nodes = wikify("<<option chkAnimate>><<option chkOther>><<option txtUserName>>", &ctx);
    let inputs = find_all(&nodes, "input");
    assert_eq!(inputs[0].attr("checked"), Some("checked"));
    assert_eq!(inputs[1].attr("checked"), None);
    assert_eq!(inputs[2].attr("value"), Some("JoeBloggs"));
}

#[test]
fn test_slider_follows_option() {
    let store = sample_store();
    let source = "<<slider chkPanel Inner 'open me' tip>>";

    let closed = wikify(source, &RenderContext::new(&store));
    let panel = with_class(&closed, "div", "sliderPanel")[0];
    assert_eq!(panel.style("display"), Some("none"));
    assert_eq!(find_all(&closed, "a")[0].text_content(), "open me");
    assert_eq!(find_all(&closed, "strong").len(), 1);

    let mut options = Options::new();
    options.set("chkPanel", "true");
    let open = wikify(source, &RenderContext::new(&store).with_options(&options));
    assert_eq!(with_class(&open, "div", "sliderPanel")[0].style("display"), Some("block"));
}

#[test]
fn test_tabs_select_from_option() {
    let store = sample_store();
    let source = "<<tabs txtTab One tip1 Inner Two tip2 Other>>";

    let nodes = wikify(source, &RenderContext::new(&store));
    let selected = with_class(&nodes, "a", "tabSelected");
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].text_content(), "One");
    assert_eq!(with_class(&nodes, "div", "tabContents")[0].text_content(), "deep");

    let mut options = Options::new();
    options.set("txtTab", "Two");
    let nodes = wikify(source, &RenderContext::new(&store).with_options(&options));
    assert_eq!(with_class(&nodes, "a", "tabSelected")[0].text_content(), "Two");
    assert_eq!(with_class(&nodes, "div", "tabContents")[0].text_content(), "other text");
}

#[test]
fn test_sparkline() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);

    let nodes = wikify("<<sparkline 0 5 10>>", &ctx);
    let heights: Vec<_> = with_class(&nodes, "span", "sparktick")
        .iter()
        .map(|t| t.style("height"))
        .collect();
    assert_eq!(heights, vec![Some("0%"), Some("50%"), Some("100%")]);

    let nodes = wikify("<<sparkline 1 x>>", &ctx);
    assert!(errors(&nodes)[0].contains("expected an integer"));
}

#[test]
fn test_sparkline_extreme_values() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let source = format!("before <<sparkline {} 0 {}>> after", i64::MIN, i64::MAX);
    let nodes = wikify(&source, &ctx);

    assert!(errors(&nodes).is_empty());
    let heights: Vec<_> = with_class(&nodes, "span", "sparktick")
        .iter()
        .map(|t| t.style("height"))
        .collect();
    assert_eq!(heights, vec![Some("0%"), Some("50%"), Some("100%")]);
    assert!(text_content(&nodes).ends_with(" after"));

    let nodes = wikify("<<sparkline 100000000000000000>>", &ctx);
    let heights: Vec<_> = with_class(&nodes, "span", "sparktick")
        .iter()
        .map(|t| t.style("height"))
        .collect();
    assert_eq!(heights, vec![Some("100%")]);
}

#[test]
fn test_gradient_wraps_following_content() {
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store);
    let nodes = wikify("<<gradient vert #ffffff #000000>>''Inside''>>after", &ctx);

    let panel = with_class(&nodes, "div", "gradient")[0];
    assert_eq!(
        panel.style("background-image"),
        Some("linear-gradient(to bottom, #ffffff, #000000)")
    );
    assert_eq!(panel.text_content(), "Inside");
    assert_eq!(nodes.last(), Some(&Node::text("after")));

    let nodes = wikify("<<gradient horiz notacolor!>>x>>", &ctx);
    assert!(errors(&nodes)[0].contains("not a color"));
}

#[test]
fn test_custom_macro_registration() {
    struct Shout;

    impl Macro for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn params(&self) -> ParamSpec {
            ParamSpec::between(1, 1)
        }

        fn render(&self, _w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()> {
            output.push(Node::text(params[0].to_uppercase()));
            Ok(())
        }
    }

    let mut registry = MacroRegistry::new();
    registry.register(Box::new(Shout));
    let store = TiddlerStore::new();
    let ctx = RenderContext::new(&store).with_macros(&registry);

    assert_eq!(text_content(&wikify("<<shout hey>>", &ctx)), "HEY");
}
