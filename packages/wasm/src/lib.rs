use serde::Serialize;
use tiddly_store::TiddlerStore;
use tiddly_wikifier::{to_html, wikify, RenderContext};
use tiddly_workspace::{Wiki, WikiConfig};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn js_error(prefix: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", prefix, err))
}

/// Render markup against an empty store and return HTML
#[wasm_bindgen(js_name = renderMarkup)]
pub fn render_markup(source: &str) -> String {
    let store = TiddlerStore::new();
    to_html(&wikify(source, &RenderContext::new(&store)))
}

/// Render markup against an empty store and return the output tree as JSON
#[wasm_bindgen(js_name = renderTree)]
pub fn render_tree(source: &str) -> Result<String, JsValue> {
    let store = TiddlerStore::new();
    to_json(&wikify(source, &RenderContext::new(&store)))
}

/// A wiki living in the page: store, open views and options
#[wasm_bindgen]
pub struct WikiHandle {
    wiki: Wiki,
}

#[wasm_bindgen]
impl WikiHandle {
    /// `config` is the JSON of a `tiddly.config.json`; defaults when absent
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<WikiHandle, JsValue> {
        let config = match config {
            Some(json) => serde_json::from_str::<WikiConfig>(&json)
                .map_err(|e| js_error("Config error", e))?,
            None => WikiConfig::default(),
        };
        let wiki = Wiki::new(config).map_err(|e| js_error("Config error", e))?;
        Ok(WikiHandle { wiki })
    }

    /// Load the page's store area, returning how many tiddlers were read
    pub fn hydrate(&mut self, page: &str) -> Result<usize, JsValue> {
        self.wiki
            .hydrate(page)
            .map_err(|e| js_error("Hydrate error", e))
    }

    #[wasm_bindgen(js_name = exportStoreArea)]
    pub fn export_store_area(&self, page: &str) -> Result<String, JsValue> {
        self.wiki
            .export_store_area(page)
            .map_err(|e| js_error("Export error", e))
    }

    /// HTML of a tiddler (or shadow), without opening a view
    pub fn render(&self, title: &str) -> Option<String> {
        self.wiki.render(title).map(|nodes| to_html(&nodes))
    }

    /// Open (or reuse) the view of `title` and return its HTML
    pub fn display(&mut self, title: &str, highlight: Option<String>) -> String {
        self.wiki
            .display_highlighted(title, highlight.as_deref())
            .borrow()
            .html()
    }

    /// Current HTML of an open view
    #[wasm_bindgen(js_name = viewHtml)]
    pub fn view_html(&self, title: &str) -> Option<String> {
        let view = self.wiki.view(title)?;
        let html = view.borrow().html();
        Some(html)
    }

    pub fn close(&mut self, title: &str) -> bool {
        self.wiki.close(title)
    }

    #[wasm_bindgen(js_name = closeAll)]
    pub fn close_all(&mut self) -> usize {
        self.wiki.close_all()
    }

    /// JSON array of open titles, in story order
    #[wasm_bindgen(js_name = openTitles)]
    pub fn open_titles(&self) -> Result<String, JsValue> {
        to_json(&self.wiki.open_titles())
    }

    pub fn save(
        &mut self,
        old_title: &str,
        new_title: &str,
        text: &str,
        tags: &str,
    ) -> Result<bool, JsValue> {
        self.wiki
            .save_tiddler(old_title, new_title, text, tags)
            .map_err(|e| js_error("Save error", e))
    }

    pub fn delete(&mut self, title: &str) -> bool {
        self.wiki.delete_tiddler(title)
    }

    /// JSON array of titles: `all`, `tag`, `missing`, `orphans` or `shadowed`
    pub fn list(&self, kind: &str, tag: Option<String>) -> Result<String, JsValue> {
        let titles = match (kind, tag) {
            ("all", _) => self.wiki.list_all(),
            ("tag", Some(tag)) => self.wiki.list_by_tag(&tag),
            ("missing", _) => self.wiki.list_missing(),
            ("orphans", _) => self.wiki.list_orphans(),
            ("shadowed", _) => self.wiki.list_shadowed(),
            (kind, _) => return Err(js_error("Unknown list", kind)),
        };
        to_json(&titles)
    }

    /// JSON array of matching titles
    pub fn search(
        &self,
        pattern: &str,
        case_sensitive: bool,
        regex: bool,
    ) -> Result<String, JsValue> {
        let titles = self
            .wiki
            .search(pattern, case_sensitive, regex)
            .map_err(|e| js_error("Search error", e))?;
        to_json(&titles)
    }

    #[wasm_bindgen(js_name = setOption)]
    pub fn set_option(&mut self, name: &str, value: &str) {
        self.wiki.set_option(name, value);
    }

    pub fn option(&self, name: &str) -> Option<String> {
        self.wiki.option(name)
    }

    /// Advance running animations one step, returning how many remain
    #[wasm_bindgen(js_name = tickAnimations)]
    pub fn tick_animations(&mut self) -> usize {
        self.wiki.tick_animations()
    }
}
