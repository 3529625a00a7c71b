use crate::config::WikiConfig;
use crate::errors::{WorkspaceError, WorkspaceResult};
use crate::view::{RenderSettings, SharedSettings, SharedView, View};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use tiddly_animation::{Animation, AnimationId, Scheduler, Timing};
use tiddly_persistence::{
    hydrate, write_store_area, Forwarder, GatewayRequest, PersistencePort, SaveRequest,
};
use tiddly_store::{
    format_tag_list, parse_tag_list, ChangeNotice, Query, SearchSpec, SortField, Subscription,
    SubscriptionHandle, TiddlerStore,
};
use tiddly_wikifier::{wikify, Node, Options};
use tracing::{debug, info, instrument};

struct OpenView {
    view: SharedView,
    handle: SubscriptionHandle,
}

type SharedStory = Rc<RefCell<Vec<SharedView>>>;

/// A running wiki: the store, the story of open views, user options, the
/// animation scheduler and the persistence forwarder.
///
/// ```text
/// save_tiddler ──→ TiddlerStore::upsert ──notify──→ view callbacks re-render
///        └──────→ Forwarder ──→ PersistencePort (fire-and-forget)
/// ```
pub struct Wiki {
    store: TiddlerStore,
    config: WikiConfig,
    settings: SharedSettings,
    story: Vec<OpenView>,
    /// Every open view, shared with the blanket-refresh subscription
    shared_story: SharedStory,
    forwarder: Option<Forwarder>,
    scheduler: Scheduler,
    timing: Timing,
}

impl Wiki {
    pub fn new(config: WikiConfig) -> WorkspaceResult<Self> {
        let timing = config.timing()?;
        let settings = Rc::new(RefCell::new(RenderSettings {
            options: config.initial_options(),
            auto_link_wiki_words: config.auto_link_wiki_words,
            touched_since: None,
            now: None,
        }));
        let shared_story = SharedStory::default();

        let mut store = TiddlerStore::new();
        store.set_exclude_lists_tag(config.exclude_lists_tag.clone());
        store.subscribe(
            Subscription::All,
            blanket_refresh(shared_story.clone(), settings.clone()),
        );

        Ok(Self {
            store,
            config,
            settings,
            story: Vec::new(),
            shared_story,
            forwarder: None,
            scheduler: Scheduler::with_timing(timing),
            timing,
        })
    }

    /// Forward every accepted mutation to `port`
    pub fn with_gateway(mut self, port: Box<dyn PersistencePort>) -> Self {
        self.forwarder = Some(Forwarder::new(port));
        self
    }

    pub fn store(&self) -> &TiddlerStore {
        &self.store
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn forwarder(&self) -> Option<&Forwarder> {
        self.forwarder.as_ref()
    }

    /// Load the page's store area, then refresh anything already open
    #[instrument(skip_all)]
    pub fn hydrate(&mut self, page: &str) -> WorkspaceResult<usize> {
        let count = hydrate(page, &mut self.store)?;
        self.store.notify_all();
        Ok(count)
    }

    /// The page with its store area rewritten from the live tiddlers
    pub fn export_store_area(&self, page: &str) -> WorkspaceResult<String> {
        Ok(write_store_area(page, self.store.tiddlers())?)
    }

    // Options

    pub fn option(&self, name: &str) -> Option<String> {
        self.settings.borrow().options.get(name).map(str::to_string)
    }

    pub fn options(&self) -> Options {
        self.settings.borrow().options.clone()
    }

    pub fn set_option(&mut self, name: &str, value: &str) {
        self.settings.borrow_mut().options.set(name, value);
    }

    pub fn set_touched_since(&mut self, since: Option<DateTime<Utc>>) {
        self.settings.borrow_mut().touched_since = since;
    }

    /// Pin the render clock (the wall clock when `None`)
    pub fn set_clock(&mut self, now: Option<DateTime<Utc>>) {
        self.settings.borrow_mut().now = now;
    }

    /// Name edits are signed with
    pub fn user_name(&self) -> String {
        self.option("txtUserName")
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.config.user_name.clone())
    }

    // Rendering

    /// One-off render of arbitrary markup against the store
    pub fn render_text(&self, source: &str) -> Vec<Node> {
        let settings = self.settings.borrow();
        wikify(source, &settings.context(&self.store))
    }

    /// One-off render of a tiddler (live or shadow)
    pub fn render(&self, title: &str) -> Option<Vec<Node>> {
        let text = self.store.text_of(title)?;
        let settings = self.settings.borrow();
        Some(wikify(text, &settings.context(&self.store).for_tiddler(title)))
    }

    // Story

    /// Open a view on `title`, or return the one already open
    pub fn display(&mut self, title: &str) -> SharedView {
        self.display_highlighted(title, None)
    }

    /// Open a view with search matches highlighted
    pub fn display_highlighted(&mut self, title: &str, highlight: Option<&str>) -> SharedView {
        if let Some(open) = self.find(title) {
            return open.view.clone();
        }

        let view = Rc::new(RefCell::new(View::new(title, highlight.map(str::to_string))));
        view.borrow_mut().render(&self.store, &self.settings.borrow());
        let handle = self.subscribe_view(title, &view);
        self.story.push(OpenView {
            view: view.clone(),
            handle,
        });
        self.shared_story.borrow_mut().push(view.clone());
        debug!(title, open = self.story.len(), "Displayed tiddler");
        view
    }

    pub fn view(&self, title: &str) -> Option<SharedView> {
        self.find(title).map(|open| open.view.clone())
    }

    pub fn open_titles(&self) -> Vec<String> {
        self.story
            .iter()
            .map(|open| open.view.borrow().title().to_string())
            .collect()
    }

    pub fn close(&mut self, title: &str) -> bool {
        let Some(index) = self.position(title) else {
            return false;
        };
        let open = self.story.remove(index);
        self.store.unsubscribe(open.handle);
        self.shared_story
            .borrow_mut()
            .retain(|view| !Rc::ptr_eq(view, &open.view));
        debug!(title, "Closed tiddler");
        true
    }

    pub fn close_all(&mut self) -> usize {
        let titles = self.open_titles();
        titles.iter().filter(|title| self.close(title)).count()
    }

    /// Re-render every open view
    pub fn refresh_all(&mut self) {
        self.store.notify_all();
    }

    fn find(&self, title: &str) -> Option<&OpenView> {
        self.story.iter().find(|open| open.view.borrow().title() == title)
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.story
            .iter()
            .position(|open| open.view.borrow().title() == title)
    }

    fn subscribe_view(&mut self, title: &str, view: &SharedView) -> SubscriptionHandle {
        let view = Rc::downgrade(view);
        let settings = self.settings.clone();
        self.store.subscribe(
            Subscription::Title(title.to_string()),
            Box::new(move |store: &TiddlerStore, _: &ChangeNotice| {
                if let Some(view) = view.upgrade() {
                    view.borrow_mut().render(store, &settings.borrow());
                }
            }),
        )
    }

    // Mutations

    /// Save edits to a tiddler.
    ///
    /// Returns `false` when nothing changed: the store, the views and the
    /// gateway are left alone. A view open on `old_title` follows the rename.
    #[instrument(skip(self, text, tags))]
    pub fn save_tiddler(
        &mut self,
        old_title: &str,
        new_title: &str,
        text: &str,
        tags: &str,
    ) -> WorkspaceResult<bool> {
        if new_title.trim().is_empty() {
            return Err(WorkspaceError::EmptyTitle);
        }
        let tags = parse_tag_list(tags);
        if let Some(existing) = self.store.tiddler(old_title) {
            if !existing.differs_from(new_title, text, &tags) {
                debug!("Unchanged, not saving");
                return Ok(false);
            }
        }

        if old_title != new_title {
            self.close(new_title);
            if let Some(index) = self.position(old_title) {
                let open = self.story.remove(index);
                self.store.unsubscribe(open.handle);
                open.view.borrow_mut().retitle(new_title);
                let handle = self.subscribe_view(new_title, &open.view);
                self.story.insert(index, OpenView { view: open.view, handle });
            }
        }

        let modifier = self.user_name();
        let tag_list = format_tag_list(&tags);
        self.store
            .upsert(old_title, new_title, text, &modifier, tags, None);

        if let Some(forwarder) = self.forwarder.as_mut() {
            forwarder.forward(GatewayRequest::Save(SaveRequest::new(
                old_title, new_title, text, modifier, tag_list,
            )));
        }
        info!(title = new_title, "Saved tiddler");
        Ok(true)
    }

    /// Close and delete a live tiddler; shadows survive
    #[instrument(skip(self))]
    pub fn delete_tiddler(&mut self, title: &str) -> bool {
        self.close(title);
        if self.store.remove(title).is_none() {
            return false;
        }
        if let Some(forwarder) = self.forwarder.as_mut() {
            forwarder.forward(GatewayRequest::Delete {
                title: title.to_string(),
            });
        }
        true
    }

    // Queries

    /// Live titles, minus those tagged with the lists exclusion tag
    pub fn list_all(&self) -> Vec<String> {
        self.titles_of(&Query::ByTag {
            tag: self.config.exclude_lists_tag.clone(),
            invert: true,
        })
        .unwrap_or_default()
    }

    pub fn list_by_tag(&self, tag: &str) -> Vec<String> {
        self.titles_of(&Query::ByTag {
            tag: tag.to_string(),
            invert: false,
        })
        .unwrap_or_default()
    }

    pub fn list_missing(&self) -> Vec<String> {
        self.store.missing_titles()
    }

    pub fn list_orphans(&self) -> Vec<String> {
        self.store.orphan_titles()
    }

    pub fn list_shadowed(&self) -> Vec<String> {
        self.store.shadowed_titles()
    }

    /// Titles whose title or body match, skipping the search exclusion tag
    pub fn search(
        &self,
        pattern: &str,
        case_sensitive: bool,
        regex: bool,
    ) -> WorkspaceResult<Vec<String>> {
        self.titles_of(&Query::Search(SearchSpec {
            pattern: pattern.to_string(),
            case_sensitive,
            regex,
            exclude_tag: Some(self.config.exclude_search_tag.clone()),
        }))
    }

    fn titles_of(&self, query: &Query) -> WorkspaceResult<Vec<String>> {
        Ok(self
            .store
            .query(query, SortField::Title)?
            .into_iter()
            .map(|t| t.title.clone())
            .collect())
    }

    // Animation

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Start `animation` when `chkAnimate` is on; otherwise jump straight to
    /// its final frame and return `None`.
    pub fn animate(&mut self, mut animation: Box<dyn Animation>) -> WorkspaceResult<Option<AnimationId>> {
        if self.settings.borrow().options.flag("chkAnimate") {
            Ok(Some(self.scheduler.start(animation)?))
        } else {
            animation.stop();
            Ok(None)
        }
    }

    pub fn tick_animations(&mut self) -> usize {
        self.scheduler.tick()
    }
}

impl std::fmt::Debug for Wiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wiki")
            .field("tiddlers", &self.store.len())
            .field("open", &self.story.len())
            .field("forwarder", &self.forwarder)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

/// Deleting a tiddler can change how every other view renders its links
fn blanket_refresh(story: SharedStory, settings: SharedSettings) -> tiddly_store::ChangeCallback {
    Box::new(move |store: &TiddlerStore, notice: &ChangeNotice| {
        // title-less notices already reach every view through its own subscription
        let Some(changed) = notice.title.as_deref() else {
            return;
        };
        for view in story.borrow().iter() {
            let mut view = view.borrow_mut();
            if view.title() != changed {
                view.render(store, &settings.borrow());
            }
        }
    })
}
