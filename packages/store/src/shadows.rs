//! Built-in shadow defaults.
//!
//! A shadow supplies text for a title that has no live tiddler. Creating a
//! live tiddler with the same title overrides it; deleting the live tiddler
//! brings the shadow back.

use std::collections::BTreeMap;

/// Tiddlers carrying this tag are skipped by search
pub const EXCLUDE_SEARCH_TAG: &str = "excludeSearch";

/// Tiddlers carrying this tag are skipped by the orphan and `all` lists
pub const EXCLUDE_LISTS_TAG: &str = "excludeLists";

const SHADOWS: &[(&str, &str)] = &[
    ("SiteTitle", "My TiddlyWiki"),
    ("SiteSubtitle", "a reusable non-linear personal web notebook"),
    ("MainMenu", "GettingStarted"),
    ("DefaultTiddlers", "GettingStarted"),
    (
        "GettingStarted",
        "To get started with this blank TiddlyWiki, you'll need to modify the following tiddlers:\n\
         * SiteTitle & SiteSubtitle: The title and subtitle of the site\n\
         * MainMenu: The menu (usually on the left)\n\
         * DefaultTiddlers: Contains the names of the tiddlers that you want to appear when the TiddlyWiki is opened\n\
         You'll also need to enter your username for signing your edits: <<option txtUserName>>",
    ),
    (
        "SideBarOptions",
        "<<search>><<closeAll>><<permaview>><<newTiddler>><<newJournal 'DD MMM YYYY'>><<saveChanges>>\
         <<slider chkSliderOptionsPanel OptionsPanel options 'Change TiddlyWiki advanced options'>>",
    ),
    (
        "OptionsPanel",
        "These InterfaceOptions for customising TiddlyWiki are saved in your browser\n\n\
         Your username for signing your edits. Write it as a WikiWord (eg JoeBloggs)\n\n\
         <<option txtUserName>>\n\
         <<option chkRegExpSearch>> RegExpSearch\n\
         <<option chkCaseSensitiveSearch>> CaseSensitiveSearch\n\
         <<option chkAnimate>> EnableAnimations",
    ),
    (
        "SideBarTabs",
        "<<tabs txtMainTab Timeline Timeline TabTimeline All 'All tiddlers' TabAll Tags 'All tags' TabTags More 'More lists' TabMore>>",
    ),
    ("TabTimeline", "<<timeline>>"),
    ("TabAll", "<<list all>>"),
    ("TabTags", "<<allTags>>"),
    (
        "TabMore",
        "<<tabs txtMoreTab Missing 'Missing tiddlers' TabMoreMissing Orphans 'Orphaned tiddlers' TabMoreOrphans Shadowed 'Shadowed tiddlers' TabMoreShadowed>>",
    ),
    ("TabMoreMissing", "<<list missing>>"),
    ("TabMoreOrphans", "<<list orphans>>"),
    ("TabMoreShadowed", "<<list shadowed>>"),
];

/// The compiled-in shadow set
pub fn default_shadows() -> BTreeMap<String, String> {
    SHADOWS
        .iter()
        .map(|(title, text)| (title.to_string(), text.to_string()))
        .collect()
}
