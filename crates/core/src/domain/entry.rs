use serde::{Deserialize, Serialize};

/// A named cell of the leaderboard, optionally linking somewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: Option<String>,
}

impl Link {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }
}

/// One row of the leaderboard table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub character: Link,
    pub guild: Link,
    pub realm: Link,
    /// Display label of the listing time, kept verbatim.
    pub date: Option<String>,
}

impl Entry {
    /// Two rows describe the same listing when the character name and the date label agree.
    /// Guild, realm and urls are ignored.
    pub fn same_listing(&self, other: &Entry) -> bool {
        self.character.name == other.character.name && self.date == other.date
    }

    /// Realm as it appears in profile urls (`dun-modr`, not `Dun Modr`).
    ///
    /// Taken from the last segment of the realm link (`/gearscore/eu/<realm>`), then from the
    /// character link (`/character/<region>/<realm>/<name>`); the display name is used only
    /// when neither link is present.
    pub fn realm_slug(&self) -> &str {
        let from_realm = self
            .realm
            .url
            .as_deref()
            .and_then(|url| path_segments(url).last());
        let from_character = || {
            self.character
                .url
                .as_deref()
                .and_then(|url| path_segments(url).nth(2))
        };

        from_realm
            .or_else(from_character)
            .unwrap_or(self.realm.name.as_str())
    }
}

fn path_segments(url: &str) -> impl Iterator<Item = &str> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map_or("", |(_, p)| p))
        .unwrap_or(path);
    path.split('/').filter(|segment| !segment.is_empty())
}
