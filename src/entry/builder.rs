//! Builder for `Entry`, mirroring `EntryBuilder`
//! (`src/indexer/entry/entry_builder.rs`): optional fields with a
//! `build() -> Result<Entry, &'static str>` that validates the ones the
//! spec calls required (`name`, `uri`, `location`, `kind`); `name_location`
//! defaults to `location` and `comments`/`visibility` have sensible
//! defaults so most call sites only set the four required fields.

use crate::entry::kind::EntryKind;
use crate::entry::{Entry, Visibility};
use crate::location::Location;
use crate::uri::Uri;

pub struct EntryBuilder {
    name: Option<String>,
    uri: Option<Uri>,
    location: Option<Location>,
    name_location: Option<Location>,
    comments: Option<String>,
    visibility: Visibility,
    kind: Option<EntryKind>,
}

impl EntryBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            uri: None,
            location: None,
            name_location: None,
            comments: None,
            visibility: Visibility::Public,
            kind: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn name_location(mut self, location: Location) -> Self {
        self.name_location = Some(location);
        self
    }

    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn build(self) -> Result<Entry, &'static str> {
        let name = self.name.ok_or("Entry name is required")?;
        let uri = self.uri.ok_or("Entry uri is required")?;
        let location = self.location.ok_or("Entry location is required")?;
        let kind = self.kind.ok_or("Entry kind is required")?;
        let name_location = self.name_location.unwrap_or(location);

        Ok(Entry {
            name,
            uri,
            location,
            name_location,
            comments: self.comments,
            visibility: self.visibility,
            kind,
        })
    }
}

impl Default for EntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
