//! Informational report listing what a download run would fetch.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub url: String,
    /// Canonical episode name (no extension).
    pub title: String,
}

/// Entries in the order they were collected. Renders as a PLS playlist:
///
/// ```text
/// [playlist]
/// File1=<url>
/// Title1=<name>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn push(&mut self, url: impl Into<String>, title: impl Into<String>) {
        self.entries.push(PlaylistEntry {
            url: url.into(),
            title: title.into(),
        });
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[playlist]")?;
        for (i, entry) in self.entries.iter().enumerate() {
            let n = i + 1;
            writeln!(f, "File{n}={}", entry.url)?;
            writeln!(f, "Title{n}={}", entry.title)?;
        }
        Ok(())
    }
}
