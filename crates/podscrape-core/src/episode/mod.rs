//! Episode records and everything derived from them.
//!
//! A listing page yields one `RawEpisodeRecord` per playable article (built
//! with `DownloadEntryBuilder`); each record resolves to a `DownloadContext`
//! right before it is downloaded or listed, and to a `TagSet` once the file is
//! on disk.

mod builder;
mod context;
mod record;
mod tags;

pub use builder::{
    integer, AttributeReader, AttributeValue, DataAttribute, DownloadEntryBuilder, EpisodeEntry,
    PropertyAttribute,
};
pub use context::{date_string, DownloadContext, NamingOptions};
pub use record::{keys, RawEpisodeRecord};
pub use tags::{format_duration, TagSet, PODCAST_GENRE};
