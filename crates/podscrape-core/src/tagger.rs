//! Writing descriptive tags into downloaded files.

use std::path::Path;

use id3::frame::Comment;
use id3::{Tag, TagLike, Version};

use crate::episode::TagSet;
use crate::error::TagError;

/// Language code of the `COMM` frame (listing pages are French).
const COMMENT_LANG: &str = "fre";

pub trait TagWriter: Send + Sync {
    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), TagError>;
}

/// Writes an ID3v2.4 tag in front of the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3TagWriter;

impl Id3TagWriter {
    fn to_tag(tags: &TagSet) -> Tag {
        let mut tag = Tag::new();
        tag.set_album(tags.album.as_str());
        tag.set_title(tags.title.as_str());
        if let Some(artist) = &tags.artist {
            tag.set_artist(artist.as_str());
        }
        tag.set_year(tags.year);
        tag.set_text("TLEN", tags.length.as_str());
        tag.set_genre(tags.genre);
        tag.add_frame(Comment {
            lang: COMMENT_LANG.to_string(),
            description: String::new(),
            text: tags.comment.clone(),
        });
        if let Some(copyright) = &tags.copyright {
            tag.set_text("TCOP", copyright.as_str());
        }
        tag
    }
}

impl TagWriter for Id3TagWriter {
    fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), TagError> {
        Self::to_tag(tags)
            .write_to_path(path, Version::Id3v24)
            .map_err(|source| TagError::Id3 {
                path: path.to_path_buf(),
                source,
            })
    }
}
