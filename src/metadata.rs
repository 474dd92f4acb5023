use chrono::{DateTime, NaiveDateTime};
use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::media::MediaKind;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Seconds between the MP4 epoch (1904-01-01) and the Unix epoch.
const MP4_EPOCH_OFFSET: i64 = 2_082_844_800;

/// What the extractor learned about a file's creation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateLookup {
    Found(String),
    Missing,
    /// Video whose container and first stream disagree on creation time.
    Inconsistent { container: String, stream: String },
}

impl DateLookup {
    pub fn into_timestamp(self) -> Option<String> {
        match self {
            DateLookup::Found(ts) => Some(ts),
            DateLookup::Missing | DateLookup::Inconsistent { .. } => None,
        }
    }
}

pub fn lookup_date(path: &Path, kind: MediaKind) -> DateLookup {
    match kind {
        MediaKind::Image => lookup_image_date(path),
        MediaKind::Video => lookup_video_date(path),
        MediaKind::Other => DateLookup::Missing,
    }
}

/// EXIF `DateTimeOriginal`, normalised to `YYYY-MM-DD HH:MM:SS`.
pub fn lookup_image_date(path: &Path) -> DateLookup {
    let Ok(file) = fs::File::open(path) else {
        return DateLookup::Missing;
    };
    let mut reader = BufReader::new(file);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut reader) else {
        return DateLookup::Missing;
    };
    let Some(field) = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY) else {
        return DateLookup::Missing;
    };
    let val = field.display_value().to_string();
    match NaiveDateTime::parse_from_str(&val, TIMESTAMP_FORMAT) {
        Ok(dt) => DateLookup::Found(dt.format(TIMESTAMP_FORMAT).to_string()),
        Err(_) => DateLookup::Missing,
    }
}

/// Creation time from the movie header, cross-checked against the media
/// header of the first track. Reported in UTC.
pub fn lookup_video_date(path: &Path) -> DateLookup {
    let Some((container, stream)) = read_mp4_creation_times(path) else {
        return DateLookup::Missing;
    };
    let Some(container) = mp4_time_to_string(container) else {
        return DateLookup::Missing;
    };
    match stream.and_then(mp4_time_to_string) {
        Some(stream) if stream != container => DateLookup::Inconsistent { container, stream },
        Some(_) => DateLookup::Found(container),
        None => DateLookup::Missing,
    }
}

fn read_mp4_creation_times(path: &Path) -> Option<(u64, Option<u64>)> {
    let file = fs::File::open(path).ok()?;
    let size = file.metadata().ok()?.len();
    let reader = BufReader::new(file);
    let mp4_file = mp4::Mp4Reader::read_header(reader, size).ok()?;

    let container = mp4_file.moov.mvhd.creation_time;
    let stream = mp4_file
        .tracks()
        .iter()
        .min_by_key(|(id, _)| **id)
        .map(|(_, track)| track.trak.mdia.mdhd.creation_time);
    Some((container, stream))
}

fn mp4_time_to_string(seconds: u64) -> Option<String> {
    if seconds == 0 {
        return None;
    }
    let unix = i64::try_from(seconds).ok()? - MP4_EPOCH_OFFSET;
    let dt = DateTime::from_timestamp(unix, 0)?;
    Some(dt.naive_utc().format(TIMESTAMP_FORMAT).to_string())
}
