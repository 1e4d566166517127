use chime_core::models::Track;

/// UTF-16 units per text field, including the NUL terminator.
pub const TEXT_CAPACITY: usize = 256;

/// Fixed-layout search record crossing the bridge boundary.
///
/// Hosts declare the matching struct as `{ int32, wchar[256], wchar[256] }`
/// with sequential layout; text fields are NUL-terminated and zero-padded.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TrackMetaRecord {
    pub id: i32,
    pub name: [u16; TEXT_CAPACITY],
    pub artist: [u16; TEXT_CAPACITY],
}

impl TrackMetaRecord {
    pub fn from_track(track: &Track) -> Self {
        Self {
            id: track.id.0,
            name: encode_text(&track.title),
            artist: encode_text(&track.artist),
        }
    }
}

/// Encode into a fixed UTF-16 field. Truncation is deterministic: the
/// longest prefix that fits ahead of the terminator wins, and a surrogate
/// pair is never split.
fn encode_text(value: &str) -> [u16; TEXT_CAPACITY] {
    let mut out = [0u16; TEXT_CAPACITY];
    let mut len = 0usize;
    let mut units = value.encode_utf16().peekable();
    while let Some(&unit) = units.peek() {
        let needed = if (0xD800..0xDC00).contains(&unit) { 2 } else { 1 };
        if len + needed > TEXT_CAPACITY - 1 {
            break;
        }
        for _ in 0..needed {
            if let Some(u) = units.next() {
                out[len] = u;
                len += 1;
            }
        }
    }
    out
}

/// Hand a record array to the caller. Zero tracks yields a null pointer and
/// zero count, which `release_records` accepts as a no-op.
pub(crate) fn allocate_records(tracks: &[Track]) -> (*mut TrackMetaRecord, i32) {
    if tracks.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let records: Box<[TrackMetaRecord]> =
        tracks.iter().map(TrackMetaRecord::from_track).collect();
    let count = records.len() as i32;
    (Box::into_raw(records) as *mut TrackMetaRecord, count)
}

/// Reclaim a record array previously returned by [`allocate_records`].
///
/// # Safety
///
/// `ptr` and `count` must come from one prior successful allocation that has
/// not been released yet. Null pointer or non-positive count is a no-op.
pub(crate) unsafe fn release_records(ptr: *mut TrackMetaRecord, count: i32) {
    if ptr.is_null() || count <= 0 {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, count as usize);
    drop(Box::from_raw(slice));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::models::{AlbumId, TrackId};

    fn field_text(field: &[u16]) -> String {
        let end = field.iter().position(|&u| u == 0).expect("terminator");
        String::from_utf16(&field[..end]).expect("valid utf-16")
    }

    fn track(id: i32, title: &str, artist: &str) -> Track {
        Track {
            id: TrackId::new(id),
            title: title.into(),
            artist: artist.into(),
            duration_ms: Some(180_000),
            album_id: Some(AlbumId::new("alb-1")),
        }
    }

    #[test]
    fn record_layout_is_fixed() {
        assert_eq!(std::mem::size_of::<TrackMetaRecord>(), 4 + 2 * 2 * 256);
        assert_eq!(std::mem::align_of::<TrackMetaRecord>(), 4);
    }

    #[test]
    fn short_text_is_terminated_and_zero_padded() {
        let record = TrackMetaRecord::from_track(&track(5, "Theme", "Band"));
        assert_eq!(record.id, 5);
        assert_eq!(field_text(&record.name), "Theme");
        assert!(record.name[5..].iter().all(|&u| u == 0));
    }

    #[test]
    fn long_text_truncates_to_capacity_deterministically() {
        let long_title = "a".repeat(300);
        let first = TrackMetaRecord::from_track(&track(1, &long_title, "x"));
        let second = TrackMetaRecord::from_track(&track(1, &long_title, "x"));
        assert_eq!(field_text(&first.name).len(), TEXT_CAPACITY - 1);
        assert_eq!(first.name, second.name);
        assert_eq!(first.name[TEXT_CAPACITY - 1], 0);
    }

    #[test]
    fn truncation_never_splits_a_surrogate_pair() {
        // Each note is one surrogate pair (two units); 130 of them exceed
        // the field, and the last pair that does not fit is dropped whole.
        let title = "\u{1F3B5}".repeat(130);
        let record = TrackMetaRecord::from_track(&track(1, &title, "x"));
        let used = record.name.iter().position(|&u| u == 0).expect("terminator");
        assert_eq!(used, 254);
        let decoded = field_text(&record.name);
        assert_eq!(decoded.chars().count(), 127);
        assert!(decoded.chars().all(|c| c == '\u{1F3B5}'));
    }

    #[test]
    fn allocate_and_release_round_trip() {
        let tracks = vec![track(1, "One", "A"), track(2, "Two", "B")];
        let (ptr, count) = allocate_records(&tracks);
        assert_eq!(count, 2);
        assert!(!ptr.is_null());

        let slice = unsafe { std::slice::from_raw_parts(ptr, count as usize) };
        assert_eq!(slice[0].id, 1);
        assert_eq!(field_text(&slice[1].name), "Two");

        unsafe { release_records(ptr, count) };
    }

    #[test]
    fn empty_result_allocates_nothing() {
        let (ptr, count) = allocate_records(&[]);
        assert!(ptr.is_null());
        assert_eq!(count, 0);
    }

    #[test]
    fn release_of_null_or_zero_is_a_no_op() {
        unsafe {
            release_records(std::ptr::null_mut(), 0);
            release_records(std::ptr::null_mut(), 10);
        }
        let (ptr, count) = allocate_records(&[track(1, "One", "A")]);
        unsafe {
            release_records(ptr, 0);
            release_records(ptr, count);
        }
    }
}
