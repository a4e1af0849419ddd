use crate::segments::WordSegment;

/// Forward steps tried by [`locate_from`] before falling back to a full search.
pub const DEFAULT_MAX_FORWARD_SCAN: usize = 8;

/// Index of the word being spoken at `time`.
///
/// Inside a word's `[start, end)` interval that word is returned; in the
/// silence between two words the preceding word stays active. `None` when
/// there are no words or `time` precedes the first one.
pub fn locate(words: &[WordSegment], time: f64) -> Option<usize> {
    words
        .partition_point(|w| w.start_time <= time)
        .checked_sub(1)
}

/// Same result as [`locate`], starting from the previously known index.
///
/// Forward playback usually stays inside the current word or crosses one or
/// two words per tick, so this checks the hint, then steps forward at most
/// `max_scan` words, and only then binary-searches.
pub fn locate_from(
    words: &[WordSegment],
    hint: Option<usize>,
    time: f64,
    max_scan: usize,
) -> Option<usize> {
    let Some(mut index) = hint.filter(|&i| i < words.len()) else {
        return locate(words, time);
    };

    if time.is_nan() || time < words[index].start_time {
        return locate(words, time);
    }

    let mut steps = 0;
    while index + 1 < words.len() && words[index + 1].start_time <= time {
        if steps == max_scan {
            return locate(words, time);
        }
        index += 1;
        steps += 1;
    }
    Some(index)
}
