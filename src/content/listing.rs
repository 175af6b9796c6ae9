//! Recency ordering and pagination of post lists

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;

use super::PostRecord;

/// Page size used when the caller asks for a non-positive one
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Timestamp format of the `lastmod` field
pub const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// One page of posts plus the size of the whole result
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostRecord>,
    #[serde(rename = "totalCount")]
    pub total: usize,
}

/// Parsed sort keys of one post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecencyKey {
    lastmod: Option<DateTime<FixedOffset>>,
    date: Option<NaiveDate>,
}

impl RecencyKey {
    fn of(record: &PostRecord) -> Self {
        Self {
            lastmod: parse_lastmod(&record.lastmod),
            date: parse_date(&record.date),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.lastmod, other.lastmod) {
            return b.cmp(&a);
        }
        if let (Some(a), Some(b)) = (self.date, other.date) {
            return b.cmp(&a);
        }
        Ordering::Equal
    }
}

/// Compare two posts newest first.
///
/// `lastmod` decides when both parse, then `date`; otherwise the pair is
/// considered equal. This is not a total order.
pub fn compare_recency(a: &PostRecord, b: &PostRecord) -> Ordering {
    RecencyKey::of(a).compare(&RecencyKey::of(b))
}

/// Run length sorted by insertion before merging
const INSERTION_RUN: usize = 20;

/// Stable sort, newest first.
///
/// Keys are parsed once per record. The merge sort only ever asks whether
/// one key is greater than another, so it stays well defined even though
/// `compare_recency` is not transitive across records that mix missing and
/// present timestamps.
pub fn sort_by_recency(records: &mut Vec<PostRecord>) {
    let keys: Vec<RecencyKey> = records.iter().map(RecencyKey::of).collect();
    let order = stable_order(&keys);

    let mut slots: Vec<Option<PostRecord>> =
        std::mem::take(records).into_iter().map(Some).collect();
    *records = order.into_iter().filter_map(|i| slots[i].take()).collect();
}

/// Indices of `keys` in stable sorted order: insertion-sorted runs, then
/// bottom-up merges
fn stable_order(keys: &[RecencyKey]) -> Vec<usize> {
    let after = |a: usize, b: usize| keys[a].compare(&keys[b]) == Ordering::Greater;
    let len = keys.len();
    let mut order: Vec<usize> = (0..len).collect();

    for run in order.chunks_mut(INSERTION_RUN) {
        for i in 1..run.len() {
            let mut j = i;
            while j > 0 && after(run[j - 1], run[j]) {
                run.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    let mut merged = Vec::with_capacity(len);
    let mut width = INSERTION_RUN;
    while width < len {
        merged.clear();
        for start in (0..len).step_by(2 * width) {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j) = (start, mid);
            while i < mid && j < end {
                if after(order[i], order[j]) {
                    merged.push(order[j]);
                    j += 1;
                } else {
                    merged.push(order[i]);
                    i += 1;
                }
            }
            merged.extend_from_slice(&order[i..mid]);
            merged.extend_from_slice(&order[j..end]);
        }
        std::mem::swap(&mut order, &mut merged);
        width *= 2;
    }

    order
}

/// Slice one page out of `records`; `page` is 1-based
pub fn paginate(records: Vec<PostRecord>, page: i64, page_size: i64) -> PostPage {
    let total = records.len();
    let page = page.max(1) as usize;
    let page_size = if page_size <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size as usize
    };

    let start = (page - 1).saturating_mul(page_size);
    if start >= total {
        return PostPage {
            posts: Vec::new(),
            total,
        };
    }

    let end = start.saturating_add(page_size).min(total);
    let posts = records.into_iter().skip(start).take(end - start).collect();
    PostPage { posts, total }
}

fn parse_lastmod(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_str(value, LASTMOD_FORMAT).ok()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
