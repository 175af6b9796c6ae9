//! Front-matter encoding and best-effort decoding

use std::fs;
use std::path::Path;

use super::PostRecord;
use crate::media;

const DELIMITER: &str = "---";

/// Render a post as a `---` delimited front-matter block followed by its body
pub fn encode(record: &PostRecord) -> String {
    let mut out = String::from("---\n");

    out.push_str(&format!("title: \"{}\"\n", escape(&record.title)));
    out.push_str(&format!("date: {}\n", record.date));
    out.push_str(&format!("lastmod: {}\n", record.lastmod));
    out.push_str(&format!("description: \"{}\"\n", escape(&record.description)));

    if !record.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", inline_list(&record.tags)));
    }

    out.push_str(&format!("author: {}\n", inline_list([&record.author])));

    if !record.cover_image.is_empty() {
        out.push_str("cover:\n");
        out.push_str(&format!("    image: {}\n", record.cover_image));
        out.push_str(&format!("    hiddenInList: {}\n", record.hidden_in_list));
    }

    if !record.keywords.is_empty() {
        out.push_str("keywords:\n");
        for keyword in &record.keywords {
            out.push_str(&format!("    - \"{}\"\n", escape(keyword)));
        }
    }

    out.push_str(&format!("weight: {}\n", record.weight));

    if !record.slug.is_empty() {
        out.push_str(&format!("slug: \"{}\"\n", escape(&record.slug)));
    }

    out.push_str("---\n\n");
    out.push_str(&record.body);
    out
}

/// Parse a post from its file content.
///
/// Never fails: content without a complete front-matter block decodes to a
/// record holding only `fallback_title`.
pub fn decode(content: &str, fallback_title: &str) -> PostRecord {
    let Some((front, body)) = split_front_matter(content) else {
        return PostRecord::new(fallback_title);
    };

    let mut scanner = Scanner::new();
    for line in front.lines() {
        scanner.feed(line);
    }

    let mut record = scanner.record;
    if record.title.is_empty() {
        record.title = fallback_title.to_string();
    }
    record.body = body.to_string();
    record
}

/// Read and decode a post file, resolving the cover image against `site_root`
pub fn decode_file(path: &Path, site_root: Option<&Path>) -> PostRecord {
    let fallback_title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let mut record = match fs::read_to_string(path) {
        Ok(content) => decode(&content, fallback_title),
        Err(e) => {
            tracing::warn!("Failed to read post {:?}: {}", path, e);
            return PostRecord::new(fallback_title);
        }
    };

    if let Some(root) = site_root {
        load_cover(&mut record, root);
    }

    record
}

/// Read the cover image of `record` from `site_root/static` for previews.
///
/// A missing or unreadable image leaves the inline bytes empty.
pub fn load_cover(record: &mut PostRecord, site_root: &Path) {
    if record.cover_image.is_empty() {
        return;
    }

    let cover_path = media::static_path(site_root, &record.cover_image);
    match fs::read(&cover_path) {
        Ok(bytes) => record.cover_image_inline = Some(bytes),
        Err(e) => tracing::debug!("Cover image {:?} unavailable: {}", cover_path, e),
    }
}

/// Split content into (front matter, body) on the first two delimiter lines
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if !is_delimiter(first) {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if is_delimiter(line) {
            let front = &content[start..offset];
            let rest = &content[offset + line.len()..];
            // the encoder separates the block from the body with one blank line
            let body = rest
                .strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .unwrap_or(rest);
            return Some((front, body));
        }
        offset += line.len();
    }

    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Root,
    InKeywordsList,
    InCoverBlock,
}

/// Line scanner over the front-matter region
struct Scanner {
    state: ScanState,
    record: PostRecord,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: ScanState::Root,
            record: PostRecord::new(""),
        }
    }

    fn feed(&mut self, line: &str) {
        let consumed = match self.state {
            ScanState::Root => false,
            ScanState::InKeywordsList => self.scan_keyword_item(line),
            ScanState::InCoverBlock => self.scan_cover_field(line),
        };

        if !consumed {
            self.state = ScanState::Root;
            self.scan_root(line);
        }
    }

    fn scan_root(&mut self, line: &str) {
        let Some((key, value)) = line.trim().split_once(':') else {
            return;
        };

        let record = &mut self.record;
        match key {
            "title" => record.title = scalar(value),
            "date" => record.date = scalar(value),
            "lastmod" => record.lastmod = scalar(value),
            "slug" => record.slug = scalar(value),
            "description" => record.description = scalar(value),
            "weight" => record.weight = scalar(value).parse().unwrap_or_default(),
            "tags" => record.tags = list_or_scalar(value),
            "author" => record.author = list_or_scalar(value).join(", "),
            "keywords" => {
                if value.trim().is_empty() {
                    self.state = ScanState::InKeywordsList;
                } else {
                    record.keywords = list_or_scalar(value).into_iter().collect();
                }
            }
            "cover" => self.state = ScanState::InCoverBlock,
            _ => {}
        }
    }

    /// Returns false when the line ends the list
    fn scan_keyword_item(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if let Some(item) = trimmed.strip_prefix('-') {
            let keyword = scalar(item);
            if !keyword.is_empty() {
                self.record.keywords.insert(keyword);
            }
            return true;
        }

        trimmed.is_empty() || is_indented(line)
    }

    /// Returns false when the line ends the block
    fn scan_cover_field(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return true;
        }
        if !is_indented(line) {
            return false;
        }

        if let Some(value) = trimmed.strip_prefix("image:") {
            self.record.cover_image = scalar(value);
        } else if let Some(value) = trimmed.strip_prefix("hiddenInList:") {
            self.record.hidden_in_list = scalar(value).eq_ignore_ascii_case("true");
        }
        true
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Trim a value and strip one layer of double quotes, unescaping inside them
fn scalar(value: &str) -> String {
    let value = value.trim();
    match value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    {
        Some(inner) => unescape(inner),
        None => value.to_string(),
    }
}

/// Parse an inline YAML list, or treat a bare value as a single item
fn list_or_scalar(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }
    if !value.starts_with('[') {
        return vec![scalar(value)];
    }

    match serde_yaml::from_str::<Vec<String>>(value) {
        Ok(items) => items,
        Err(e) => {
            tracing::debug!("Ignoring malformed inline list {:?}: {}", value, e);
            Vec::new()
        }
    }
}

fn inline_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted: Vec<String> = items
        .into_iter()
        .map(|item| format!("\"{}\"", escape(item.as_ref())))
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
