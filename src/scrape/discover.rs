//! Article link discovery from a Medium tag feed.
//!
//! Fetches an RSS 2.0 or Atom feed, pulls out each entry's link, and merges
//! the links into a single-column (`link`) CSV. Existing rows keep their
//! order, new links are appended, and duplicates are dropped on `link`.

use crate::error::DiscoverError;
use crate::scrape::fetcher::Fetch;
use itertools::Itertools;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize, Serialize)]
struct LinkRow {
    link: String,
}

/// Fetch `feed_url` and return the entry links in feed order.
#[instrument(level = "info", skip(fetcher))]
pub async fn discover_links<F: Fetch>(
    fetcher: &F,
    feed_url: &str,
) -> Result<Vec<String>, DiscoverError> {
    let xml = fetcher.fetch(feed_url).await?;
    let links = parse_feed_links(&xml)?;
    info!(count = links.len(), "Discovered feed links");
    Ok(links)
}

/// Extract entry links from RSS (`<item><link>`) or Atom
/// (`<entry><link href>`) XML.
pub fn parse_feed_links(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut links = Vec::new();
    let mut in_entry = false;
    let mut entry_link: Option<String> = None;
    let mut link_text: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"item" | b"entry" => {
                    in_entry = true;
                    entry_link = None;
                }
                b"link" if in_entry => {
                    if let Some(href) = alternate_href(&e) {
                        entry_link.get_or_insert(href);
                    } else {
                        link_text = Some(String::new());
                    }
                }
                _ => {}
            },
            Event::Empty(e) if in_entry && e.name().as_ref() == b"link" => {
                if let Some(href) = alternate_href(&e) {
                    entry_link.get_or_insert(href);
                }
            }
            Event::Text(t) => {
                if let Some(buf) = link_text.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::CData(t) => {
                if let Some(buf) = link_text.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::GeneralRef(r) => {
                if let Some(buf) = link_text.as_mut() {
                    buf.push('&');
                    buf.push_str(&String::from_utf8_lossy(&r));
                    buf.push(';');
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"link" => {
                    if let Some(raw) = link_text.take() {
                        let text = unescape_lossy(raw.trim());
                        if !text.is_empty() {
                            entry_link.get_or_insert(text);
                        }
                    }
                }
                b"item" | b"entry" => {
                    in_entry = false;
                    if let Some(link) = entry_link.take() {
                        links.push(link);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(links)
}

/// `href` of an Atom link whose `rel` is missing or `alternate`.
fn alternate_href(e: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut rel_ok = true;
    for attr in e.attributes().flatten() {
        let value = unescape_lossy(&String::from_utf8_lossy(&attr.value));
        match attr.key.as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel_ok = value == "alternate",
            _ => {}
        }
    }
    href.filter(|h| rel_ok && !h.is_empty())
}

fn unescape_lossy(raw: &str) -> String {
    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Merge `new_links` into the links CSV at `path`.
///
/// A missing file is treated as empty. The file is rewritten in full and the
/// total number of unique links is returned.
#[instrument(level = "info", skip(new_links), fields(path = %path.display(), new = new_links.len()))]
pub fn merge_links(path: &Path, new_links: &[String]) -> Result<usize, DiscoverError> {
    let existing = read_links(path)?;
    let before = existing.len();

    let combined: Vec<String> = existing
        .into_iter()
        .chain(new_links.iter().cloned())
        .unique()
        .collect();

    let csv_err = |source| DiscoverError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for link in &combined {
        writer
            .serialize(LinkRow { link: link.clone() })
            .map_err(csv_err)?;
    }
    if combined.is_empty() {
        writer.write_record(["link"]).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| DiscoverError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(before, after = combined.len(), "Merged link list");
    Ok(combined.len())
}

fn read_links(path: &Path) -> Result<Vec<String>, DiscoverError> {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) if is_not_found(&e) => return Ok(Vec::new()),
        Err(source) => {
            return Err(DiscoverError::Csv {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    reader
        .deserialize::<LinkRow>()
        .map_ok(|row| row.link)
        .collect::<Result<_, _>>()
        .map_err(|source| DiscoverError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn is_not_found(e: &csv::Error) -> bool {
    matches!(e.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound)
}
