//! Language negotiation module
//!
//! Parses `Accept-Language` / `Accept-Charset` and picks the best
//! available language for a request.

use std::cmp::Ordering;

/// Parse a weighted accept list (`fr-CH, fr;q=0.9, en;q=0.8, *;q=0.5`)
///
/// Entries are lower-cased and ordered by descending `q` (ties keep header
/// order). Entries with `q=0`, empty entries and the `*` wildcard are dropped.
pub fn parse_accept_list(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim().to_ascii_lowercase();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let mut quality = 1.0_f32;
            for param in parts {
                if let Some((key, value)) = param.split_once('=') {
                    if key.trim() == "q" {
                        quality = value.trim().parse::<f32>().map_or(0.0, |q| q.clamp(0.0, 1.0));
                    }
                }
            }

            (quality > 0.0).then_some((tag, quality))
        })
        .collect();

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    entries.into_iter().map(|(tag, _)| tag).collect()
}

/// Languages the client prefers, best first
///
/// A regional tag (`en-us`) is followed by its primary language (`en`)
/// unless the client listed that one itself.
pub fn preferred_languages(accept_language: Option<&str>) -> Vec<String> {
    let listed = accept_language.map(parse_accept_list).unwrap_or_default();
    let mut languages = Vec::with_capacity(listed.len());

    for tag in &listed {
        if !languages.contains(tag) {
            languages.push(tag.clone());
        }
        if let Some((primary, _)) = tag.split_once('-') {
            let primary = primary.to_string();
            if !listed.contains(&primary) && !languages.contains(&primary) {
                languages.push(primary);
            }
        }
    }

    languages
}

/// Charsets the client accepts, best first (`utf-8` when none are stated)
pub fn preferred_charsets(accept_charset: Option<&str>) -> Vec<String> {
    let charsets = accept_charset.map(parse_accept_list).unwrap_or_default();
    if charsets.is_empty() {
        vec!["utf-8".to_string()]
    } else {
        charsets
    }
}

/// Picks one of the available languages for a client
pub trait Negotiator: Send + Sync {
    fn negotiate(
        &self,
        available: &[&str],
        languages: &[String],
        charsets: &[String],
    ) -> Option<String>;
}

/// Returns the first preferred language that is available
///
/// Comparison ignores case; the available spelling is returned.
/// Charsets do not influence the choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceNegotiator;

impl Negotiator for PreferenceNegotiator {
    fn negotiate(
        &self,
        available: &[&str],
        languages: &[String],
        _charsets: &[String],
    ) -> Option<String> {
        languages.iter().find_map(|wanted| {
            available
                .iter()
                .find(|lang| lang.eq_ignore_ascii_case(wanted))
                .map(|lang| (*lang).to_string())
        })
    }
}
