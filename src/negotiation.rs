//! Media type parsing and proactive content negotiation.
//!
//! [`MediaType`] is the parsed form of a `type/subtype; k=v` identifier.
//! [`select_content_type`] ranks registered types against an Accept-style
//! preference list using the standard precedence rules: an exact
//! `type/subtype` match beats `type/*`, which beats `*/*`; equally specific
//! matches are broken by declared quality weight, then by position in the
//! preference list.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
#[error("invalid media type {0:?}")]
pub struct MediaTypeError(pub String);

/// A parsed `type/subtype` identifier with optional parameters.
///
/// Type and subtype are stored lower-cased so comparisons are
/// case-insensitive. `*` is accepted in either position during parsing; it
/// only carries wildcard meaning inside negotiation, and the registry
/// rejects wildcard registration keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub content_type: String,
    pub content_subtype: String,
    pub parameters: Vec<(String, String)>,
}

impl MediaType {
    pub fn new(content_type: impl Into<String>, content_subtype: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into().to_ascii_lowercase(),
            content_subtype: content_subtype.into().to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    /// Parse `"type/subtype; k=v; ..."`, lower-casing type, subtype, and
    /// parameter names.
    pub fn parse(raw: &str) -> Result<Self, MediaTypeError> {
        let raw = raw.trim();
        let mime = mime::Mime::from_str(raw).map_err(|_| MediaTypeError(raw.to_owned()))?;
        let mut parameters = Vec::new();
        if let Some((_, rest)) = raw.split_once(';') {
            for piece in rest.split(';') {
                let Some((name, value)) = piece.split_once('=') else {
                    continue;
                };
                parameters.push((
                    name.trim().to_ascii_lowercase(),
                    value.trim().trim_matches('"').to_owned(),
                ));
            }
        }
        Ok(Self {
            content_type: mime.type_().as_str().to_ascii_lowercase(),
            content_subtype: mime.subtype().as_str().to_ascii_lowercase(),
            parameters,
        })
    }

    /// `true` if either position is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.content_type == "*" || self.content_subtype == "*"
    }

    /// The bare `type/subtype` string, without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.content_type, self.content_subtype)
    }

    /// How specifically `self` (a preference entry, possibly wildcarded)
    /// matches a concrete candidate: 2 for an exact match, 1 for `type/*`,
    /// 0 for `*/*`, `None` for no match.
    fn match_specificity(&self, candidate: &MediaType) -> Option<u8> {
        match (self.content_type.as_str(), self.content_subtype.as_str()) {
            ("*", "*") => Some(0),
            (t, "*") if t == candidate.content_type => Some(1),
            (t, s) if t == candidate.content_type && s == candidate.content_subtype => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.content_type, self.content_subtype)?;
        for (name, value) in &self.parameters {
            write!(f, "; {name}={value}")?;
        }
        Ok(())
    }
}

/// One Accept header entry: a media type with its quality weight.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedType {
    pub media: MediaType,
    pub quality: f32,
}

impl QualifiedType {
    pub fn new(media: MediaType) -> Self {
        Self {
            media,
            quality: 1.0,
        }
    }
}

/// Parse an Accept header into its preference entries, in declaration order.
///
/// The `q` parameter is extracted (and stripped from the entry's parameters),
/// defaulting to 1.0 and clamped to `[0.0, 1.0]`. Malformed entries are
/// skipped rather than failing the whole header.
pub fn parse_accept(header: &str) -> Vec<QualifiedType> {
    let mut entries = Vec::new();
    for part in header.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut media = match MediaType::parse(part) {
            Ok(media) => media,
            Err(_) => {
                debug!(entry = part, "skipping malformed Accept entry");
                continue;
            }
        };
        let quality = match media.parameters.iter().position(|(name, _)| name == "q") {
            Some(idx) => {
                let (_, raw) = media.parameters.remove(idx);
                raw.parse::<f32>().unwrap_or(1.0).clamp(0.0, 1.0)
            }
            None => 1.0,
        };
        entries.push(QualifiedType { media, quality });
    }
    entries
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MatchRank {
    quality: f32,
    specificity: u8,
    position: usize,
}

/// The preference entry that best matches `candidate`, if any.
///
/// Precedence: higher specificity, then higher quality, then earliest
/// position. The most specific match determines the candidate's effective
/// quality, so an exact entry with `q=0` vetoes a candidate even when a
/// wildcard entry would otherwise admit it.
fn best_match(preferences: &[QualifiedType], candidate: &MediaType) -> Option<MatchRank> {
    let mut best: Option<MatchRank> = None;
    for (position, pref) in preferences.iter().enumerate() {
        let Some(specificity) = pref.media.match_specificity(candidate) else {
            continue;
        };
        let rank = MatchRank {
            quality: pref.quality,
            specificity,
            position,
        };
        let better = match best {
            None => true,
            Some(current) => {
                (rank.specificity, rank.quality, std::cmp::Reverse(rank.position))
                    > (current.specificity, current.quality, std::cmp::Reverse(current.position))
            }
        };
        if better {
            best = Some(rank);
        }
    }
    best.filter(|rank| rank.quality > 0.0)
}

/// Pick the best candidate for the given preferences.
///
/// Candidates are ranked by their best match's quality, then its
/// specificity, then its preference position; remaining ties go to the
/// earliest candidate, which is registration order when called from the
/// registry. Returns the winning candidate's index, or `None` when no
/// preference matches any candidate.
pub fn select_content_type(
    preferences: &[QualifiedType],
    candidates: &[MediaType],
) -> Option<usize> {
    let mut winner: Option<(usize, MatchRank)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let Some(rank) = best_match(preferences, candidate) else {
            continue;
        };
        let better = match winner {
            None => true,
            Some((_, current)) => {
                (rank.quality, rank.specificity, std::cmp::Reverse(rank.position))
                    > (current.quality, current.specificity, std::cmp::Reverse(current.position))
            }
        };
        if better {
            winner = Some((idx, rank));
        }
    }
    winner.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mt(s: &str) -> MediaType {
        MediaType::parse(s).unwrap()
    }

    #[test]
    fn parse_lowercases_type_and_subtype() {
        let media = mt("Application/JSON");
        assert_eq!(media.content_type, "application");
        assert_eq!(media.content_subtype, "json");
        assert!(media.parameters.is_empty());
    }

    #[test]
    fn parse_keeps_parameters() {
        let media = mt("text/plain; charset=utf-8");
        assert_eq!(media.parameters, vec![("charset".into(), "utf-8".into())]);
        assert_eq!(media.to_string(), "text/plain; charset=utf-8");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(MediaType::parse("not a media type").is_err());
        assert!(MediaType::parse("").is_err());
    }

    #[test]
    fn wildcard_detection() {
        assert!(mt("*/*").is_wildcard());
        assert!(mt("text/*").is_wildcard());
        assert!(!mt("text/plain").is_wildcard());
    }

    #[test]
    fn accept_parsing_extracts_quality() {
        let prefs = parse_accept("application/json;q=0.5, application/msgpack");
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs[0].media.essence(), "application/json");
        assert_eq!(prefs[0].quality, 0.5);
        assert!(prefs[0].media.parameters.is_empty());
        assert_eq!(prefs[1].quality, 1.0);
    }

    #[test]
    fn accept_parsing_skips_malformed_entries() {
        let prefs = parse_accept("garbage;;;, application/json");
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].media.essence(), "application/json");
    }

    #[test]
    fn exact_match_beats_wildcards() {
        let prefs = parse_accept("*/*, application/*, application/json");
        let candidates = vec![mt("application/json")];
        let rank = best_match(&prefs, &candidates[0]).unwrap();
        assert_eq!(rank.specificity, 2);
        assert_eq!(rank.position, 2);
    }

    #[test]
    fn quality_outranks_specificity_across_candidates() {
        let prefs = parse_accept("text/*;q=0.8, application/json;q=0.4");
        let candidates = vec![mt("application/json"), mt("text/plain")];
        assert_eq!(select_content_type(&prefs, &candidates), Some(1));
    }

    #[test]
    fn zero_quality_excludes_a_type() {
        let prefs = parse_accept("application/json;q=0, */*");
        let candidates = vec![mt("application/json"), mt("application/msgpack")];
        // The exact q=0 entry vetoes json even though */* would otherwise
        // admit it first; msgpack wins through the full wildcard.
        let selected = select_content_type(&prefs, &candidates);
        assert_eq!(selected, Some(1));
    }

    #[test]
    fn explicit_msgpack_wins_over_registered_default() {
        let prefs = parse_accept("application/msgpack");
        let candidates = vec![mt("application/json"), mt("application/msgpack")];
        assert_eq!(select_content_type(&prefs, &candidates), Some(1));
    }

    #[test]
    fn full_wildcard_falls_back_to_registration_order() {
        let prefs = parse_accept("*/*");
        let candidates = vec![mt("application/json"), mt("application/msgpack")];
        assert_eq!(select_content_type(&prefs, &candidates), Some(0));
    }

    #[test]
    fn no_match_yields_none() {
        let prefs = parse_accept("application/xml");
        let candidates = vec![mt("application/json")];
        assert_eq!(select_content_type(&prefs, &candidates), None);
    }
}
