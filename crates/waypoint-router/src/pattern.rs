#![forbid(unsafe_code)]

//! Compiled path patterns and segment-wise matching.
//!
//! A route path like `/users/:id/files/*rest` compiles once into a
//! [`PathPattern`] and is then matched against concrete pathnames without
//! further allocation beyond captured parameter values.
//!
//! # Invariants
//!
//! 1. A pattern is a sequence of `/`-separated segments; one trailing slash
//!    on either the pattern or the concrete path is tolerated and carries
//!    no meaning.
//! 2. `:name` matches exactly one non-empty segment and captures its
//!    percent-decoded text under `name`.
//! 3. `*` (anonymous) and `*name` match the entire remainder, including an
//!    empty remainder, and must be the final segment. The anonymous form
//!    captures under the key `"*"`.
//! 4. Literal segments compare case-insensitively (ASCII) unless the
//!    pattern was compiled as case-sensitive.
//! 5. A segment that percent-decodes to invalid UTF-8 fails the match
//!    instead of panicking or reporting an error.

use crate::error::PatternError;
use crate::params::Params;
use percent_encoding::percent_decode_str;

// ============================================================================
// Segments
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    /// Fixed text, compared (in)sensitively per the pattern.
    Literal(String),
    /// `:name`, one non-empty concrete segment.
    Param(String),
    /// `*` or `*name`, the remainder of the path. Always last.
    CatchAll(String),
}

// ============================================================================
// Pattern
// ============================================================================

/// A route path compiled for repeated matching.
#[derive(Clone, Debug)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    sensitive: bool,
}

impl PathPattern {
    /// Compiles a pattern string.
    ///
    /// `sensitive` selects exact literal comparison; the default router
    /// behavior is case-insensitive.
    pub fn compile(pattern: &str, sensitive: bool) -> Result<Self, PatternError> {
        let parts = split_segments(pattern);
        let last = parts.len().saturating_sub(1);
        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();

        for (index, part) in parts.iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                validate_name(pattern, name)?;
                claim_name(pattern, &mut names, name)?;
                segments.push(Segment::Param(name.to_string()));
            } else if let Some(name) = part.strip_prefix('*') {
                if index != last {
                    return Err(PatternError::CatchAllNotLast { pattern: pattern.to_string() });
                }
                let key = if name.is_empty() {
                    "*"
                } else {
                    validate_name(pattern, name)?;
                    name
                };
                claim_name(pattern, &mut names, key)?;
                segments.push(Segment::CatchAll(key.to_string()));
            } else {
                segments.push(Segment::Literal((*part).to_string()));
            }
        }

        Ok(Self { raw: pattern.to_string(), segments, sensitive })
    }

    /// The pattern text this was compiled from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether literal segments compare exactly.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a concrete pathname, returning captured parameters on success.
    ///
    /// The pathname is expected without search or hash portions; callers
    /// split those off beforehand.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let concrete = split_segments(path);
        let mut params = Params::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    let got = concrete.get(index)?;
                    let ok = if self.sensitive {
                        *got == lit.as_str()
                    } else {
                        got.eq_ignore_ascii_case(lit)
                    };
                    if !ok {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let got = concrete.get(index)?;
                    if got.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode(got)?);
                }
                Segment::CatchAll(name) => {
                    let rest = if index < concrete.len() {
                        concrete[index..].join("/")
                    } else {
                        String::new()
                    };
                    params.insert(name.clone(), decode(&rest)?);
                    return Some(params);
                }
            }
        }

        if concrete.len() == self.segments.len() { Some(params) } else { None }
    }
}

fn validate_name(pattern: &str, name: &str) -> Result<(), PatternError> {
    if name.is_empty() {
        return Err(PatternError::EmptyParamName { pattern: pattern.to_string() });
    }
    if let Some(found) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(PatternError::InvalidParamChar { pattern: pattern.to_string(), found });
    }
    Ok(())
}

fn claim_name<'a>(
    pattern: &str,
    names: &mut Vec<&'a str>,
    name: &'a str,
) -> Result<(), PatternError> {
    if names.contains(&name) {
        return Err(PatternError::DuplicateParam {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    names.push(name);
    Ok(())
}

/// Splits on `/`, dropping the leading empty piece of an absolute path and
/// at most one trailing empty piece from a trailing slash.
fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() { Vec::new() } else { trimmed.split('/').collect() }
}

fn decode(segment: &str) -> Option<String> {
    percent_decode_str(segment).decode_utf8().ok().map(|cow| cow.into_owned())
}
