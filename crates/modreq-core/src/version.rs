//! Version matching.
//!
//! Versions are free-form strings. Numeric versions are `major[.minor[.patch]]`
//! and are compatible when the major release is the same and the loaded version
//! is at least as new as requested, within the precision of the request.
//! Anything else must match exactly, except that a loaded test build (a version
//! not starting with a digit) satisfies every request.

use crate::config::defaults::MIN_COMPATIBLE_MARKER;

/// Outcome of comparing a requested version against a loaded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// Nothing was requested, or the strings are identical.
    Exact,
    /// Numerically compatible.
    Compatible,
    /// The loaded version is a non-numeric test build; accepted with a warning.
    TestBuild,
    Incompatible,
}

impl Match {
    pub fn is_compatible(self) -> bool {
        !matches!(self, Match::Incompatible)
    }
}

/// Leading `major.minor.patch` fields of a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Numeric {
    /// How many fields were parsed (0..=3).
    fields: usize,
    parts: [i64; 3],
}

impl Numeric {
    fn scan(s: &str) -> Numeric {
        let mut parts = [0i64; 3];
        let mut fields = 0;
        let mut rest = s;

        for slot in parts.iter_mut() {
            if fields > 0 {
                match rest.strip_prefix('.') {
                    Some(r) => rest = r,
                    None => break,
                }
            }
            let Some((value, len)) = leading_int(rest) else {
                break;
            };
            *slot = value;
            fields += 1;
            rest = &rest[len..];
        }

        Numeric { fields, parts }
    }
}

/// Parse an optionally signed decimal integer at the start of `s`, skipping
/// leading whitespace. Returns the value and the number of bytes consumed.
fn leading_int(s: &str) -> Option<(i64, usize)> {
    let skipped = s.len() - s.trim_start().len();
    let body = &s[skipped..];
    let sign_len = usize::from(body.starts_with(['+', '-']));
    let digits = body[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    let end = sign_len + digits;
    let value = body[..end].parse().ok()?;
    Some((value, skipped + end))
}

/// Compare a requested version against the version of a loaded module.
pub fn compare(requested: &str, loaded: &str) -> Match {
    if requested.is_empty() || requested == loaded {
        return Match::Exact;
    }
    if !loaded.starts_with(|c: char| c.is_ascii_digit()) {
        return Match::TestBuild;
    }

    let want = Numeric::scan(requested);
    let have = Numeric::scan(loaded);
    let [major, minor, patch] = want.parts;
    let [lmajor, lminor, lpatch] = have.parts;

    if want.fields == 0 || have.fields == 0 {
        return Match::Incompatible;
    }
    if major != lmajor
        || (want.fields >= 2 && minor > lminor)
        || (want.fields > 2 && minor == lminor && patch > lpatch)
    {
        return Match::Incompatible;
    }
    Match::Compatible
}

/// Whether `loaded` satisfies `requested` for `module`.
///
/// A test build satisfying a request is logged as a warning.
pub fn compatible(module: &str, requested: &str, loaded: &str) -> bool {
    let result = compare(requested, loaded);
    if result == Match::TestBuild {
        tracing::warn!(
            "{} test version {} already loaded where {} was requested",
            module,
            loaded,
            requested
        );
    }
    result.is_compatible()
}

/// Version used to build artifact file names for a request.
///
/// A numeric request ending in the minimum-compatible marker is cut at its last
/// dot, so `"1.2.4+"` searches for `"1.2"` and `"1+"` for the unversioned
/// artifact. Other requests are used unchanged.
pub fn search_version(requested: &str) -> &str {
    let numeric = requested.starts_with(|c: char| c.is_ascii_digit());
    if numeric && requested.ends_with(MIN_COMPATIBLE_MARKER) {
        match requested.rfind('.') {
            Some(dot) => &requested[..dot],
            None => "",
        }
    } else {
        requested
    }
}

/// Turn a version into a lower bound by appending the minimum-compatible marker.
/// An empty version stays unconstrained.
pub fn at_least(version: &str) -> String {
    if version.is_empty() || version.ends_with(MIN_COMPATIBLE_MARKER) {
        version.to_string()
    } else {
        format!("{}{}", version, MIN_COMPATIBLE_MARKER)
    }
}
