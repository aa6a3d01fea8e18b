//! A single validated changelog record.
//!
//! An [Entry] owns the fields of one release record directly: source
//! package, version, target distribution, argument map, body text, author
//! and timestamp. Field setters enforce the format invariants; an entry
//! that fails validation renders as the empty string rather than emitting
//! partial output.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DchError, Result};
use crate::version::Version;

/// RFC 1123 with a numeric zone, the timestamp format of the trailer line.
pub const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

static RE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+) \(([^()]+)\) (\S+);(.*)$").unwrap());
static RE_TRAILER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ -- (.+?)  (.+)$").unwrap());

/// Text fields of an entry must be non-empty and free of whitespace.
fn is_string_valid(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

/// One changelog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    source: String,
    version: Version,
    target: String,
    arguments: BTreeMap<String, String>,
    changelog: String,
    author: String,
    when: DateTime<FixedOffset>,
}

impl Entry {
    /// Create a new entry, validating every field.
    ///
    /// `urgency` may be empty, in which case it defaults to "medium". The
    /// body text is normalized to start and end with a blank line; an
    /// empty body becomes a single placeholder bullet. The timestamp is
    /// set to the current local time.
    pub fn new(
        source: &str,
        version: Version,
        target: &str,
        urgency: &str,
        changelog: &str,
        author: &str,
    ) -> Result<Entry> {
        let mut entry = Entry {
            source: String::new(),
            version: Version::new(0, "", ""),
            target: String::new(),
            arguments: BTreeMap::new(),
            changelog: String::new(),
            author: String::new(),
            when: Local::now().fixed_offset(),
        };

        entry.set_source(source)?;
        entry.set_version(version)?;
        entry.set_target(target)?;
        entry.set_urgency(urgency)?;
        entry.set_changelog(changelog);
        entry.set_author(author)?;

        Ok(entry)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, value: &str) -> Result<()> {
        if !is_string_valid(value) {
            return Err(DchError::entry(format!("source '{}' is not valid", value)));
        }
        self.source = value.to_string();
        Ok(())
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// A valid entry version only needs a non-empty upstream part; epoch
    /// and revision may hold any value.
    pub fn set_version(&mut self, value: Version) -> Result<()> {
        if value.upstream().is_empty() {
            return Err(DchError::entry(format!("version '{}' is not valid", value)));
        }
        self.version = value;
        Ok(())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn set_target(&mut self, value: &str) -> Result<()> {
        if !is_string_valid(value) {
            return Err(DchError::entry(format!("target '{}' is not valid", value)));
        }
        self.target = value.to_string();
        Ok(())
    }

    pub fn urgency(&self) -> Option<&str> {
        self.arguments.get("urgency").map(String::as_str)
    }

    /// Set the mandatory urgency argument, defaulting to "medium" when the
    /// given value is empty.
    pub fn set_urgency(&mut self, value: &str) -> Result<()> {
        if value.is_empty() {
            self.arguments
                .insert("urgency".to_string(), "medium".to_string());
            return Ok(());
        }
        if !is_string_valid(value) {
            return Err(DchError::entry(format!("urgency '{}' is not valid", value)));
        }
        self.arguments
            .insert("urgency".to_string(), value.to_string());
        Ok(())
    }

    /// Create or replace an argument. Urgency is the one standard
    /// argument; anything else set here is carried verbatim.
    pub fn set_argument(&mut self, key: &str, value: &str) -> Result<()> {
        if !is_string_valid(key) {
            return Err(DchError::entry(format!("argument key '{}' is not valid", key)));
        }
        if !is_string_valid(value) {
            return Err(DchError::entry(format!(
                "argument value '{}' for key '{}' is not valid",
                value, key
            )));
        }
        self.arguments.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }

    pub fn changelog(&self) -> &str {
        &self.changelog
    }

    /// Store the body text, normalized to start with a blank line and end
    /// with one. An empty body becomes a single placeholder bullet.
    pub fn set_changelog(&mut self, value: &str) {
        let mut value = if value.is_empty() {
            "  *".to_string()
        } else {
            value.to_string()
        };

        if !value.starts_with('\n') {
            value.insert(0, '\n');
        }
        while !value.ends_with("\n\n") {
            value.push('\n');
        }

        self.changelog = value;
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn set_author(&mut self, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(DchError::entry("changelog author cannot be empty"));
        }
        self.author = value.to_string();
        Ok(())
    }

    pub fn when(&self) -> DateTime<FixedOffset> {
        self.when
    }

    pub fn set_when(&mut self, value: DateTime<FixedOffset>) {
        self.when = value;
    }

    /// The trailer timestamp in RFC 1123 form with a numeric zone.
    pub fn when_to_string(&self) -> String {
        self.when.format(TIMESTAMP_FORMAT).to_string()
    }

    /// True when every field invariant holds.
    pub fn is_valid(&self) -> bool {
        is_string_valid(&self.source)
            && !self.version.upstream().is_empty()
            && is_string_valid(&self.target)
            && self
                .arguments
                .iter()
                .all(|(k, v)| is_string_valid(k) && is_string_valid(v))
            && !self.author.is_empty()
    }
}

impl fmt::Display for Entry {
    /// Canonical changelog text of the entry; an invalid entry renders as
    /// the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }

        write!(f, "{} ({}) {};", self.source, self.version, self.target)?;
        for (key, value) in &self.arguments {
            write!(f, " {}={}", key, value)?;
        }
        f.write_str("\n")?;
        f.write_str(&self.changelog)?;
        write!(f, " -- {}  {}", self.author, self.when_to_string())?;
        f.write_str("\n")
    }
}

/// Parse the full text of a changelog file into its entries,
/// most-recent-first as stored in the file.
pub(crate) fn parse_entries(text: &str) -> Result<Vec<Entry>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let caps = RE_HEADER.captures(lines[i]).ok_or_else(|| {
            DchError::parse(format!(
                "line {}: expected an entry header, got '{}'",
                i + 1,
                lines[i]
            ))
        })?;
        let source = caps[1].to_string();
        let version = Version::parse(&caps[2])
            .map_err(|e| DchError::parse(format!("line {}: {}", i + 1, e)))?;
        let target = caps[3].to_string();

        let mut arguments = BTreeMap::new();
        for token in caps[4].split_whitespace() {
            match token.split_once('=') {
                Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                    arguments.insert(key.to_string(), value.to_string());
                }
                _ => {
                    return Err(DchError::parse(format!(
                        "line {}: invalid argument '{}'",
                        i + 1,
                        token
                    )))
                }
            }
        }
        i += 1;

        let mut body = Vec::new();
        let mut trailer = None;
        while i < lines.len() {
            if let Some(tc) = RE_TRAILER.captures(lines[i]) {
                trailer = Some((tc[1].to_string(), tc[2].to_string()));
                i += 1;
                break;
            }
            body.push(lines[i]);
            i += 1;
        }

        let (author, when_text) = trailer.ok_or_else(|| {
            DchError::parse(format!("entry for '{}' is missing the trailer line", source))
        })?;
        let when = DateTime::parse_from_str(when_text.trim(), TIMESTAMP_FORMAT).map_err(|e| {
            DchError::parse(format!("invalid timestamp '{}': {}", when_text, e))
        })?;

        let mut entry = Entry {
            source,
            version,
            target,
            arguments,
            changelog: String::new(),
            author,
            when,
        };
        entry.set_changelog(&body.join("\n"));

        entries.push(entry);
    }

    Ok(entries)
}
