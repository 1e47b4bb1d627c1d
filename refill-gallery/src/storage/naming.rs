//! Storage key naming policy
//!
//! Keys have the form `<YYYYMMDDTHHMMSS>-<sanitized filename>` with the
//! timestamp in UTC. Because the timestamp prefix sorts lexicographically in
//! time order, sorting keys (or URLs built from them) descending yields newest
//! first.
//!
//! Two uploads with the same sanitized filename inside the same second map to
//! the same key, and the second overwrites the first.
//!
//! # Sanitization rules
//!
//! [`sanitize_filename`] splits the name at its last `.` into stem and
//! extension, then for each part:
//!
//! 1. `/` and `\` become spaces.
//! 2. Runs of whitespace (including tabs and newlines) collapse into one `_`.
//! 3. Every character outside `[A-Za-z0-9_.-]` is dropped. This removes NUL,
//!    other control characters, non-ASCII text and shell punctuation.
//!
//! The stem additionally loses leading `.`, `-`, `_` and trailing `.`, `_`,
//! and falls back to `image` when nothing is left. The extension keeps its
//! case and loses any dots.
//!
//! # Collisions
//!
//! Sanitization is not injective. Names that differ only in what the rules
//! rewrite or drop end up with the same key when uploaded in the same second:
//!
//! - `a b.png` and `a_b.png` both become `a_b.png`
//! - `dir/a.png` and `dir a.png` both become `dir_a.png`
//! - `照片.png` and `写真.png` both become `image.png`, as does any stem
//!   made only of non-ASCII characters
//!
//! Names already made of `[A-Za-z0-9-]` with an alphanumeric first character
//! and an alphanumeric extension pass through unchanged, so distinct names of
//! that shape never collide.

use chrono::{DateTime, Utc};

/// `strftime` pattern of the key prefix
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Stem used when sanitization leaves nothing of the original stem
pub const DEFAULT_STEM: &str = "image";

/// Source of the current time for key generation
pub trait Clock: Send + Sync {
    /// Returns the current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant, for reproducible keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Builds the storage key for `original_filename` uploaded at `now`
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use refill_gallery::storage::naming::make_key;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
/// assert_eq!(make_key("my cat.png", now), "20240102T030405-my_cat.png");
/// assert_eq!(make_key("../../etc/x.png", now), "20240102T030405-etc_x.png");
/// ```
#[must_use]
pub fn make_key(original_filename: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}",
        now.format(KEY_TIMESTAMP_FORMAT),
        sanitize_filename(original_filename)
    )
}

/// Makes a client-supplied filename safe to use as a key and a path segment
///
/// See the module documentation for the exact rules.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (filename, None),
    };

    let stem = clean_segment(stem);
    let stem = stem
        .trim_start_matches(['.', '-', '_'])
        .trim_end_matches(['.', '_']);
    let stem = if stem.is_empty() { DEFAULT_STEM } else { stem };

    let extension = extension
        .map(|ext| clean_segment(ext).replace('.', ""))
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

fn clean_segment(segment: &str) -> String {
    let without_separators = segment.replace(['/', '\\'], " ");

    without_separators
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_key_format() {
        let key = make_key("cat.png", at(2024, 1, 1, 0, 0, 0));
        assert_eq!(key, "20240101T000000-cat.png");
    }

    #[test]
    fn test_keys_sort_chronologically() {
        let older = make_key("z.png", at(2024, 1, 1, 23, 59, 59));
        let newer = make_key("a.png", at(2024, 1, 2, 0, 0, 0));
        assert!(newer > older);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(at(2030, 6, 15, 12, 0, 0));
        assert_eq!(clock.now(), at(2030, 6, 15, 12, 0, 0));
    }

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("cat.png"), "cat.png");
        assert_eq!(sanitize_filename("My-Photo_01.JPG"), "My-Photo_01.JPG");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_filename("my  holiday\tpic.jpg"), "my_holiday_pic.jpg");
        assert_eq!(sanitize_filename("  padded  .png"), "padded.png");
    }

    #[test]
    fn test_sanitize_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "etc_passwd.png");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cat.png"), "C_Users_me_cat.png");
    }

    #[test]
    fn test_sanitize_leading_dots_and_dashes() {
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("--rf.png"), "rf.png");
        assert_eq!(sanitize_filename("name..png"), "name.png");
    }

    #[test]
    fn test_sanitize_control_and_unicode() {
        assert_eq!(sanitize_filename("ca\0t\u{7}.png"), "cat.png");
        assert_eq!(sanitize_filename("café.png"), "caf.png");
        assert_eq!(sanitize_filename("照片.png"), "image.png");
    }

    #[test]
    fn test_sanitize_collisions() {
        assert_eq!(sanitize_filename("a b.png"), sanitize_filename("a_b.png"));
        assert_eq!(sanitize_filename("dir/a.png"), sanitize_filename("dir a.png"));
        assert_eq!(sanitize_filename("照片.png"), "image.png");
        assert_eq!(sanitize_filename("写真.png"), "image.png");
    }

    #[test]
    fn test_sanitize_without_extension() {
        assert_eq!(sanitize_filename("README"), "README");
        assert_eq!(sanitize_filename(""), "image");
        assert_eq!(sanitize_filename("photo."), "photo");
    }

    proptest! {
        #[test]
        fn prop_deterministic(name in ".{0,40}", secs in 0i64..4_000_000_000) {
            let now = DateTime::from_timestamp(secs, 0).unwrap();
            prop_assert_eq!(make_key(&name, now), make_key(&name, now));
        }

        #[test]
        fn prop_no_path_separators(name in ".{0,40}") {
            let key = make_key(&name, at(2024, 1, 1, 0, 0, 0));
            prop_assert!(!key.contains('/'));
            prop_assert!(!key.contains('\\'));
            prop_assert!(!key.contains('\0'));
        }

        #[test]
        fn prop_safe_charset(name in ".{0,40}") {
            let sanitized = sanitize_filename(&name);
            prop_assert!(!sanitized.is_empty());
            prop_assert!(!sanitized.starts_with('.'));
            prop_assert!(sanitized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')));
        }

        #[test]
        fn prop_safe_names_unchanged(
            stem in "[A-Za-z0-9][A-Za-z0-9-]{0,11}",
            ext in "[A-Za-z0-9]{1,5}",
        ) {
            let name = format!("{stem}.{ext}");
            prop_assert_eq!(sanitize_filename(&name), name);
        }

        #[test]
        fn prop_distinct_safe_names_distinct_keys(
            a in ("[A-Za-z0-9][A-Za-z0-9-]{0,11}", "[A-Za-z0-9]{1,5}"),
            b in ("[A-Za-z0-9][A-Za-z0-9-]{0,11}", "[A-Za-z0-9]{1,5}"),
        ) {
            prop_assume!(a != b);
            let now = at(2024, 1, 1, 0, 0, 0);
            prop_assert_ne!(
                make_key(&format!("{}.{}", a.0, a.1), now),
                make_key(&format!("{}.{}", b.0, b.1), now)
            );
        }

        #[test]
        fn prop_keys_collide_only_through_sanitization(a in ".{0,20}", b in ".{0,20}") {
            let now = at(2024, 1, 1, 0, 0, 0);
            prop_assert_eq!(
                make_key(&a, now) == make_key(&b, now),
                sanitize_filename(&a) == sanitize_filename(&b)
            );
        }
    }
}
