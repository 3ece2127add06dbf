//! File naming for newly created migrations.
//!
//! Names look like `20240131_02_k3x9q-add-users-table`: the date, a
//! per-day sequence number, a short random tag and a slug of the message.

use chrono::NaiveDate;

const SLUG_MAX_LEN: usize = 48;

/// Build the id (file stem) for a new migration created on `date`.
///
/// `existing` are the ids already present in the migrations directory; the
/// sequence number continues after the highest one used on the same date.
pub fn new_migration_id<S: AsRef<str>>(existing: &[S], message: &str, date: NaiveDate) -> String {
    let day = date.format("%Y%m%d").to_string();
    let next = existing
        .iter()
        .filter_map(|id| sequence_on(id.as_ref(), &day))
        .max()
        .map_or(1, |n| n + 1);

    let tag: String = uuid::Uuid::new_v4().simple().to_string().chars().take(5).collect();
    let slug = slugify(message);
    if slug.is_empty() {
        format!("{day}_{next:02}_{tag}")
    } else {
        format!("{day}_{next:02}_{tag}-{slug}")
    }
}

fn sequence_on(id: &str, day: &str) -> Option<u32> {
    let rest = id.strip_prefix(day)?.strip_prefix('_')?;
    rest.split('_').next()?.parse().ok()
}

/// Lowercase, dash-separated, ASCII alphanumerics only
pub fn slugify(message: &str) -> String {
    let mut slug = String::with_capacity(message.len());
    for c in message.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    if slug.len() > SLUG_MAX_LEN {
        slug.truncate(SLUG_MAX_LEN);
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Add users table"), "add-users-table");
        assert_eq!(slugify("  --weird__chars!! "), "weird-chars");
        assert_eq!(slugify(""), "");
        assert!(slugify(&"x".repeat(100)).len() <= SLUG_MAX_LEN);
    }

    #[test]
    fn test_first_migration_of_the_day() {
        let existing: Vec<String> = vec!["20240130_05_aaaaa-old".into()];
        let id = new_migration_id(&existing, "Add users", day());
        assert!(id.starts_with("20240131_01_"), "{id}");
        assert!(id.ends_with("-add-users"), "{id}");
    }

    #[test]
    fn test_sequence_continues_after_highest() {
        let existing = ["20240131_01_aaaaa-a", "20240131_03_bbbbb-b"];
        let id = new_migration_id(&existing, "", day());
        assert!(id.starts_with("20240131_04_"), "{id}");
        assert_eq!(id.len(), "20240131_04_".len() + 5);
    }
}
