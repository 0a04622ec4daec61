//! crates/bridge_ed_core/src/catalog.rs
//!
//! Read-only course catalog lookup and the pure display projections over it.
//! Filtering never mutates the catalog or the user's ledger.

use crate::domain::{Course, Language, Region, User};

/// An immutable collection of catalog courses, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn all(&self) -> &[Course] {
        &self.courses
    }

    /// The "explore" projection: courses applicable to the given region.
    pub fn browse(&self, region: Region) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|c| c.region.contains(&region))
            .collect()
    }

    /// The "my courses" projection: courses on the user's ledger, in catalog
    /// order.
    pub fn enrolled<'a>(&'a self, user: &User) -> Vec<&'a Course> {
        self.courses
            .iter()
            .filter(|c| user.is_enrolled(&c.id))
            .collect()
    }

    /// Case-insensitive free-text search over title and description in the
    /// active language, scoped to the region projection.
    pub fn search(&self, region: Region, lang: Language, query: &str) -> Vec<&Course> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.browse(region);
        }
        self.browse(region)
            .into_iter()
            .filter(|c| {
                c.title.get(lang).to_lowercase().contains(&needle)
                    || c.description.get(lang).to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseCategory, Difficulty, LocalizedText, SubscriptionTier};

    fn course(id: &str, title_en: &str, regions: Vec<Region>) -> Course {
        Course {
            id: id.to_string(),
            title: LocalizedText::new(title_en, format!("{title_en} (fr)"), format!("{title_en} (ar)")),
            description: LocalizedText::new("about", "sur", "حول"),
            category: CourseCategory::Science,
            region: regions,
            difficulty: Difficulty::Beginner,
            duration: "4h".to_string(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            course("algebra", "Foundations of Algebra", vec![Region::West, Region::Arab]),
            course("ethics", "Digital Ethics", vec![Region::West]),
            course("astronomy", "Golden Age Astronomy", vec![Region::Arab]),
        ])
    }

    #[test]
    fn browse_filters_by_region() {
        let cat = catalog();
        let west: Vec<&str> = cat.browse(Region::West).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(west, vec!["algebra", "ethics"]);
    }

    #[test]
    fn enrolled_projection_tracks_the_ledger() {
        let cat = catalog();
        let mut user = User::fabricate("a@b.com", "a", SubscriptionTier::Free);
        user.enroll("astronomy");
        let mine: Vec<&str> = cat.enrolled(&user).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(mine, vec!["astronomy"]);
        // The projection must not touch the ledger.
        assert_eq!(user.enrolled.len(), 1);
    }

    #[test]
    fn search_matches_title_and_description_case_insensitively() {
        let cat = catalog();
        let hits: Vec<&str> = cat
            .search(Region::West, Language::En, "ALGEBRA")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(hits, vec!["algebra"]);

        // Empty query degrades to the plain region projection.
        assert_eq!(cat.search(Region::West, Language::En, "  ").len(), 2);
    }
}
