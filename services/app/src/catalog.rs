//! services/app/src/catalog.rs
//!
//! The built-in seed catalog. Course entries are immutable reference data;
//! the core only ever reads them.

use bridge_ed_core::catalog::Catalog;
use bridge_ed_core::domain::{Course, CourseCategory, Difficulty, LocalizedText, Region};

/// Builds the catalog the demo ships with.
pub fn seed_catalog() -> Catalog {
    Catalog::new(vec![
        Course {
            id: "algebra-foundations".to_string(),
            title: LocalizedText::new(
                "Foundations of Algebra",
                "Bases de l'algèbre",
                "أسس الجبر",
            ),
            description: LocalizedText::new(
                "From Al-Jabr to abstract structures: equations, symmetry and proof.",
                "D'Al-Jabr aux structures abstraites : équations, symétrie et démonstration.",
                "من الجبر إلى البنى المجردة: المعادلات والتناظر والبرهان.",
            ),
            category: CourseCategory::Science,
            region: vec![Region::West, Region::Arab],
            difficulty: Difficulty::Beginner,
            duration: "6h".to_string(),
        },
        Course {
            id: "critical-thinking".to_string(),
            title: LocalizedText::new(
                "Critical Thinking Studio",
                "Atelier de pensée critique",
                "استوديو التفكير النقدي",
            ),
            description: LocalizedText::new(
                "Argument analysis, bias spotting and collaborative projects.",
                "Analyse d'arguments, détection de biais et projets collaboratifs.",
                "تحليل الحجج واكتشاف التحيز والمشاريع التعاونية.",
            ),
            category: CourseCategory::Humanities,
            region: vec![Region::West],
            difficulty: Difficulty::Intermediate,
            duration: "8h".to_string(),
        },
        Course {
            id: "golden-age-science".to_string(),
            title: LocalizedText::new(
                "Science of the Golden Age",
                "Science de l'âge d'or",
                "علوم العصر الذهبي",
            ),
            description: LocalizedText::new(
                "Astronomy, medicine and method in the classical Arab world.",
                "Astronomie, médecine et méthode dans le monde arabe classique.",
                "الفلك والطب والمنهج في العالم العربي الكلاسيكي.",
            ),
            category: CourseCategory::Values,
            region: vec![Region::Arab],
            difficulty: Difficulty::Intermediate,
            duration: "5h".to_string(),
        },
        Course {
            id: "intro-programming".to_string(),
            title: LocalizedText::new(
                "Introduction to Programming",
                "Introduction à la programmation",
                "مقدمة في البرمجة",
            ),
            description: LocalizedText::new(
                "Algorithms, data and building your first working programs.",
                "Algorithmes, données et premiers programmes fonctionnels.",
                "الخوارزميات والبيانات وبناء أولى برامجك العاملة.",
            ),
            category: CourseCategory::Tech,
            region: vec![Region::West, Region::Arab],
            difficulty: Difficulty::Beginner,
            duration: "10h".to_string(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_catalog_has_unique_ids() {
        let catalog = seed_catalog();
        let mut ids: Vec<&str> = catalog.all().iter().map(|c| c.id.as_str()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn every_course_targets_at_least_one_region() {
        let catalog = seed_catalog();
        assert!(catalog.all().iter().all(|c| !c.region.is_empty()));
    }
}
