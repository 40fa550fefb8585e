//! The server-side course price catalog.
//!
//! Client-supplied amounts are advisory at most: whenever an incoming order names a course
//! slug that this catalog knows, the catalog price is the one that gets charged. The
//! storefront's published course list is bundled as the default; operators can replace it
//! by pointing `CPG_COURSE_CATALOG` at a JSON file with the same shape.

use std::{collections::HashMap, env, fs, path::Path};

use cpg_common::Krw;
use log::*;
use serde::Deserialize;

pub const CATALOG_PATH_VAR: &str = "CPG_COURSE_CATALOG";

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub slug: String,
    pub title: String,
    pub price: Krw,
}

#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: HashMap<String, Course>,
}

impl CourseCatalog {
    pub fn new(courses: Vec<Course>) -> Self {
        let courses = courses.into_iter().map(|c| (c.slug.clone(), c)).collect();
        Self { courses }
    }

    /// The course list published on the storefront.
    pub fn bundled() -> Self {
        let courses = [
            ("marketing-ai", "AI 마케팅 실무", 550_000),
            ("planning-ai", "AI 기획 실무", 500_000),
            ("dev-ai", "AI 개발 실무", 600_000),
            ("design-ai", "AI 디자인 실무", 500_000),
            ("sales-ai", "AI 영업 실무", 450_000),
            ("hr-ai", "AI 인사행정 실무", 450_000),
            ("job-bootcamp", "공기업 사기업 취업특강", 400_000),
            ("career-ai", "AI 취업 특강: 6시간에 끝내는 취업 전략", 200_000),
            ("employee-ai", "기업재직자 AI경쟁력 강화", 800_000),
        ]
        .into_iter()
        .map(|(slug, title, price)| Course {
            slug: slug.to_string(),
            title: title.to_string(),
            price: Krw::from(price),
        })
        .collect();
        Self::new(courses)
    }

    /// Loads the catalog from the file named by `CPG_COURSE_CATALOG`, falling back to the
    /// bundled course list when the variable is unset or the file cannot be used.
    pub fn from_env_or_bundled() -> Self {
        match env::var(CATALOG_PATH_VAR) {
            Ok(path) => match Self::from_file(&path) {
                Ok(catalog) => {
                    info!("📚️ Loaded {} courses from {path}", catalog.len());
                    catalog
                },
                Err(e) => {
                    warn!("📚️ Could not load the course catalog from {path}: {e}. Using the bundled catalog.");
                    Self::bundled()
                },
            },
            Err(_) => {
                info!("📚️ {CATALOG_PATH_VAR} is not set. Using the bundled course catalog.");
                Self::bundled()
            },
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let raw = fs::read(path.as_ref()).map_err(|e| e.to_string())?;
        let courses: Vec<Course> = serde_json::from_slice(&raw).map_err(|e| e.to_string())?;
        Ok(Self::new(courses))
    }

    pub fn course(&self, slug: &str) -> Option<&Course> {
        self.courses.get(slug)
    }

    pub fn price_for(&self, slug: &str) -> Option<Krw> {
        self.courses.get(slug).map(|c| c.price)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod test {
    use cpg_common::Krw;

    use super::CourseCatalog;

    #[test]
    fn bundled_catalog_knows_the_published_courses() {
        let catalog = CourseCatalog::bundled();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.price_for("marketing-ai"), Some(Krw::from(550_000)));
        assert_eq!(catalog.course("career-ai").unwrap().title, "AI 취업 특강: 6시간에 끝내는 취업 전략");
        assert_eq!(catalog.price_for("no-such-course"), None);
    }

    #[test]
    fn empty_catalog_resolves_nothing() {
        let catalog = CourseCatalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.price_for("marketing-ai"), None);
    }
}
