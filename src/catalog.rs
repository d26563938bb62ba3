//! Explore page listings with search and category filtering

use serde::Serialize;

pub const SERVICE_CATEGORIES: [&str; 8] = [
    "Programming & Tech",
    "Graphics & Design",
    "Digital Marketing",
    "Writing & Translation",
    "Video & Animation",
    "Music & Audio",
    "Business",
    "Finance",
];

/// Category filter value that matches every listing
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceListing {
    pub id: u32,
    pub title: &'static str,
    pub freelancer: &'static str,
    pub rating: f32,
    pub reviews: u32,
    pub price: u32,
    pub delivery: &'static str,
    pub category: &'static str,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListing {
    pub id: u32,
    pub title: &'static str,
    pub client: &'static str,
    pub budget: &'static str,
    pub timeline: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub posted: &'static str,
    pub proposals: u32,
    pub verified: bool,
}

pub fn sample_services() -> Vec<ServiceListing> {
    vec![
        ServiceListing {
            id: 1,
            title: "I will create a modern React website for your business",
            freelancer: "Sarah Johnson",
            rating: 4.9,
            reviews: 127,
            price: 299,
            delivery: "3 days",
            category: "Programming & Tech",
            verified: true,
        },
        ServiceListing {
            id: 2,
            title: "I will design a professional logo and brand identity",
            freelancer: "Mike Chen",
            rating: 4.8,
            reviews: 89,
            price: 150,
            delivery: "2 days",
            category: "Graphics & Design",
            verified: true,
        },
        ServiceListing {
            id: 3,
            title: "I will write SEO-optimized content for your website",
            freelancer: "Emma Davis",
            rating: 4.9,
            reviews: 156,
            price: 75,
            delivery: "1 day",
            category: "Writing & Translation",
            verified: true,
        },
        ServiceListing {
            id: 4,
            title: "I will create engaging social media marketing campaigns",
            freelancer: "Alex Rodriguez",
            rating: 4.7,
            reviews: 203,
            price: 199,
            delivery: "5 days",
            category: "Digital Marketing",
            verified: true,
        },
    ]
}

pub fn sample_jobs() -> Vec<JobListing> {
    vec![
        JobListing {
            id: 1,
            title: "Need a React developer for e-commerce website",
            client: "TechStart Inc.",
            budget: "₦1,000 - ₦2,500",
            timeline: "2 weeks",
            description: "Looking for an experienced React developer to build a modern e-commerce platform...",
            category: "Programming & Tech",
            posted: "2 hours ago",
            proposals: 12,
            verified: true,
        },
        JobListing {
            id: 2,
            title: "Logo design for new startup",
            client: "GreenTech Solutions",
            budget: "₦200 - ₦500",
            timeline: "1 week",
            description: "We need a creative logo designer to create a modern, clean logo for our environmental tech startup...",
            category: "Graphics & Design",
            posted: "5 hours ago",
            proposals: 8,
            verified: true,
        },
        JobListing {
            id: 3,
            title: "Content writer for blog articles",
            client: "Digital Marketing Pro",
            budget: "₦50 - ₦100",
            timeline: "3 days",
            description: "Seeking a skilled content writer to create engaging blog posts about digital marketing trends...",
            category: "Writing & Translation",
            posted: "1 day ago",
            proposals: 15,
            verified: true,
        },
    ]
}

/// Search term and category selection
#[derive(Debug, Clone)]
pub struct ListingFilter {
    pub search: String,
    pub category: String,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl ListingFilter {
    /// Case-insensitive: the search term must appear in one of `haystacks`
    /// and the category must match unless the filter is `all`.
    fn matches(&self, haystacks: &[&str], category: &str) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || haystacks
                .iter()
                .any(|text| text.to_lowercase().contains(&needle));

        let matches_category = self.category.eq_ignore_ascii_case(ALL_CATEGORIES)
            || self.category.to_lowercase() == category.to_lowercase();

        matches_search && matches_category
    }

    pub fn services<'a>(&self, services: &'a [ServiceListing]) -> Vec<&'a ServiceListing> {
        services
            .iter()
            .filter(|s| self.matches(&[s.title, s.freelancer], s.category))
            .collect()
    }

    pub fn jobs<'a>(&self, jobs: &'a [JobListing]) -> Vec<&'a JobListing> {
        jobs.iter()
            .filter(|j| self.matches(&[j.title, j.client], j.category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_returns_everything() {
        let filter = ListingFilter::default();
        assert_eq!(filter.services(&sample_services()).len(), 4);
        assert_eq!(filter.jobs(&sample_jobs()).len(), 3);
    }

    #[test]
    fn search_matches_title_or_person() {
        let services = sample_services();
        let filter = ListingFilter {
            search: "mike".into(),
            ..ListingFilter::default()
        };
        let found = filter.services(&services);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);

        let jobs = sample_jobs();
        let filter = ListingFilter {
            search: "REACT".into(),
            ..ListingFilter::default()
        };
        assert_eq!(filter.jobs(&jobs).len(), 1);
    }

    #[test]
    fn category_filter_is_case_insensitive() {
        let services = sample_services();
        let filter = ListingFilter {
            search: String::new(),
            category: "graphics & design".into(),
        };
        let found = filter.services(&services);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].freelancer, "Mike Chen");

        let filter = ListingFilter {
            search: "logo".into(),
            category: "Finance".into(),
        };
        assert!(filter.services(&services).is_empty());
    }
}
