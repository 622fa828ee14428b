//! Registration form configuration.

use serde::Deserialize;

/// A faculty and the departments a student may pick under it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Faculty {
    pub name: String,
    pub departments: Vec<String>,
}

impl Faculty {
    fn new(name: &str, departments: &[&str]) -> Self {
        Self {
            name: name.into(),
            departments: departments.iter().map(|d| (*d).into()).collect(),
        }
    }
}

/// Faculty/department options offered on the registration form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistrationCatalog {
    pub faculties: Vec<Faculty>,
}

impl RegistrationCatalog {
    /// Departments under `faculty`, empty for an unknown faculty.
    pub fn departments(&self, faculty: &str) -> &[String] {
        self.faculties
            .iter()
            .find(|f| f.name == faculty)
            .map(|f| f.departments.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for RegistrationCatalog {
    fn default() -> Self {
        Self {
            faculties: vec![
                Faculty::new("Engineering", &["Civil", "Mechanical", "Electrical"]),
                Faculty::new(
                    "Economics",
                    &["Management", "Accounting", "Development Economics"],
                ),
                Faculty::new(
                    "Computer Science",
                    &["Information Systems", "Informatics", "Computer Science"],
                ),
                Faculty::new("Law", &["Law"]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_lists_departments() {
        let catalog = RegistrationCatalog::default();
        assert_eq!(catalog.faculties.len(), 4);
        assert_eq!(catalog.departments("Law"), ["Law".to_string()]);
        assert!(catalog.departments("Medicine").is_empty());
    }
}
