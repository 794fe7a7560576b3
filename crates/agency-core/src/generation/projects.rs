//! Project creation from templates.

use agency_logic::satisfaction::assess_risk;

use crate::catalog::ProjectTemplate;
use crate::components::{PhaseMap, Project};

/// Per-instance adjustments on top of a template.
#[derive(Debug, Clone)]
pub struct ProjectOverrides {
    pub id: Option<String>,
    pub budget: Option<i64>,
    pub weeks: Option<f64>,
    /// Multiplier on the final budget (reputation penalties).
    pub budget_factor: f64,
}

impl Default for ProjectOverrides {
    fn default() -> Self {
        Self {
            id: None,
            budget: None,
            weeks: None,
            budget_factor: 1.0,
        }
    }
}

/// Schedule length derived from complexity.
pub fn weeks_for_complexity(complexity: u32) -> f64 {
    (complexity + 1).clamp(2, 6) as f64
}

pub fn create_from_template(template: &ProjectTemplate, overrides: &ProjectOverrides) -> Project {
    let complexity = template.complexity as f64;
    let phases = PhaseMap::from_hours(|kind| complexity * kind.hours_multiplier());
    let weeks = overrides
        .weeks
        .or(template.weeks)
        .unwrap_or_else(|| weeks_for_complexity(template.complexity));
    let budget = overrides.budget.unwrap_or(template.budget) as f64 * overrides.budget_factor;

    let mut project = Project {
        id: overrides.id.clone().unwrap_or_else(|| template.id.clone()),
        template_id: template.id.clone(),
        name: template.name.clone(),
        client: template.client.clone(),
        client_profile: template.client_profile,
        budget: budget.round() as i64,
        total_weeks: weeks,
        weeks_remaining: weeks,
        phases,
        ..Default::default()
    };
    project.original_estimated_hours = project.estimated_hours();
    project.risk = assess_risk(
        project.estimated_hours(),
        project.original_estimated_hours,
        project.weeks_remaining,
        project.satisfaction,
        0,
    );
    project
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_logic::efficiency::PhaseKind;
    use agency_logic::satisfaction::ClientProfile;

    fn template(complexity: u32) -> ProjectTemplate {
        ProjectTemplate {
            id: "landing".into(),
            name: "Landing Page".into(),
            client: "Acme".into(),
            complexity,
            budget: 10_000,
            weeks: None,
            client_profile: ClientProfile::default(),
        }
    }

    #[test]
    fn test_complexity_one_hours_and_weeks() {
        let p = create_from_template(&template(1), &ProjectOverrides::default());
        assert_eq!(p.phases.get(PhaseKind::Management).hours_required, 3.0);
        assert_eq!(p.phases.get(PhaseKind::Design).hours_required, 4.0);
        assert_eq!(p.phases.get(PhaseKind::Development).hours_required, 5.0);
        assert_eq!(p.phases.get(PhaseKind::Review).hours_required, 3.0);
        assert_eq!(p.estimated_hours(), 15.0);
        assert_eq!(p.total_weeks, 2.0);
        assert_eq!(p.original_estimated_hours, 15.0);
    }

    #[test]
    fn test_weeks_clamped() {
        assert_eq!(weeks_for_complexity(0), 2.0);
        assert_eq!(weeks_for_complexity(3), 4.0);
        assert_eq!(weeks_for_complexity(9), 6.0);
    }

    #[test]
    fn test_overrides() {
        let p = create_from_template(
            &template(3),
            &ProjectOverrides {
                id: Some("landing-2".into()),
                weeks: Some(3.0),
                budget_factor: 0.7,
                ..Default::default()
            },
        );
        assert_eq!(p.id, "landing-2");
        assert_eq!(p.template_id, "landing");
        assert_eq!(p.total_weeks, 3.0);
        assert_eq!(p.budget, 7_000);
    }
}
