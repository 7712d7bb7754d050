/// Scenario form state — the single source of truth for user input.
///
/// `FormInput` keeps every field private and exposes one named setter per
/// field, so the validator and the controller always observe a value that
/// went through the registry. Free text is stored exactly as typed;
/// normalization (comma splitting, trimming) only happens when a wire
/// request is built from the form.

// ── Sustainability goal catalog ───────────────────────────────────────────────

/// One tag from the fixed catalog of desired environmental outcomes.
///
/// Two string projections exist: `label()` is what the user sees in the
/// form and in messages, `tag()` is the raw value sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SustainabilityGoal {
    ReduceCarbonEmissions,
    IncreaseRenewableEnergy,
    EnhancePublicTransportation,
    PromoteGreenSpaces,
    WasteManagementImprovement,
}

/// Display order of the catalog in the form's goal row.
pub const GOAL_CATALOG: [SustainabilityGoal; 5] = [
    SustainabilityGoal::ReduceCarbonEmissions,
    SustainabilityGoal::IncreaseRenewableEnergy,
    SustainabilityGoal::EnhancePublicTransportation,
    SustainabilityGoal::PromoteGreenSpaces,
    SustainabilityGoal::WasteManagementImprovement,
];

impl SustainabilityGoal {
    pub fn label(self) -> &'static str {
        match self {
            Self::ReduceCarbonEmissions => "Reduce carbon emissions",
            Self::IncreaseRenewableEnergy => "Increase renewable energy",
            Self::EnhancePublicTransportation => "Enhance public transportation",
            Self::PromoteGreenSpaces => "Promote green spaces",
            Self::WasteManagementImprovement => "Waste management improvement",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::ReduceCarbonEmissions => "reduce_carbon_emissions",
            Self::IncreaseRenewableEnergy => "increase_renewable_energy",
            Self::EnhancePublicTransportation => "enhance_public_transportation",
            Self::PromoteGreenSpaces => "promote_green_spaces",
            Self::WasteManagementImprovement => "waste_management_improvement",
        }
    }

    /// Parse a CLI argument into a goal. Accepts the wire tag or the
    /// display label, case-insensitively.
    pub fn from_arg(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        GOAL_CATALOG.into_iter().find(|g| {
            g.tag() == wanted || g.label().to_lowercase() == wanted
        })
    }
}

// ── FormInput ─────────────────────────────────────────────────────────────────

/// The complete set of user-entered scenario parameters for one
/// plan-generation attempt. Created empty, mutated field-by-field, and
/// reset to empty on "new".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    land_area: String,
    population: String,
    zoning: String,
    infrastructure: String,
    goals: Vec<SustainabilityGoal>,
    budget: String,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn land_area(&self) -> &str {
        &self.land_area
    }

    pub fn population(&self) -> &str {
        &self.population
    }

    pub fn zoning(&self) -> &str {
        &self.zoning
    }

    pub fn infrastructure(&self) -> &str {
        &self.infrastructure
    }

    pub fn goals(&self) -> &[SustainabilityGoal] {
        &self.goals
    }

    pub fn budget(&self) -> &str {
        &self.budget
    }

    pub fn set_land_area(&mut self, value: impl Into<String>) {
        self.land_area = value.into();
    }

    pub fn set_population(&mut self, value: impl Into<String>) {
        self.population = value.into();
    }

    pub fn set_zoning(&mut self, value: impl Into<String>) {
        self.zoning = value.into();
    }

    pub fn set_infrastructure(&mut self, value: impl Into<String>) {
        self.infrastructure = value.into();
    }

    pub fn set_budget(&mut self, value: impl Into<String>) {
        self.budget = value.into();
    }

    pub fn has_goal(&self, goal: SustainabilityGoal) -> bool {
        self.goals.contains(&goal)
    }

    /// Select or deselect a goal. Selection order is preserved for display;
    /// a goal is never held twice.
    pub fn toggle_goal(&mut self, goal: SustainabilityGoal) {
        if let Some(pos) = self.goals.iter().position(|g| *g == goal) {
            self.goals.remove(pos);
        } else {
            self.goals.push(goal);
        }
    }

    /// The existing-infrastructure free text split on commas, each segment
    /// trimmed, empty segments dropped.
    pub fn infrastructure_list(&self) -> Vec<String> {
        self.infrastructure
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Reset every field to its empty default ("new").
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_list_trims_and_drops_empties() {
        let mut form = FormInput::new();
        form.set_infrastructure("road, water plant");
        assert_eq!(form.infrastructure_list(), vec!["road", "water plant"]);

        form.set_infrastructure("  metro line ,, roads , ");
        assert_eq!(form.infrastructure_list(), vec!["metro line", "roads"]);

        form.set_infrastructure("   ");
        assert!(form.infrastructure_list().is_empty());

        form.set_infrastructure("");
        assert!(form.infrastructure_list().is_empty());
    }

    #[test]
    fn test_toggle_goal_preserves_order_and_never_duplicates() {
        let mut form = FormInput::new();
        form.toggle_goal(SustainabilityGoal::PromoteGreenSpaces);
        form.toggle_goal(SustainabilityGoal::ReduceCarbonEmissions);
        form.toggle_goal(SustainabilityGoal::ReduceCarbonEmissions);
        assert_eq!(form.goals(), &[SustainabilityGoal::PromoteGreenSpaces]);

        form.toggle_goal(SustainabilityGoal::IncreaseRenewableEnergy);
        assert_eq!(
            form.goals(),
            &[
                SustainabilityGoal::PromoteGreenSpaces,
                SustainabilityGoal::IncreaseRenewableEnergy,
            ]
        );
    }

    #[test]
    fn test_clear_resets_every_field() {
        let mut form = FormInput::new();
        form.set_land_area("12");
        form.set_population("5000");
        form.set_zoning("residential");
        form.set_infrastructure("road");
        form.set_budget("10");
        form.toggle_goal(SustainabilityGoal::PromoteGreenSpaces);

        form.clear();
        assert_eq!(form, FormInput::default());
    }

    #[test]
    fn test_goal_from_arg_accepts_tag_and_label() {
        assert_eq!(
            SustainabilityGoal::from_arg("promote_green_spaces"),
            Some(SustainabilityGoal::PromoteGreenSpaces)
        );
        assert_eq!(
            SustainabilityGoal::from_arg("Promote green spaces"),
            Some(SustainabilityGoal::PromoteGreenSpaces)
        );
        assert_eq!(
            SustainabilityGoal::from_arg(" WASTE MANAGEMENT IMPROVEMENT "),
            Some(SustainabilityGoal::WasteManagementImprovement)
        );
        assert_eq!(SustainabilityGoal::from_arg("fusion power"), None);
    }
}
