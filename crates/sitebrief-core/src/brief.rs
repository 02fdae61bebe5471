//! Project brief: the structured description a client builds up before handoff.
//!
//! The brief is mutated only by the client-side orchestrator (manual edits or
//! quick presets); the bridge and the handoff service treat it as read-only.

use serde::{Deserialize, Serialize};

/// Default visual style for a new brief.
pub const DEFAULT_STYLE: &str = "Modern";

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

/// Structured description of a prospective website project. No field is
/// required at creation; a usable title and description only have to be
/// derivable at handoff time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Free text: may contain currency symbols and ranges.
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for Brief {
    fn default() -> Self {
        Self {
            company_name: None,
            industry: None,
            budget: None,
            style: default_style(),
            description: None,
        }
    }
}

fn or_dash(field: &Option<String>) -> &str {
    field.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or("—")
}

impl Brief {
    /// Compact single-line form used to open a conversation with the assistant.
    pub fn to_line(&self) -> String {
        let company = self
            .company_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Untitled");
        let style = if self.style.trim().is_empty() {
            "—"
        } else {
            self.style.as_str()
        };
        format!(
            "Brief • {} — {} | {} | {} — {}",
            company,
            or_dash(&self.industry),
            or_dash(&self.budget),
            style,
            or_dash(&self.description),
        )
    }

    /// Title used for the handoff record: `Project: <company>` or
    /// `Project: New Lead` when no company name was captured.
    pub fn title(&self) -> String {
        let company = self
            .company_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("New Lead");
        format!("Project: {}", company)
    }

    /// Merges a quick preset over this brief. Preset fields win; everything
    /// the preset does not set survives.
    pub fn apply_preset(&mut self, preset: QuickPreset) {
        self.industry = Some(preset.industry().to_string());
        self.style = preset.style().to_string();
        self.budget = Some(preset.budget().to_string());
    }
}

/// Quick-start presets offered on the dashboard. Each prefills industry,
/// style, and a typical budget range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickPreset {
    PortfolioSite,
    ECommerce,
    RestaurantFood,
    BusinessWebsite,
}

impl QuickPreset {
    /// All presets in display order.
    pub const ALL: [QuickPreset; 4] = [
        QuickPreset::PortfolioSite,
        QuickPreset::ECommerce,
        QuickPreset::RestaurantFood,
        QuickPreset::BusinessWebsite,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QuickPreset::PortfolioSite => "Portfolio Site",
            QuickPreset::ECommerce => "E-Commerce",
            QuickPreset::RestaurantFood => "Restaurant / Food",
            QuickPreset::BusinessWebsite => "Business Website",
        }
    }

    fn industry(&self) -> &'static str {
        match self {
            QuickPreset::PortfolioSite => "Creative / Portfolio",
            QuickPreset::ECommerce => "Retail / E-commerce",
            QuickPreset::RestaurantFood => "Food & Beverage",
            QuickPreset::BusinessWebsite => "Corporate",
        }
    }

    fn style(&self) -> &'static str {
        match self {
            QuickPreset::PortfolioSite => "Minimal",
            QuickPreset::ECommerce => "Modern",
            QuickPreset::RestaurantFood => "Warm",
            QuickPreset::BusinessWebsite => "Professional",
        }
    }

    fn budget(&self) -> &'static str {
        match self {
            QuickPreset::PortfolioSite => "₦40k–₦100k",
            QuickPreset::ECommerce => "₦150k–₦400k",
            QuickPreset::RestaurantFood => "₦60k–₦150k",
            QuickPreset::BusinessWebsite => "₦50k–₦200k",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_brief_renders_placeholders() {
        let brief = Brief::default();
        assert_eq!(brief.style, "Modern");
        assert_eq!(brief.to_line(), "Brief • Untitled — — | — | Modern — —");
    }

    #[test]
    fn filled_brief_renders_all_fields() {
        let brief = Brief {
            company_name: Some("Bubey's Bite".into()),
            industry: Some("Food & Beverage".into()),
            budget: Some("₦60k–₦150k".into()),
            style: "Warm".into(),
            description: Some("increase orders".into()),
        };
        assert_eq!(
            brief.to_line(),
            "Brief • Bubey's Bite — Food & Beverage | ₦60k–₦150k | Warm — increase orders"
        );
    }

    #[test]
    fn title_uses_company_or_new_lead() {
        let mut brief = Brief::default();
        assert_eq!(brief.title(), "Project: New Lead");
        brief.company_name = Some("   ".into());
        assert_eq!(brief.title(), "Project: New Lead");
        brief.company_name = Some("Bubey's Bite".into());
        assert_eq!(brief.title(), "Project: Bubey's Bite");
    }

    #[test]
    fn preset_labels_are_stable() {
        let labels: Vec<&str> = QuickPreset::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            ["Portfolio Site", "E-Commerce", "Restaurant / Food", "Business Website"]
        );
    }

    #[test]
    fn preset_merges_over_current_brief() {
        let mut brief = Brief {
            company_name: Some("Bubey's Bite".into()),
            description: Some("increase orders".into()),
            ..Brief::default()
        };
        brief.apply_preset(QuickPreset::RestaurantFood);
        assert_eq!(brief.industry.as_deref(), Some("Food & Beverage"));
        assert_eq!(brief.style, "Warm");
        assert_eq!(brief.budget.as_deref(), Some("₦60k–₦150k"));
        // untouched fields survive
        assert_eq!(brief.company_name.as_deref(), Some("Bubey's Bite"));
        assert_eq!(brief.description.as_deref(), Some("increase orders"));
    }
}
