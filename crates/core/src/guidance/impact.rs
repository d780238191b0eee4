//! Impact & SDGs section content.

/// An outbound link rendered as a chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkChip {
    pub label: &'static str,
    pub url: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SdgGoal {
    pub number: u8,
    pub name: &'static str,
}

/// Carbon-credit explainer, one paragraph per bullet.
pub const CARBON_CREDIT_NOTES: &[&str] = &[
    "Carbon credits (what they are): A carbon credit represents 1 tonne of CO₂-equivalent \
     reduced or removed. Credits exist only when a registered project follows an approved \
     methodology and passes MRV; they are then issued on a registry (e.g., Gold Standard, \
     Verra, or Japan’s J-Credit).",
    "This app does not issue credits. It helps people sort properly. You may show educational \
     CO₂e-avoided estimates, but that is not the same as credits.",
];

pub const CARBON_LINKS: &[LinkChip] = &[
    LinkChip {
        label: "UN Carbon Offset Platform",
        url: "https://unfccc.int/climate-action/united-nations-carbon-offset-platform",
    },
    LinkChip {
        label: "Climate Neutral Now (shop credits)",
        url: "https://offset.climateneutralnow.org/",
    },
    LinkChip {
        label: "World Bank: MRV & 1 credit = 1 tCO₂e",
        url: "https://www.worldbank.org/en/news/feature/2022/07/27/what-you-need-to-know-about-the-measurement-reporting-and-verification-mrv-of-carbon-credits",
    },
    LinkChip {
        label: "Gold Standard (program)",
        url: "https://www.goldstandard.org/",
    },
    LinkChip {
        label: "Verra VCS (program)",
        url: "https://verra.org/programs/verified-carbon-standard/",
    },
    LinkChip {
        label: "Japan J-Credit (official)",
        url: "https://japancredit.go.jp/english/",
    },
];

pub const SDG_FOCUS: &[SdgGoal] = &[
    SdgGoal {
        number: 12,
        name: "Responsible Consumption & Production",
    },
    SdgGoal {
        number: 11,
        name: "Sustainable Cities & Communities",
    },
    SdgGoal {
        number: 13,
        name: "Climate Action",
    },
    SdgGoal {
        number: 14,
        name: "Life Below Water",
    },
];

impl SdgGoal {
    /// UN goal page for this SDG.
    pub fn url(&self) -> String {
        format!("https://sdgs.un.org/goals/goal{}", self.number)
    }
}
