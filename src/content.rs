//! Link cards shown on the project page.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Paper,
    Github,
    Web,
    Games,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LinkCard {
    pub title: &'static str,
    pub description: &'static str,
    pub href: &'static str,
    pub icon: Icon,
}

pub const LINK_CARDS: &[LinkCard] = &[
    LinkCard {
        title: "Paper",
        description: "Adversarial Policies Beat Superhuman Go AIs",
        href: "https://arxiv.org/abs/2211.00241",
        icon: Icon::Paper,
    },
    LinkCard {
        title: "Code",
        description: "Training and evaluation code for the adversary",
        href: "https://github.com/HumanCompatibleAI/go_attack",
        icon: Icon::Github,
    },
    LinkCard {
        title: "Project page",
        description: "Overview, results and example games",
        href: "https://goattack.far.ai",
        icon: Icon::Web,
    },
    LinkCard {
        title: "Game viewer",
        description: "Browse adversary games against KataGo and other engines",
        href: "https://humancompatibleai.github.io/sgf-viewer/",
        icon: Icon::Games,
    },
];

pub fn cards_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(LINK_CARDS)
}
