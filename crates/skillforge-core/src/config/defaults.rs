//! Built-in defaults: which agents consume which skill categories, and which
//! subcategories are preloaded into an agent's context.
//!
//! A source root can replace any prefix entry through
//! `config/agent-mappings.yaml`.

use std::collections::BTreeMap;

/// Where project-local skills live, relative to the project root.
pub const LOCAL_SKILLS_DIR: &str = ".claude/skills";

/// Where compiled agents are written, relative to the project root.
pub const LOCAL_AGENTS_DIR: &str = ".claude/agents";

/// The persisted project config, relative to the project root.
pub const PROJECT_CONFIG_PATH: &str = ".claude/config.yaml";

/// Subcategories holding a project's primary technology choices. Skills in
/// these are preloaded; everything else is activated on demand.
pub const KEY_SUBCATEGORIES: &[&str] = &[
    "framework",
    "api",
    "database",
    "platform",
    "mobile-framework",
    "cli-framework",
];

/// Category prefix -> consuming agents.
///
/// | Prefix               | Agents                                        |
/// |----------------------|-----------------------------------------------|
/// | `web`                | web-developer, web-reviewer                   |
/// | `web/testing`        | + web-tester                                  |
/// | `api`                | api-developer, api-reviewer                   |
/// | `api/testing`        | + api-tester                                  |
/// | `cli`                | cli-developer, cli-reviewer                   |
/// | `mobile`             | mobile-developer                              |
/// | `infra`              | api-developer                                 |
/// | `security`           | web-reviewer, api-reviewer                    |
/// | `shared/methodology` | every developer and reviewer                  |
/// | `shared/research`    | web-researcher, api-researcher                |
/// | `meta`               | pattern-scout, documentor                     |
const DEFAULT_AGENT_MAPPINGS: &[(&str, &[&str])] = &[
    ("web", &["web-developer", "web-reviewer"]),
    ("web/testing", &["web-tester"]),
    ("api", &["api-developer", "api-reviewer"]),
    ("api/testing", &["api-tester"]),
    ("cli", &["cli-developer", "cli-reviewer"]),
    ("mobile", &["mobile-developer"]),
    ("infra", &["api-developer"]),
    ("security", &["web-reviewer", "api-reviewer"]),
    (
        "shared/methodology",
        &[
            "web-developer",
            "web-reviewer",
            "api-developer",
            "api-reviewer",
            "cli-developer",
            "cli-reviewer",
        ],
    ),
    ("shared/research", &["web-researcher", "api-researcher"]),
    ("meta", &["pattern-scout", "documentor"]),
];

/// The built-in category mappings as an owned map.
pub fn default_agent_mappings() -> BTreeMap<String, Vec<String>> {
    DEFAULT_AGENT_MAPPINGS
        .iter()
        .map(|(prefix, agents)| {
            (
                (*prefix).to_string(),
                agents.iter().map(|a| (*a).to_string()).collect(),
            )
        })
        .collect()
}

/// Whether skills in this subcategory are preloaded.
pub fn is_key_subcategory(subcategory: &str) -> bool {
    KEY_SUBCATEGORIES.contains(&subcategory)
}
