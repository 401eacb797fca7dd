//! Text rendering for compiled agents and plugin READMEs.
//!
//! An agent document is YAML frontmatter followed by a markdown body built
//! from the agent's partials. Preloaded skills are listed in the
//! frontmatter; dynamic skills get one activation entry each in the body.
//!
//! ```text
//! ---
//! name: web-developer
//! description: ...
//! tools: Read, Write
//! model: opus
//! skills:
//! - react (@acme)
//! ---
//!
//! # Web Developer
//!
//! <role>...</role>
//! <skill_activation>...</skill_activation>
//! <workflow>...</workflow>
//! ```

use serde::Serialize;

use skillforge_types::agent::{AgentPartials, CompiledAgent};
use skillforge_types::error::PipelineError;
use skillforge_types::skill::{ResolvedSkill, SkillDefinition};
use skillforge_types::stack::Stack;

#[derive(Serialize)]
struct AgentFrontmatter<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    tools: String,
    model: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skills: Vec<&'a str>,
}

/// Render the complete agent document.
pub fn render_agent(agent: &CompiledAgent, partials: &AgentPartials) -> Result<String, PipelineError> {
    let frontmatter = AgentFrontmatter {
        name: &agent.name,
        description: &agent.description,
        tools: agent.tools.join(", "),
        model: &agent.model,
        skills: agent.preloaded().map(|s| s.id.as_str()).collect(),
    };
    let yaml = serde_yaml_ng::to_string(&frontmatter).map_err(|e| PipelineError::Serialization {
        what: format!("frontmatter for agent '{}'", agent.name),
        reason: e.to_string(),
    })?;

    let mut sections = Vec::with_capacity(7);
    sections.push(format!("# {}", agent.title.trim()));
    sections.push(format!("<role>\n{}\n</role>", partials.intro.trim()));

    let dynamic: Vec<&ResolvedSkill> = agent.dynamic().collect();
    sections.push(skill_activation_section(&dynamic));

    sections.push(format!("<workflow>\n{}\n</workflow>", partials.workflow.trim()));

    if let Some(examples) = non_empty(partials.examples.as_deref()) {
        sections.push(format!("<examples>\n{examples}\n</examples>"));
    }
    if let Some(critical) = non_empty(partials.critical_requirements.as_deref()) {
        sections.push(format!(
            "<critical_requirements>\n{critical}\n</critical_requirements>"
        ));
    }
    if let Some(output) = non_empty(partials.output_format.as_deref()) {
        sections.push(format!("<output_format>\n{output}\n</output_format>"));
    }

    Ok(format!("---\n{yaml}---\n\n{}\n", sections.join("\n\n")))
}

/// One activation entry per dynamic skill, or a short note when every skill
/// is preloaded.
fn skill_activation_section(dynamic: &[&ResolvedSkill]) -> String {
    if dynamic.is_empty() {
        return "<skill_activation>\nAll skills for this agent are preloaded. No additional skills need to be activated.\n</skill_activation>".to_string();
    }

    let mut section = String::from(
        "<skill_activation>\nActivate these skills on demand with the Skill tool before working in their area.\n",
    );
    for skill in dynamic {
        section.push_str(&format!(
            "\n### {}\n- Description: {}\n- Invoke: `skill: \"{}\"`\n- Use when: {}\n",
            skill.id,
            skill.description.trim(),
            skill.id,
            skill.usage
        ));
    }
    section.push_str("</skill_activation>");
    section
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// README for a single-skill plugin.
pub fn render_skill_readme(skill: &SkillDefinition) -> String {
    let mut readme = format!("# {}\n\n{}\n", skill.name, skill.description.trim());

    readme.push_str(&format!("\n- Skill id: `{}`\n", skill.id));
    if let Some(author) = &skill.author {
        readme.push_str(&format!("- Author: {author}\n"));
    }
    if !skill.category.is_empty() {
        readme.push_str(&format!("- Category: {}\n", skill.category));
    }
    if !skill.tags.is_empty() {
        readme.push_str(&format!("- Tags: {}\n", skill.tags.join(", ")));
    }

    if !skill.requires.is_empty() {
        readme.push_str("\n## Requires\n\n");
        for required in &skill.requires {
            readme.push_str(&format!("- `{required}`\n"));
        }
    }

    readme
}

/// README for a stack plugin.
pub fn render_stack_readme(stack: &Stack, agents: &[String], skill_plugins: &[String]) -> String {
    let mut readme = format!("# {}\n", stack.name);
    if !stack.description.trim().is_empty() {
        readme.push_str(&format!("\n{}\n", stack.description.trim()));
    }

    readme.push_str("\n## Agents\n\n");
    for agent in agents {
        readme.push_str(&format!("- `{agent}`\n"));
    }

    if !skill_plugins.is_empty() {
        readme.push_str("\n## Skill plugins\n\n");
        for plugin in skill_plugins {
            readme.push_str(&format!("- `{plugin}`\n"));
        }
    }

    readme
}
