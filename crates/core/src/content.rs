//! Resume content and the markup it populates.
//!
//! The record is read as-is: absent sections become `MissingData` errors
//! that the page logs and skips, and absent fields inside an entry render
//! as empty strings.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use folio_protocol::{DomCommand, ElementId};
use serde::{Deserialize, Serialize};

use crate::error::FolioError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personal {
    pub name: String,
    pub title: String,
    pub email: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub position: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub tagline: String,
    pub date: String,
    pub icon: String,
    pub description: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeContent {
    pub personal: Option<Personal>,
    pub experience: Option<Vec<Experience>>,
    pub projects: Option<Vec<Project>>,
    pub skills: Option<BTreeMap<String, Vec<Skill>>>,
}

/// Markup for one container plus the ids of the items inside it, in
/// document order, for staged reveals.
#[derive(Debug, Clone, PartialEq)]
pub struct Populated {
    pub html: String,
    pub items: Vec<ElementId>,
}

impl Populated {
    pub fn into_command(self, target: &ElementId) -> (DomCommand, Vec<ElementId>) {
        (
            DomCommand::ReplaceChildren {
                target: target.clone(),
                html: self.html,
            },
            self.items,
        )
    }
}

impl ResumeContent {
    pub fn from_json(data: &[u8]) -> Result<Self, FolioError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn experience_markup(&self) -> Result<Populated, FolioError> {
        let jobs = self
            .experience
            .as_ref()
            .ok_or_else(|| FolioError::missing_data("experience", "experience"))?;

        let mut html = String::new();
        let mut items = Vec::with_capacity(jobs.len());
        for (i, job) in jobs.iter().enumerate() {
            let id = ElementId::from(format!("experience-{i}"));
            let _ = write!(
                html,
                r#"<div class="timeline-item" id="{id}"><div class="experience-header"><div class="experience-title"><h3>{position}</h3><p class="experience-company">{company}</p><p class="experience-location">{location}</p></div><div class="experience-date">{start} - {end}</div></div><ul class="experience-description">"#,
                position = escape_html(&job.position),
                company = escape_html(&job.company),
                location = escape_html(&job.location),
                start = escape_html(&job.start_date),
                end = escape_html(&job.end_date),
            );
            for line in &job.description {
                let _ = write!(html, "<li>{}</li>", escape_html(line));
            }
            html.push_str("</ul></div>");
            items.push(id);
        }
        Ok(Populated { html, items })
    }

    pub fn project_markup(&self) -> Result<Populated, FolioError> {
        let projects = self
            .projects
            .as_ref()
            .ok_or_else(|| FolioError::missing_data("projects", "projects"))?;

        let mut html = String::new();
        let mut items = Vec::with_capacity(projects.len());
        for (i, project) in projects.iter().enumerate() {
            let id = ElementId::from(format!("project-{i}"));
            let _ = write!(
                html,
                r#"<div class="project-card" id="{id}"><div class="project-header"><i class="fas {icon} project-icon"></i><span class="project-date">{date}</span></div><h3>{name}</h3><p class="project-tagline">{tagline}</p>"#,
                icon = escape_html(&project.icon),
                date = escape_html(&project.date),
                name = escape_html(&project.name),
                tagline = escape_html(&project.tagline),
            );
            for paragraph in &project.description {
                let _ = write!(html, "<p>{}</p>", escape_html(paragraph));
            }
            html.push_str(r#"<div class="project-tech">"#);
            for tech in &project.technologies {
                let _ = write!(html, r#"<span class="tech-tag">{}</span>"#, escape_html(tech));
            }
            html.push_str("</div></div>");
            items.push(id);
        }
        Ok(Populated { html, items })
    }

    pub fn skill_markup(&self, category: &str) -> Result<Populated, FolioError> {
        let skills = self
            .skills
            .as_ref()
            .ok_or_else(|| FolioError::missing_data("skills", "skills"))?
            .get(category)
            .ok_or_else(|| FolioError::missing_data("skills", category))?;

        let mut html = String::from(r#"<div class="skills-grid">"#);
        let mut items = Vec::with_capacity(skills.len());
        for (i, skill) in skills.iter().enumerate() {
            let id = ElementId::from(format!("skill-{i}"));
            let _ = write!(
                html,
                r#"<div class="skill-item" id="{id}" style="transition-delay:{delay}s"><i class="fas {icon}"></i><span>{name}</span></div>"#,
                delay = format!("{:.2}", i as f64 * 0.05),
                icon = escape_html(&skill.icon),
                name = escape_html(&skill.name),
            );
            items.push(id);
        }
        html.push_str("</div>");
        Ok(Populated { html, items })
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Tabbed skills panel. Exactly one tab carries the active class.
#[derive(Debug, Clone)]
pub struct SkillsPanel {
    container: ElementId,
    /// (category key, tab element)
    tabs: Vec<(String, ElementId)>,
    active: Option<String>,
}

impl SkillsPanel {
    pub const DEFAULT_CATEGORY: &'static str = "languages";

    pub fn new(container: ElementId, tabs: Vec<(String, ElementId)>) -> Result<Self, FolioError> {
        if tabs.is_empty() {
            return Err(FolioError::missing_element("skills", ".skill-tab"));
        }
        Ok(Self {
            container,
            tabs,
            active: None,
        })
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Switch to `category`. The tab marker always moves; the panel is only
    /// re-rendered when the category has content, otherwise it keeps showing
    /// the previous category.
    pub fn select(&mut self, category: &str, content: &ResumeContent) -> SkillSelection {
        let mut tabs = Vec::new();
        for (key, tab) in &self.tabs {
            if key == category {
                tabs.push(DomCommand::add_class(tab, "active"));
            } else if self.active.as_deref() == Some(key.as_str()) {
                tabs.push(DomCommand::remove_class(tab, "active"));
            }
        }
        self.active = Some(category.to_string());

        let panel = content
            .skill_markup(category)
            .map(|populated| populated.into_command(&self.container));
        SkillSelection { tabs, panel }
    }
}

/// Result of a tab switch.
#[derive(Debug)]
pub struct SkillSelection {
    pub tabs: Vec<DomCommand>,
    /// Replacement panel and the skill item ids to reveal.
    pub panel: Result<(DomCommand, Vec<ElementId>), FolioError>,
}
