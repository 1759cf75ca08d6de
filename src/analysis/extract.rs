use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// A bolded, optionally numbered heading at the start of a line, e.g.
/// `**3. Resume Objective**` or `**Resume Objective**`.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\*\*(?:\d+\.\s+)?([^*\n]+?)\*\*").expect("heading pattern is valid")
});

/// The four sections the analysis prompt demands, in contract order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionTitle {
    SkillsToHighlight,
    ProjectsToShowcase,
    ResumeObjective,
    InterviewPrepTips,
}

impl SectionTitle {
    pub const ALL: [SectionTitle; 4] = [
        SectionTitle::SkillsToHighlight,
        SectionTitle::ProjectsToShowcase,
        SectionTitle::ResumeObjective,
        SectionTitle::InterviewPrepTips,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            SectionTitle::SkillsToHighlight => "Skills to Highlight",
            SectionTitle::ProjectsToShowcase => "Projects to Showcase",
            SectionTitle::ResumeObjective => "Resume Objective",
            SectionTitle::InterviewPrepTips => "Interview Preparation Tips",
        }
    }
}

impl fmt::Display for SectionTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSection {
    pub title: SectionTitle,
    pub body: String,
}

/// Result of running all four titles over a response. When nothing matched in
/// non-empty text, the whole response is kept as unstructured fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub sections: Vec<(SectionTitle, Option<ExtractedSection>)>,
    pub fallback: Option<String>,
}

/// Finds the section under a heading matching `title` (case-insensitive) and
/// returns its body: everything up to the next bold heading or end of text.
/// An empty body, or one that itself starts with a bold marker (a mis-anchored
/// match that swallowed the next heading), counts as not found. Read-only and
/// idempotent.
pub fn extract_section(text: &str, title: &str) -> Option<String> {
    let headings: Vec<_> = HEADING_RE.captures_iter(text).collect();

    let index = headings.iter().position(|cap| {
        cap.get(1)
            .is_some_and(|m| m.as_str().trim().eq_ignore_ascii_case(title))
    })?;

    let start = headings[index].get(0)?.end();
    let end = headings
        .get(index + 1)
        .and_then(|cap| cap.get(0))
        .map_or(text.len(), |m| m.start());

    let body = text[start..end].trim();
    if body.is_empty() || body.starts_with("**") {
        return None;
    }
    Some(body.to_string())
}

/// Runs the four canonical titles, in order, over `text`.
pub fn extract_sections(text: &str) -> Extraction {
    let sections: Vec<(SectionTitle, Option<ExtractedSection>)> = SectionTitle::ALL
        .into_iter()
        .map(|title| {
            let section = extract_section(text, title.heading())
                .map(|body| ExtractedSection { title, body });
            (title, section)
        })
        .collect();

    let none_found = sections.iter().all(|(_, section)| section.is_none());
    let fallback = if none_found && !text.trim().is_empty() {
        Some(text.to_string())
    } else {
        None
    };

    Extraction { sections, fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "\
**1. Skills to Highlight**
Here are the skills worth leading with.
*   Rust: Called out in the job description and backed by three repositories.

**2. Projects to Showcase**
*   **cool-project**: A production-grade service matching the role's stack.

**3. Resume Objective**
Senior engineer seeking to build reliable systems at Acme Corp.

**4. Interview Preparation Tips**
*   **Technical/Domain Areas to Review:** Async Rust, API design.
*   **Example Interview Questions:** How do you handle backpressure?
*   **Strategic Advice:** Lead with the repository work.
";

    #[test]
    fn well_formed_response_yields_all_four_sections() {
        let extraction = extract_sections(FULL_RESPONSE);
        assert!(extraction.fallback.is_none());
        for (title, section) in &extraction.sections {
            let section = section
                .as_ref()
                .unwrap_or_else(|| panic!("missing section: {title}"));
            assert!(!section.body.is_empty());
        }
    }

    #[test]
    fn bodies_are_bounded_by_the_next_heading() {
        let objective = extract_section(FULL_RESPONSE, "Resume Objective").unwrap();
        assert_eq!(
            objective,
            "Senior engineer seeking to build reliable systems at Acme Corp."
        );
        assert!(!objective.contains("Interview Preparation"));
    }

    #[test]
    fn worked_example_from_two_adjacent_sections() {
        let text = "**1. Skills to Highlight**\nPython\n**2. Projects to Showcase**\nProj A";
        assert_eq!(
            extract_section(text, "Skills to Highlight").as_deref(),
            Some("Python")
        );
        assert_eq!(
            extract_section(text, "Projects to Showcase").as_deref(),
            Some("Proj A")
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let text = "**1. SKILLS TO HIGHLIGHT**\nRust";
        assert_eq!(
            extract_section(text, "Skills to Highlight").as_deref(),
            Some("Rust")
        );
    }

    #[test]
    fn unnumbered_headings_match_too() {
        let text = "**Resume Objective**\nA concise objective.";
        assert_eq!(
            extract_section(text, "Resume Objective").as_deref(),
            Some("A concise objective.")
        );
    }

    #[test]
    fn empty_body_is_not_found() {
        let text = "**1. Skills to Highlight**\n\n**2. Projects to Showcase**\nProj A";
        assert!(extract_section(text, "Skills to Highlight").is_none());
    }

    #[test]
    fn body_starting_with_bold_marker_is_not_found() {
        // a heading immediately followed by another leaves nothing to extract
        let text = "**1. Skills to Highlight**\n**not a real body**";
        assert!(extract_section(text, "Skills to Highlight").is_none());

        // a mis-anchored match whose capture begins at a same-line bold token
        let text = "**1. Skills to Highlight** **2. Projects to Showcase**\nProj A";
        assert!(extract_section(text, "Skills to Highlight").is_none());
    }

    #[test]
    fn missing_title_is_not_found() {
        assert!(extract_section(FULL_RESPONSE, "Salary Expectations").is_none());
    }

    #[test]
    fn zero_headings_surface_the_full_text_as_fallback() {
        let text = "The model ignored the format and wrote prose instead.";
        let extraction = extract_sections(text);
        assert!(extraction.sections.iter().all(|(_, s)| s.is_none()));
        assert_eq!(extraction.fallback.as_deref(), Some(text));
    }

    #[test]
    fn empty_text_has_no_fallback() {
        let extraction = extract_sections("   \n  ");
        assert!(extraction.fallback.is_none());
    }

    #[test]
    fn extraction_is_idempotent() {
        let first = extract_sections(FULL_RESPONSE);
        let second = extract_sections(FULL_RESPONSE);
        assert_eq!(first, second);
    }

    #[test]
    fn partial_responses_return_only_present_sections() {
        let text = "**3. Resume Objective**\nShip the thing.";
        let extraction = extract_sections(text);
        assert!(extraction.fallback.is_none());
        let found: Vec<_> = extraction
            .sections
            .iter()
            .filter(|(_, s)| s.is_some())
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(found, vec![SectionTitle::ResumeObjective]);
    }
}
