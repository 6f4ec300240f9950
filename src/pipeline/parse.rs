//! Parsing agent output into [`Opportunity`] records.
//!
//! Two output shapes are accepted:
//!
//! - a JSON array of opportunity objects, optionally wrapped in a
//!   ```` ```json ```` code fence
//! - the readable block format the system prompt asks for:
//!
//! ```text
//! Found 1 new job opportunity:
//!
//! Job 1:
//!   title: Care Assistant
//!   Country: Germany
//!   Official Link: https://example.org/job/1
//! ```

use crate::prompts::NO_OPPORTUNITIES;
use crate::types::Opportunity;
use crate::{JobscoutError, Result};

/// Parse agent output into opportunities.
///
/// Output containing "No new opportunities" and no job blocks yields an
/// empty list. Blocks without a title are skipped.
pub fn parse_opportunities(output: &str) -> Result<Vec<Opportunity>> {
    let trimmed = strip_code_fence(output.trim());

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| JobscoutError::Parse(format!("invalid opportunity JSON: {e}")));
    }

    let blocks = parse_blocks(trimmed);
    if blocks.is_empty() {
        if trimmed.is_empty() || trimmed.contains(NO_OPPORTUNITIES) {
            return Ok(Vec::new());
        }
        return Err(JobscoutError::Parse(
            "output holds neither a JSON array nor any \"Job N:\" blocks".to_string(),
        ));
    }
    Ok(blocks)
}

/// Count the `Job N:` headers in readable agent output.
pub fn count_job_blocks(output: &str) -> usize {
    output.lines().filter(|l| is_job_header(l.trim())).count()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string (e.g. `json`) on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn is_job_header(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("Job ") else {
        return false;
    };
    let Some(number) = rest.strip_suffix(':') else {
        return false;
    };
    !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Description,
    Country,
    CityOrRegion,
    Field,
    LanguageLevel,
    VisaInfo,
    Salary,
    OfficialLink,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        let field = match label.trim().to_ascii_lowercase().as_str() {
            "title" | "job title" => Field::Title,
            "description" => Field::Description,
            "country" => Field::Country,
            "city/region" | "city" | "region" | "city or region" => Field::CityOrRegion,
            "field" | "industry" => Field::Field,
            "language level" | "language" | "language requirements" => Field::LanguageLevel,
            "visa information" | "visa" | "visa info" => Field::VisaInfo,
            "salary" => Field::Salary,
            "official link" | "link" | "url" => Field::OfficialLink,
            _ => return None,
        };
        Some(field)
    }

    fn slot(self, opp: &mut Opportunity) -> &mut String {
        match self {
            Field::Title => &mut opp.title,
            Field::Description => &mut opp.description,
            Field::Country => &mut opp.country,
            Field::CityOrRegion => &mut opp.city_or_region,
            Field::Field => &mut opp.field,
            Field::LanguageLevel => &mut opp.language_level,
            Field::VisaInfo => &mut opp.visa_info,
            Field::Salary => &mut opp.salary,
            Field::OfficialLink => &mut opp.official_link,
        }
    }
}

fn parse_blocks(text: &str) -> Vec<Opportunity> {
    let mut parsed = Vec::new();
    let mut current: Option<Opportunity> = None;
    let mut last_field: Option<Field> = None;

    for line in text.lines() {
        let line = line.trim();
        if is_job_header(line) {
            parsed.extend(current.take());
            current = Some(Opportunity::default());
            last_field = None;
            continue;
        }
        let Some(opp) = current.as_mut() else {
            continue;
        };
        if line.is_empty() {
            last_field = None;
            continue;
        }

        let labelled = line
            .split_once(':')
            .and_then(|(label, value)| Field::from_label(label).map(|f| (f, value.trim())));
        match (labelled, last_field) {
            (Some((field, value)), _) => {
                *field.slot(opp) = value.to_string();
                last_field = Some(field);
            }
            // wrapped continuation of the previous value
            (None, Some(field)) => {
                let slot = field.slot(opp);
                if !slot.is_empty() {
                    slot.push(' ');
                }
                slot.push_str(line);
            }
            (None, None) => {}
        }
    }
    parsed.extend(current);
    parsed.retain(|o| !o.title.is_empty());
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const READABLE: &str = "Found 2 new job opportunities:

Job 1:
  title: Care Assistant (Ausbildung)
  description: Three-year nursing apprenticeship.
    Paid monthly.
  Country: Germany
  City/Region: Bavaria
  Field: Healthcare
  Language Level: German B1
  Visa Information: Training visa supported
  Salary: €1,100 per month
  Official Link: https://example.org/pflege

Job 2:
  title: Truck Driver
  Country: Canada
  Official Link: https://example.ca/lmia/42
";

    #[test]
    fn parses_readable_blocks() {
        let opps = parse_opportunities(READABLE).unwrap();
        assert_eq!(opps.len(), 2);
        assert_eq!(opps[0].title, "Care Assistant (Ausbildung)");
        assert_eq!(
            opps[0].description,
            "Three-year nursing apprenticeship. Paid monthly."
        );
        assert_eq!(opps[0].city_or_region, "Bavaria");
        assert_eq!(opps[0].official_link, "https://example.org/pflege");
        assert_eq!(opps[1].country, "Canada");
        assert!(opps[1].salary.is_empty());
    }

    #[test]
    fn link_value_keeps_its_colon() {
        let opps = parse_opportunities("Job 1:\n  title: X\n  Official Link: https://a.b/c").unwrap();
        assert_eq!(opps[0].official_link, "https://a.b/c");
    }

    #[test]
    fn parses_fenced_json() {
        let output = "```json\n[{\"title\":\"Welder\",\"country\":\"Canada\",\"official_link\":\"https://w\"}]\n```";
        let opps = parse_opportunities(output).unwrap();
        assert_eq!(opps, vec![Opportunity::new("Welder", "Canada", "https://w")]);
    }

    #[test]
    fn no_opportunities_is_empty() {
        assert!(parse_opportunities("No new opportunities found.").unwrap().is_empty());
        assert!(parse_opportunities("   ").unwrap().is_empty());
    }

    #[test]
    fn unstructured_text_is_an_error() {
        assert!(matches!(
            parse_opportunities("I could not find anything useful today"),
            Err(JobscoutError::Parse(_))
        ));
    }

    #[test]
    fn counts_job_headers() {
        assert_eq!(count_job_blocks(READABLE), 2);
        assert_eq!(count_job_blocks("Jobs are scarce. Job 1 is gone."), 0);
    }
}
