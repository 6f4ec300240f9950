//! Plain text and HTML email bodies.

use std::fmt::Write;

use crate::types::Opportunity;

const HTML_HEAD: &str = r#"<html>
<head>
  <meta charset="utf-8">
  <style>
    body { font-family: Arial, sans-serif; color: #111; }
    .card { border: 1px solid #e1e1e1; border-radius: 8px; padding: 12px; margin: 8px 0; }
    .title { font-size: 16px; font-weight: 600; color: #0b57d0; }
    .meta { color: #444; font-size: 13px; margin-top: 6px; }
    a.button { display: inline-block; margin-top: 8px; padding: 6px 10px; background: #0b57d0; color: #fff; text-decoration: none; border-radius: 4px; }
  </style>
</head>
<body>
  <h2>New International Job Opportunities</h2>
"#;

const HTML_TAIL: &str = "</body>\n</html>\n";

/// Render opportunities in the readable `Job N:` format.
pub fn render_text(opportunities: &[Opportunity]) -> String {
    let mut out = match opportunities.len() {
        1 => "Found 1 new job opportunity:\n".to_string(),
        n => format!("Found {n} new job opportunities:\n"),
    };
    for (i, opp) in opportunities.iter().enumerate() {
        let _ = writeln!(out, "\nJob {}:", i + 1);
        let fields = [
            ("title", &opp.title),
            ("description", &opp.description),
            ("Country", &opp.country),
            ("City/Region", &opp.city_or_region),
            ("Field", &opp.field),
            ("Language Level", &opp.language_level),
            ("Visa Information", &opp.visa_info),
            ("Salary", &opp.salary),
            ("Official Link", &opp.official_link),
        ];
        for (label, value) in fields {
            if !value.is_empty() {
                let _ = writeln!(out, "  {label}: {value}");
            }
        }
    }
    out
}

/// Render opportunities as HTML cards.
pub fn render_html(opportunities: &[Opportunity]) -> String {
    let mut out = String::from(HTML_HEAD);
    for opp in opportunities {
        let title = if opp.title.is_empty() {
            "No title"
        } else {
            &opp.title
        };
        let place = [&opp.field, &opp.city_or_region, &opp.country]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| escape(s))
            .collect::<Vec<_>>()
            .join(" • ");

        out.push_str("  <div class=\"card\">\n");
        let _ = writeln!(out, "    <div class=\"title\">{}</div>", escape(title));
        if !place.is_empty() {
            let _ = writeln!(out, "    <div class=\"meta\">{place}</div>");
        }
        let _ = writeln!(
            out,
            "    <div class=\"meta\">Language: {} • Visa: {} • Salary: {}</div>",
            escape(&opp.language_level),
            escape(&opp.visa_info),
            escape(&opp.salary)
        );
        if !opp.description.is_empty() {
            let _ = writeln!(out, "    <p>{}</p>", escape(&opp.description));
        }
        if !opp.official_link.is_empty() {
            let _ = writeln!(
                out,
                "    <a class=\"button\" href=\"{}\">View official listing</a>",
                escape(&opp.official_link)
            );
        }
        out.push_str("  </div>\n");
    }
    out.push_str(HTML_TAIL);
    out
}

/// Wrap free text in a minimal HTML document, keeping line breaks.
pub(crate) fn text_to_html(text: &str) -> String {
    format!("<div>{}</div>", escape(text).replace('\n', "<br />"))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse_opportunities;

    fn sample() -> Vec<Opportunity> {
        let mut opp = Opportunity::new("Welder", "Canada", "https://example.ca/welder");
        opp.salary = "$30/h".to_string();
        vec![opp, Opportunity::new("Baker", "Germany", "")]
    }

    #[test]
    fn text_round_trips_through_parser() {
        let text = render_text(&sample());
        assert!(text.starts_with("Found 2 new job opportunities:"));
        assert_eq!(parse_opportunities(&text).unwrap(), sample());
    }

    #[test]
    fn html_escapes_and_links() {
        let mut opps = sample();
        opps[1].title = "<b>Baker</b>".to_string();
        let html = render_html(&opps);
        assert!(html.contains("href=\"https://example.ca/welder\""));
        assert!(html.contains("&lt;b&gt;Baker&lt;/b&gt;"));
        assert_eq!(html.matches("class=\"card\"").count(), 2);
    }

    #[test]
    fn plain_text_keeps_line_breaks() {
        assert_eq!(text_to_html("a\nb & c"), "<div>a<br />b &amp; c</div>");
    }
}
