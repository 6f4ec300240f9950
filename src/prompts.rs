//! Built-in prompts and search defaults for the job-search pipeline.

/// Default web search query.
pub const SEARCH_QUERY: &str =
    "Germany Ausbildung programs Canada visa sponsorship LMIA jobs international applicants 2024 2025";

/// Default number of search results fetched per run.
pub const SEARCH_MAX_RESULTS: usize = 30;

/// Marker the agent emits when it found nothing.
pub const NO_OPPORTUNITIES: &str = "No new opportunities";

/// System prompt sent as the first message of every agent call.
///
/// Part of the cache key: changing it invalidates every cached response.
pub const SYSTEM_PROMPT: &str = r#"You are an expert international job opportunity researcher.

STRICT RULES:
- Base your answer on the search context you are given.
- Only return REAL and CURRENT opportunities
- MUST accept international applicants
- MUST include visa sponsorship, LMIA, or relocation support
- Ignore expired or unofficial sources

FOCUS:
- Germany (Ausbildung)
- Canada (Visa sponsorship / LMIA)

OUTPUT FORMAT:
Return READABLE TEXT in the format below. It is emailed as-is, so keep it clear and professional.

Job 1:
  title: [Clear, descriptive job title]
  description: [Responsibilities, requirements and key facts about the role]
  Country: [Full country name]
  City/Region: [City or region]
  Field: [Industry or field, e.g. "Healthcare"]
  Language Level: [Language requirements, e.g. "German B2 level required"]
  Visa Information: [Visa/sponsorship details, e.g. "LMIA approved position"]
  Salary: [Salary range or compensation, e.g. "€50,000 - €70,000 per year"]
  Official Link: [URL of the official job posting]

Job 2:
  ...

IMPORTANT:
- Start with "Found X new job opportunity/opportunities:" if you have results
- Number jobs as "Job 1:", "Job 2:", ...
- Always include "title:" and "description:" for each job
- Descriptions should be 2-4 sentences
- If nothing qualifies, return "No new opportunities found."
- Do NOT use JSON or bullet points
"#;

/// Task prompt sent as the user input of scheduled and manual runs.
pub const AGENT_PROMPT: &str = r#"Please analyze the search results and extract international job opportunities.

Focus on:
- Germany: Ausbildung (vocational training) programs that accept international applicants
- Canada: Jobs with visa sponsorship, LMIA (Labour Market Impact Assessment), or relocation support

For each opportunity, extract the job title, country, city or region, field, salary (if available), language requirements, visa/sponsorship details and the official link to the posting.

Make sure all information is complete and human-readable. It will be emailed to people who need clear, understandable information."#;
