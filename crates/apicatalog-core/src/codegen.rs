//! Integration snippets for a catalog entry.

use crate::error::{CatalogError, Result};
use crate::format::AuthGuide;
use crate::types::{CatalogEntry, CorsStatus};
use std::fmt;
use std::str::FromStr;

const SAMPLE_PATH: &str = "/api/resource";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    Python,
    Curl,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::JavaScript, Language::Python, Language::Curl];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Curl => "curl",
        }
    }

    pub fn supported_tags() -> String {
        Self::ALL
            .iter()
            .map(|l| l.tag())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Language {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.tag() == wanted)
            .ok_or_else(|| CatalogError::UnsupportedLanguage {
                given: s.to_string(),
                supported: Self::supported_tags(),
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Full integration guide: entry summary, snippet and usage notes
pub fn integration_guide(entry: &CatalogEntry, language: Language) -> String {
    let code = match language {
        Language::JavaScript => javascript(entry),
        Language::Python => python(entry),
        Language::Curl => curl(entry),
    };

    format!(
        "# {} integration ({})\n\n\
         ## API info\n\n\
         - **Description**: {}\n\
         - **Auth**: {}\n\
         - **HTTPS**: {}\n\
         - **CORS**: {}\n\
         - **Link**: {}\n\n\
         ## Example\n\n\
         ```{}\n{}\n```\n\n\
         ## Notes\n\n{}",
        entry.name,
        language,
        entry.description,
        entry.auth,
        if entry.https { "yes" } else { "no" },
        entry.cors,
        entry.link,
        language,
        code,
        usage_notes(entry, language)
    )
}

fn base_url(entry: &CatalogEntry) -> String {
    if entry.link.contains("http") {
        entry.link.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", entry.link.trim_end_matches('/'))
    }
}

/// `(name, value)` header pairs sent with every sample request
fn headers(entry: &CatalogEntry) -> Vec<(&'static str, &'static str)> {
    let mut headers = Vec::new();
    if let Some(credential) = AuthGuide::for_kind(&entry.auth).header {
        headers.push(credential);
    }
    headers.push(("Content-Type", "application/json"));
    headers
}

fn javascript(entry: &CatalogEntry) -> String {
    let url = format!("{}{}", base_url(entry), SAMPLE_PATH);
    let header_lines = headers(entry)
        .iter()
        .map(|(k, v)| format!("      '{}': '{}'", k, v))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"// Call {name} with fetch
async function fetchData() {{
  try {{
    const response = await fetch('{url}', {{
      method: 'GET',
      headers: {{
{headers}
      }},
    }});

    if (!response.ok) {{
      throw new Error(`HTTP error! status: ${{response.status}}`);
    }}

    const data = await response.json();
    console.log('Response:', data);
    return data;
  }} catch (error) {{
    console.error('Request failed:', error);
  }}
}}

fetchData();"#,
        name = entry.name,
        url = url,
        headers = header_lines
    )
}

fn python(entry: &CatalogEntry) -> String {
    let url = format!("{}{}", base_url(entry), SAMPLE_PATH);
    let header_lines = headers(entry)
        .iter()
        .map(|(k, v)| format!("    '{}': '{}'", k, v))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"import json
import requests

url = '{url}'

headers = {{
{headers}
}}

try:
    response = requests.get(url, headers=headers, timeout=30)
    response.raise_for_status()
    data = response.json()
    print('Response:', json.dumps(data, indent=2))
except requests.exceptions.HTTPError as errh:
    print('HTTP Error:', errh)
except requests.exceptions.ConnectionError as errc:
    print('Error Connecting:', errc)
except requests.exceptions.Timeout as errt:
    print('Timeout Error:', errt)
except requests.exceptions.RequestException as err:
    print('Something went wrong:', err)"#,
        url = url,
        headers = header_lines
    )
}

fn curl(entry: &CatalogEntry) -> String {
    let url = format!("{}{}", base_url(entry), SAMPLE_PATH);
    let header_flags = headers(entry)
        .iter()
        .map(|(k, v)| format!("-H \"{}: {}\" \\", k, v))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"# Basic GET request
curl -X GET "{url}" \
{headers}
-v

# GET with query parameters
curl -X GET "{url}?param1=value1&param2=value2" \
{headers}
-v

# POST request
curl -X POST "{url}" \
{headers}
-d '{{"key1": "value1", "key2": "value2"}}' \
-v

# Save the response to a file
curl -X GET "{url}" \
{headers}
-o response.json"#,
        url = url,
        headers = header_flags
    )
}

fn usage_notes(entry: &CatalogEntry, language: Language) -> String {
    let mut notes: Vec<String> = Vec::new();

    notes.push(match language {
        Language::JavaScript => format!("This example calls {} with the browser fetch API.", entry.name),
        Language::Python => format!("This example calls {} with the requests library.", entry.name),
        Language::Curl => format!("These commands call {} with the cURL command line tool.", entry.name),
    });

    if let Some((name, placeholder)) = AuthGuide::for_kind(&entry.auth).header {
        notes.push(format!(
            "Replace '{}' in the {} header with your real credentials and keep them out of source control.",
            placeholder, name
        ));
    }

    notes.push(format!(
        "The request path {} is a placeholder; check the API documentation for real endpoints and parameters.",
        SAMPLE_PATH
    ));

    notes.push(if entry.https {
        "This API supports HTTPS; use secure connections in production.".to_string()
    } else {
        "This API does not support HTTPS; avoid sending sensitive data to it.".to_string()
    });

    if language == Language::JavaScript {
        notes.push(
            match entry.cors {
                CorsStatus::Yes => "CORS is supported, so the API can be called directly from a browser.",
                CorsStatus::No => "CORS is not supported; call the API through a backend proxy from browsers.",
                CorsStatus::Unknown => "CORS support is unknown; a backend proxy may be needed for browser calls.",
            }
            .to_string(),
        );
    }

    notes
        .iter()
        .enumerate()
        .map(|(i, note)| format!("{}. {}", i + 1, note))
        .collect::<Vec<_>>()
        .join("\n")
}
