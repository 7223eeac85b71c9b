//! Demo site rendering

use serde_json::json;

use crate::models::deployment::{FileSet, GeneratedFile};
use crate::models::practice::PracticeRecord;

/// Render the demo site for a practice
///
/// Pure function: the same record and agent always render the same files.
pub fn render_template(record: &PracticeRecord, agent_id: &str) -> FileSet {
    vec![
        GeneratedFile {
            path: "index.html".to_string(),
            content: render_index(record, agent_id),
        },
        GeneratedFile {
            path: "practice.json".to_string(),
            content: render_practice_json(record, agent_id),
        },
        GeneratedFile {
            path: "README.md".to_string(),
            content: format!(
                "# {}\n\nDemo site generated for {}.\n",
                record.name, record.website
            ),
        },
    ]
}

fn render_index(record: &PracticeRecord, agent_id: &str) -> String {
    let services: String = record
        .services
        .iter()
        .map(|s| format!("        <li>{}</li>\n", escape_html(s)))
        .collect();

    let contact: String = [
        record.phone.as_deref().map(|p| format!("<p>Phone: {}</p>", escape_html(p))),
        record.email.as_deref().map(|e| format!("<p>Email: {}</p>", escape_html(e))),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n      ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{name}</title>
  </head>
  <body data-agent-id="{agent}">
    <header>
      <h1>{name}</h1>
      <p>{address}</p>
    </header>
    <section>
      <h2>Services</h2>
      <ul>
{services}      </ul>
    </section>
    <footer>
      {contact}
    </footer>
  </body>
</html>
"#,
        name = escape_html(&record.name),
        agent = escape_html(agent_id),
        address = escape_html(&record.address),
        services = services,
        contact = contact,
    )
}

fn render_practice_json(record: &PracticeRecord, agent_id: &str) -> String {
    let value = json!({
        "name": record.name,
        "address": record.address,
        "services": record.services,
        "phone": record.phone,
        "email": record.email,
        "website": record.website,
        "slug": record.slug,
        "agent_id": agent_id,
    });
    // Serializing a json! value cannot fail
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
