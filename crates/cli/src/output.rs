use anyhow::Result;
use sgsearch_client::{ResultKind, Search, SearchResult};

pub fn render_text(search: &Search, limit: Option<usize>) -> String {
    if search.is_empty() {
        return format!("No results for \"{}\"", search.query);
    }

    let shown = limit.unwrap_or(search.len()).min(search.len());
    let mut out: Vec<String> = search.results[..shown].iter().map(render_line).collect();

    let footer = if shown < search.len() {
        format!("{shown} of {} results for \"{}\"", search.len(), search.query)
    } else {
        format!("{} results for \"{}\"", search.len(), search.query)
    };
    out.push(String::new());
    out.push(footer);
    out.join("\n")
}

fn render_line(result: &SearchResult) -> String {
    match result.kind {
        ResultKind::Repository => result.repo.clone(),
        ResultKind::File => {
            let path = result
                .path
                .as_deref()
                .or(result.file.as_deref())
                .unwrap_or("");
            // The service numbers lines from zero.
            let line = result.line_number.map(|n| n.saturating_add(1)).unwrap_or(0);
            let preview = result.preview.as_deref().unwrap_or("").trim_end();
            format!("{}:{path}:{line}: {preview}", result.repo)
        }
    }
}

pub fn render_json(search: &Search, limit: Option<usize>) -> Result<String> {
    match limit {
        Some(n) if n < search.len() => {
            let truncated = Search {
                query: search.query.clone(),
                results: search.results[..n].to_vec(),
            };
            Ok(serde_json::to_string_pretty(&truncated)?)
        }
        _ => Ok(serde_json::to_string_pretty(search)?),
    }
}
