use crate::types::*;

/// Flattens raw service results into one record per matching line (file matches)
/// or per repository, preserving input order.
pub fn normalize(raw: &[RawResult]) -> Vec<SearchResult> {
    raw.iter().flat_map(expand).collect()
}

fn expand(result: &RawResult) -> Vec<SearchResult> {
    match result {
        RawResult::FileMatch(file_match) => expand_file_match(file_match),
        RawResult::RepositoryMatch(repo) => vec![SearchResult::repository(&repo.name)],
    }
}

fn expand_file_match(file_match: &FileMatch) -> Vec<SearchResult> {
    file_match
        .line_matches
        .iter()
        .map(|line| SearchResult {
            kind: ResultKind::File,
            repo: file_match.repository.clone(),
            file: Some(file_match.file_name.clone()),
            path: Some(file_match.path.clone()),
            content: Some(file_match.content.clone()),
            preview: Some(line.preview.clone()),
            line_number: Some(line.line_number),
            offset_and_length: Some(first_span(line)),
        })
        .collect()
}

// Only the first span of a line survives; (0, 0) when the line has none.
fn first_span(line: &LineMatch) -> OffsetAndLength {
    line.offset_and_lengths.first().copied().unwrap_or_default()
}
