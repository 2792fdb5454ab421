use log::warn;

const REVIEWER_MARKER: &str = "reviewer";

/// Collect reviewers named in a pull request description.
///
/// Any line containing `reviewer` is a marker line and its second
/// whitespace-separated token is the reviewer, e.g. `reviewer @alice`.
/// Duplicates are kept. Marker lines with no second token are skipped.
pub fn extract_reviewers(body: &str) -> Vec<String> {
    body.lines()
        .filter(|line| line.contains(REVIEWER_MARKER))
        .filter_map(|line| match line.split_whitespace().nth(1) {
            Some(reviewer) => Some(reviewer.to_string()),
            None => {
                warn!("Skipping reviewer line without a name: {:?}", line);
                None
            }
        })
        .collect()
}
