use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::models::PullRequest;

/// Pull requests grouped by candidate reviewer, plus those short of reviewers.
#[derive(Debug)]
pub struct ReviewerReport<'a> {
    pub total: usize,
    /// Every candidate reviewer has an entry, even with nothing assigned.
    pub by_reviewer: BTreeMap<String, Vec<&'a PullRequest>>,
    /// Pull requests with fewer reviewers than required, in fetch order.
    pub requiring_reviewers: Vec<&'a PullRequest>,
}

impl<'a> ReviewerReport<'a> {
    pub fn build(
        prs: &'a [PullRequest],
        candidates: &[String],
        required_reviewers: usize,
    ) -> Self {
        let mut by_reviewer: BTreeMap<String, Vec<&'a PullRequest>> = candidates
            .iter()
            .map(|reviewer| (reviewer.clone(), Vec::new()))
            .collect();

        for pr in prs {
            for reviewer in &pr.reviewers {
                // Reviewers outside the team are not tracked
                if let Some(assigned) = by_reviewer.get_mut(reviewer) {
                    assigned.push(pr);
                }
            }
        }

        let requiring_reviewers = prs
            .iter()
            .filter(|pr| pr.reviewers.len() < required_reviewers)
            .collect();

        Self {
            total: prs.len(),
            by_reviewer,
            requiring_reviewers,
        }
    }

    pub fn no_pending_reviews(&self) -> Vec<&str> {
        self.by_reviewer
            .iter()
            .filter(|(_, assigned)| assigned.is_empty())
            .map(|(reviewer, _)| reviewer.as_str())
            .collect()
    }

    /// Render the plain-text report. Reviewers with nothing assigned get a
    /// suggestion drawn from `rng` out of the pull requests short of reviewers.
    pub fn render<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> String {
        let idle = self.no_pending_reviews();
        let idle = if idle.is_empty() {
            "-".to_string()
        } else {
            idle.join(", ")
        };

        let mut msg = format!("Open pull requests:      {}", self.total);
        msg += &format!(
            "\nRequiring reviewers:     {}",
            self.requiring_reviewers.len()
        );
        msg += &format!("\nPeople with no reviews:  {}", idle);

        if !self.requiring_reviewers.is_empty() {
            msg += "\n\n# PRs requiring more reviewers\n";
            for pr in &self.requiring_reviewers {
                msg += &format!("\n  - [{}] {}\n      {}", pr.repository, pr.title, pr.url);
            }
        }

        msg += "\n\n# Pull requests by assigned reviewer";
        for (reviewer, assigned) in &self.by_reviewer {
            let mut prs = assigned.clone();
            prs.sort_by_key(|pr| Reverse(pr.age_days(now)));

            msg += &format!(
                "\n\n  {} ({} pending review{}):",
                reviewer,
                prs.len(),
                if prs.len() == 1 { "" } else { "s" }
            );

            for pr in &prs {
                msg += &format!("\n    - [{}] {}", pr.repository, pr.title);
                msg += &format!("\n        ({} days) {}", pr.age_days(now), pr.url);
            }

            if prs.is_empty() {
                if let Some(pr) = self.requiring_reviewers.choose(rng) {
                    msg += "\n    WHY NOT REVIEW THIS ONE?";
                    msg += &format!(
                        "\n    [{}] ({} days) {}\n    {}",
                        pr.repository,
                        pr.age_days(now),
                        pr.title,
                        pr.url
                    );
                }
            }
        }

        msg
    }
}
