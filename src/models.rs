use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub struct ApiPullRequest {
    pub title: String,
    pub user: User,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub login: String,
}

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// An open pull request with the reviewers named in its description.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub repository: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub reviewers: Vec<String>,
}

impl PullRequest {
    /// Whole days elapsed since the pull request was opened, rounded down.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_seconds().div_euclid(SECONDS_PER_DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn json_parsing() {
        let json = serde_json::json!({
            "id": 733000416u64,
            "number": 18u32,
            "state": "open",
            "title": "Add staging",
            "html_url": "https://github.com/acme/api/pull/18",
            "user": {
                "login": "carol",
                "id": 123u32
            },
            "body": "Adds a staging target.\n\nreviewer @alice",
            "created_at": "2021-09-13T18:34:50Z",
            "updated_at": "2022-01-15T21:26:41Z"
        });

        let pr: ApiPullRequest = serde_json::from_value(json).unwrap();

        assert_eq!(pr.title, "Add staging");
        assert_eq!(pr.user.login, "carol");
        assert_eq!(pr.html_url, "https://github.com/acme/api/pull/18");
        assert_eq!(
            pr.created_at,
            Utc.with_ymd_and_hms(2021, 9, 13, 18, 34, 50).unwrap()
        );
        assert!(pr.body.unwrap().ends_with("reviewer @alice"));
    }

    #[test]
    fn null_body_parses() {
        let json = serde_json::json!({
            "title": "Bump deps",
            "html_url": "https://github.com/acme/api/pull/19",
            "user": { "login": "dependabot[bot]" },
            "body": null,
            "created_at": "2021-09-13T18:34:50Z"
        });

        let pr: ApiPullRequest = serde_json::from_value(json).unwrap();
        assert_eq!(pr.body, None);
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = serde_json::json!({
            "title": "No author",
            "html_url": "https://github.com/acme/api/pull/20",
            "created_at": "2021-09-13T18:34:50Z"
        });

        assert!(serde_json::from_value::<ApiPullRequest>(json).is_err());
    }

    #[test]
    fn age_in_whole_days() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let pr = PullRequest {
            repository: "api".into(),
            title: "t".into(),
            author: "carol".into(),
            url: "u".into(),
            created_at: created,
            reviewers: vec![],
        };

        assert_eq!(pr.age_days(created + Duration::hours(23)), 0);
        assert_eq!(pr.age_days(created + Duration::hours(49)), 2);

        // Clock skew can put creation slightly after now
        assert_eq!(pr.age_days(created - Duration::minutes(1)), -1);
    }
}
