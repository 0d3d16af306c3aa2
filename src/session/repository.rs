use std::fmt;
use std::str::FromStr;

/// A GitHub repository identified as `owner/repo`
///
/// Parsing accepts the common spellings of a GitHub repository and reduces
/// them to the canonical `owner/repo` form, so that a confirmation minted for
/// `github:octocat/hello` also confirms `octocat/hello`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName {
    pub owner: String,
    pub repo: String,
}

impl RepositoryName {
    /// Parses a repository identifier
    ///
    /// # Supported formats
    ///
    /// - `owner/repo`
    /// - `https://github.com/owner/repo` (optionally with `.git` or a trailing slash)
    /// - `git@github.com:owner/repo.git`
    /// - `github:owner/repo`
    ///
    /// # Examples
    ///
    /// ```
    /// use gitguard_mcp::session::RepositoryName;
    ///
    /// let repo = RepositoryName::parse("https://github.com/BurntSushi/ripgrep.git").unwrap();
    /// assert_eq!(repo.to_string(), "BurntSushi/ripgrep");
    /// ```
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let owner_repo = if let Some(rest) = input
            .strip_prefix("https://github.com")
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        {
            rest.trim_start_matches('/')
                .trim_end_matches('/')
                .trim_end_matches(".git")
        } else if let Some(rest) = input.strip_prefix("git@github.com:") {
            rest.trim_end_matches('/').trim_end_matches(".git")
        } else if let Some(rest) = input.strip_prefix("github:") {
            rest.trim_start_matches('/')
                .trim_end_matches('/')
                .trim_end_matches(".git")
        } else if input.contains("://") {
            return Err(format!("'{}' is not a GitHub repository URL", input));
        } else {
            input.trim_end_matches('/')
        };

        let mut parts = owner_repo.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if is_valid_segment(owner) && is_valid_segment(repo) => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(format!(
                "'{}' is not in the format 'owner/repo'",
                input
            )),
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.chars().any(|c| c.is_whitespace() || c == ':')
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepositoryName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_github_spellings() {
        let cases = [
            "octocat/hello",
            "octocat/hello/",
            "https://github.com/octocat/hello",
            "https://github.com/octocat/hello.git",
            "https://github.com/octocat/hello/",
            "git@github.com:octocat/hello.git",
            "git@github.com:octocat/hello",
            "github:octocat/hello",
            "github:/octocat/hello",
            "  octocat/hello  ",
        ];
        for input in cases {
            let parsed = RepositoryName::parse(input).unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!(parsed.to_string(), "octocat/hello", "{input}");
        }
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for input in [
            "",
            "octocat",
            "octocat/hello/extra",
            "/hello",
            "octocat/",
            "https://gitlab.com/octocat/hello",
            "octo cat/hello",
            "../hello",
        ] {
            assert!(RepositoryName::parse(input).is_err(), "{input:?}");
        }
    }
}
