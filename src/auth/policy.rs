//! Email-domain policy for admin accounts

/// Which email domains may register and log in. Unrestricted unless configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailPolicy {
    domain: Option<String>,
}

impl EmailPolicy {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Only addresses at `domain` (leading `@` optional) are accepted
    pub fn restricted_to(domain: &str) -> Self {
        let domain = domain.trim().trim_start_matches('@').to_lowercase();
        if domain.is_empty() {
            return Self::unrestricted();
        }
        Self {
            domain: Some(domain),
        }
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn allows(&self, email: &str) -> bool {
        match &self.domain {
            None => true,
            Some(required) => email
                .rsplit_once('@')
                .map(|(_, domain)| domain.eq_ignore_ascii_case(required))
                .unwrap_or(false),
        }
    }

    pub fn rejection_message(&self) -> String {
        match &self.domain {
            Some(domain) => format!("Email must be a @{domain} address"),
            None => "Email is not allowed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_allows_any_domain() {
        let policy = EmailPolicy::unrestricted();
        assert!(policy.allows("a@court.com"));
        assert!(policy.allows("b@gmail.com"));
    }

    #[test]
    fn test_restricted_domain() {
        let policy = EmailPolicy::restricted_to("@Gmail.com");
        assert_eq!(policy.domain(), Some("gmail.com"));
        assert!(policy.allows("a@GMAIL.com"));
        assert!(!policy.allows("a@gmail.com.evil.org"));
        assert!(!policy.allows("a@court.com"));
        assert!(!policy.allows("not-an-email"));
    }

    #[test]
    fn test_blank_domain_means_unrestricted() {
        assert_eq!(EmailPolicy::restricted_to("  "), EmailPolicy::unrestricted());
    }
}
