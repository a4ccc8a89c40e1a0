//! Test doubles for the platform seam.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::discovery::{DomainDescription, PlatformMetadata};
use crate::error::PlatformError;

/// Build an environment map from pairs.
pub(crate) fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// Call counters snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub list_domains: usize,
    pub describe_domain: usize,
    pub user_profile_tags: usize,
    pub caller_account_id: usize,
    pub session_region: usize,
}

/// In-memory [`PlatformMetadata`] that counts every call.
#[derive(Debug)]
pub(crate) struct FakePlatform {
    first_domain: Option<String>,
    domains: HashMap<String, DomainDescription>,
    profile_tags: Option<HashMap<String, String>>,
    account_id: String,
    region: Option<String>,
    fail_discovery: bool,
    fail_identity: bool,
    delay: Option<Duration>,
    list_domains: AtomicUsize,
    describe_domain: AtomicUsize,
    user_profile_tags: AtomicUsize,
    caller_account_id: AtomicUsize,
    session_region: AtomicUsize,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            first_domain: None,
            domains: HashMap::new(),
            profile_tags: None,
            account_id: "123456789012".to_owned(),
            region: None,
            fail_discovery: false,
            fail_identity: false,
            delay: None,
            list_domains: AtomicUsize::new(0),
            describe_domain: AtomicUsize::new(0),
            user_profile_tags: AtomicUsize::new(0),
            caller_account_id: AtomicUsize::new(0),
            session_region: AtomicUsize::new(0),
        }
    }
}

impl FakePlatform {
    pub(crate) fn domain(vpc_id: &str) -> DomainDescription {
        DomainDescription {
            vpc_id: vpc_id.to_owned(),
            subnet_ids: vec!["subnet-d1".to_owned(), "subnet-d2".to_owned()],
            security_group_ids: vec!["sg-d".to_owned()],
        }
    }

    pub(crate) fn with_first_domain(mut self, id: &str) -> Self {
        self.first_domain = Some(id.to_owned());
        self
    }

    pub(crate) fn with_domain(mut self, id: &str, domain: DomainDescription) -> Self {
        self.domains.insert(id.to_owned(), domain);
        self
    }

    pub(crate) fn with_profile_tags(mut self, tags: &[(&str, &str)]) -> Self {
        self.profile_tags = Some(env_of(tags));
        self
    }

    pub(crate) fn with_account(mut self, account_id: &str) -> Self {
        self.account_id = account_id.to_owned();
        self
    }

    pub(crate) fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_owned());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    pub(crate) fn failing_identity(mut self) -> Self {
        self.fail_identity = true;
        self
    }

    pub(crate) fn counts(&self) -> CallCounts {
        CallCounts {
            list_domains: self.list_domains.load(Ordering::SeqCst),
            describe_domain: self.describe_domain.load(Ordering::SeqCst),
            user_profile_tags: self.user_profile_tags.load(Ordering::SeqCst),
            caller_account_id: self.caller_account_id.load(Ordering::SeqCst),
            session_region: self.session_region.load(Ordering::SeqCst),
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PlatformMetadata for FakePlatform {
    async fn first_domain_id(&self) -> Result<Option<String>, PlatformError> {
        self.list_domains.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_discovery {
            return Err(PlatformError::message("ListDomains", "access denied"));
        }
        Ok(self.first_domain.clone())
    }

    async fn describe_domain(&self, domain_id: &str) -> Result<DomainDescription, PlatformError> {
        self.describe_domain.fetch_add(1, Ordering::SeqCst);
        if self.fail_discovery {
            return Err(PlatformError::message("DescribeDomain", "access denied"));
        }
        self.domains.get(domain_id).cloned().ok_or_else(|| {
            PlatformError::message("DescribeDomain", format!("Could not find domain {domain_id}"))
        })
    }

    async fn user_profile_tags(
        &self,
        _domain_id: &str,
        user_profile_name: &str,
    ) -> Result<HashMap<String, String>, PlatformError> {
        self.user_profile_tags.fetch_add(1, Ordering::SeqCst);
        if self.fail_discovery {
            return Err(PlatformError::message("ListTags", "access denied"));
        }
        self.profile_tags.clone().ok_or_else(|| {
            PlatformError::message(
                "DescribeUserProfile",
                format!("Could not find user profile {user_profile_name}"),
            )
        })
    }

    async fn caller_account_id(&self) -> Result<String, PlatformError> {
        self.caller_account_id.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_identity {
            return Err(PlatformError::message(
                "GetCallerIdentity",
                "The security token included in the request is expired",
            ));
        }
        Ok(self.account_id.clone())
    }

    fn session_region(&self) -> Option<String> {
        self.session_region.fetch_add(1, Ordering::SeqCst);
        self.region.clone()
    }
}
