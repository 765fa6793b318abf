use std::sync::Arc;

use crate::application::{PollOptions, RefreshCache};
use crate::domain::{ConfigError, FetchError, GitCommit, GitCommitService, PrecacherSettings};

/// Keeps the most recent commits of a [`GitCommitService`] cached, while
/// still being a [`GitCommitService`] itself.
///
/// Only `recent_commits` is served from the cache. Everything else goes to
/// the wrapped service untouched.
#[derive(Debug)]
pub struct CommitsPrecacher<S> {
    inner: Arc<S>,
    cache: RefreshCache<GitCommit>,
}

impl<S> CommitsPrecacher<S>
where
    S: GitCommitService + 'static,
{
    pub fn new(inner: Arc<S>, settings: &PrecacherSettings) -> Result<Self, ConfigError> {
        let limit = settings.limit;
        let service = inner.clone();
        let fetch = move || {
            let service = service.clone();
            async move { service.recent_commits(limit).await }
        };

        let options = PollOptions::new(settings.interval)
            .label("commits")
            .trace_fetches(settings.trace);
        let cache = RefreshCache::with_options(fetch, options, limit)?;

        Ok(Self { inner, cache })
    }
}

impl<S> CommitsPrecacher<S> {
    pub fn stop(&self) {
        self.cache.stop();
    }
}

#[async_trait::async_trait]
impl<S> GitCommitService for CommitsPrecacher<S>
where
    S: GitCommitService + 'static,
{
    async fn recent_commits(&self, limit: usize) -> Result<Vec<GitCommit>, FetchError> {
        self.cache.read(limit)
    }

    async fn commit(&self, sha: &str) -> Result<Option<GitCommit>, FetchError> {
        self.inner.commit(sha).await
    }
}

/// A [`GitCommitService`] that is either called directly or precached,
/// decided once at construction.
#[derive(Debug)]
pub enum CommitService<S> {
    Direct(Arc<S>),
    Cached(CommitsPrecacher<S>),
}

impl<S> CommitService<S>
where
    S: GitCommitService + 'static,
{
    pub fn new(inner: Arc<S>, settings: &PrecacherSettings) -> Result<Self, ConfigError> {
        if settings.enabled {
            CommitsPrecacher::new(inner, settings).map(CommitService::Cached)
        } else {
            Ok(CommitService::Direct(inner))
        }
    }
}

impl<S> CommitService<S> {
    pub fn stop(&self) {
        if let CommitService::Cached(precacher) = self {
            precacher.stop();
        }
    }
}

#[async_trait::async_trait]
impl<S> GitCommitService for CommitService<S>
where
    S: GitCommitService + 'static,
{
    async fn recent_commits(&self, limit: usize) -> Result<Vec<GitCommit>, FetchError> {
        match self {
            CommitService::Direct(inner) => inner.recent_commits(limit).await,
            CommitService::Cached(precacher) => precacher.recent_commits(limit).await,
        }
    }

    async fn commit(&self, sha: &str) -> Result<Option<GitCommit>, FetchError> {
        match self {
            CommitService::Direct(inner) => inner.commit(sha).await,
            CommitService::Cached(precacher) => precacher.commit(sha).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use tokio::time;

    use super::*;

    #[derive(Debug, Default)]
    struct FakeCommits {
        listed: AtomicUsize,
        looked_up: AtomicUsize,
    }

    fn commit(n: usize) -> GitCommit {
        GitCommit {
            sha: format!("{n:040x}"),
            message: format!("commit {n}"),
            author: Some("tester".to_owned()),
            url: format!("https://example.com/commit/{n}"),
            authored_at: None,
        }
    }

    #[async_trait::async_trait]
    impl GitCommitService for FakeCommits {
        async fn recent_commits(&self, limit: usize) -> Result<Vec<GitCommit>, FetchError> {
            let _ = self.listed.fetch_add(1, Ordering::SeqCst);
            Ok((0..limit).map(commit).collect())
        }

        async fn commit(&self, sha: &str) -> Result<Option<GitCommit>, FetchError> {
            let _ = self.looked_up.fetch_add(1, Ordering::SeqCst);
            Ok((0..3).map(commit).find(|x| x.sha == sha))
        }
    }

    fn settings(enabled: bool) -> PrecacherSettings {
        PrecacherSettings {
            enabled,
            interval: Duration::from_millis(10),
            limit: 5,
            trace: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cached_reads_do_not_reach_the_wrapped_service() {
        let inner = Arc::new(FakeCommits::default());
        let service = CommitService::new(inner.clone(), &settings(true)).unwrap();
        assert!(matches!(service, CommitService::Cached(_)));

        time::sleep(Duration::from_millis(15)).await;
        assert_eq!(inner.listed.load(Ordering::SeqCst), 1);

        for _ in 0..10 {
            let commits = service.recent_commits(3).await.unwrap();
            assert_eq!(commits, (0..3).map(commit).collect::<Vec<_>>());
        }
        // Clamped to the precached limit.
        assert_eq!(service.recent_commits(50).await.unwrap().len(), 5);
        assert_eq!(inner.listed.load(Ordering::SeqCst), 1);

        service.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn other_methods_are_forwarded() {
        let inner = Arc::new(FakeCommits::default());
        let service = CommitService::new(inner.clone(), &settings(true)).unwrap();

        let sha = commit(1).sha;
        assert_eq!(service.commit(&sha).await, Ok(Some(commit(1))));
        assert_eq!(service.commit("missing").await, Ok(None));
        assert_eq!(inner.looked_up.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_precacher_calls_through() {
        let inner = Arc::new(FakeCommits::default());
        let service = CommitService::new(inner.clone(), &settings(false)).unwrap();
        assert!(matches!(service, CommitService::Direct(_)));

        assert_eq!(service.recent_commits(2).await.unwrap().len(), 2);
        assert_eq!(service.recent_commits(7).await.unwrap().len(), 7);
        assert_eq!(inner.listed.load(Ordering::SeqCst), 2);

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(inner.listed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_settings_fail_construction() {
        let inner = Arc::new(FakeCommits::default());
        let zero_limit = PrecacherSettings {
            limit: 0,
            ..settings(true)
        };
        assert_eq!(
            CommitService::new(inner, &zero_limit).err(),
            Some(ConfigError::ZeroLimit)
        );
    }
}
