use std::future::Future;

use crate::domain::FetchError;

/// One poll cycle's result.
pub type Outcome<T> = Result<T, FetchError>;

/// A zero-argument upstream read, called once per poll cycle.
///
/// Calls are sequential: a poller never has two fetches of the same
/// operation in flight.
#[async_trait::async_trait]
pub trait Fetch: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn fetch(&self) -> Outcome<Self::Output>;
}

#[async_trait::async_trait]
impl<F, Fut, T> Fetch for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn fetch(&self) -> Outcome<T> {
        (self)().await
    }
}
