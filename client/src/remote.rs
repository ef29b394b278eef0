//! Remote collaborator abstraction.

use crate::error::RemoteResult;
use async_trait::async_trait;

/// The remote system of record for a collection of entities.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process, mock for testing, etc.). Every failure is
/// reported as a [`RemoteError`](crate::RemoteError); the coordinator does not
/// distinguish network, validation and not-found failures.
#[async_trait]
pub trait RemoteCollection<E: Send + Sync>: Send + Sync {
    /// Fetch every entity.
    async fn list(&self) -> RemoteResult<Vec<E>>;

    /// Fetch one entity by id.
    async fn get(&self, id: &str) -> RemoteResult<E>;

    /// Create an entity. The id is chosen by the caller.
    async fn create(&self, entity: &E) -> RemoteResult<()>;

    /// Replace an entity.
    async fn update(&self, entity: &E) -> RemoteResult<()>;

    /// Delete an entity by id.
    async fn delete(&self, id: &str) -> RemoteResult<()>;
}

#[async_trait]
impl<E, R> RemoteCollection<E> for std::sync::Arc<R>
where
    E: Send + Sync,
    R: RemoteCollection<E> + ?Sized,
{
    async fn list(&self) -> RemoteResult<Vec<E>> {
        (**self).list().await
    }

    async fn get(&self, id: &str) -> RemoteResult<E> {
        (**self).get(id).await
    }

    async fn create(&self, entity: &E) -> RemoteResult<()> {
        (**self).create(entity).await
    }

    async fn update(&self, entity: &E) -> RemoteResult<()> {
        (**self).update(entity).await
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        (**self).delete(id).await
    }
}
