use crate::domain::error::ProfileError;
use async_trait::async_trait;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use tokio::sync::RwLock;

type AnyValue = Box<dyn Any + Send + Sync>;

/// Query handler trait
#[async_trait]
pub trait QueryHandler<Q>: Send + Sync {
    type Result: Send + Sync;

    async fn handle(&self, query: Q) -> Result<Self::Result, ProfileError>;
}

/// Query bus for handling queries
pub struct QueryBus {
    handlers: RwLock<HashMap<TypeId, Box<dyn QueryHandlerBox>>>,
}

/// Boxed query handler for type erasure
#[async_trait]
trait QueryHandlerBox: Send + Sync {
    async fn handle(&self, query: AnyValue) -> Result<AnyValue, ProfileError>;
}

impl Default for QueryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a query handler
    pub async fn register_handler<Q, H>(&self, handler: H)
    where
        Q: 'static + Send + Sync,
        H: QueryHandler<Q> + 'static,
        H::Result: 'static,
    {
        let boxed_handler: Box<dyn QueryHandlerBox> = Box::new(QueryHandlerWrapper::new(handler));
        let mut handlers = self.handlers.write().await;
        handlers.insert(TypeId::of::<Q>(), boxed_handler);
    }

    /// Execute a query and return the handler's result as `R`
    pub async fn execute<Q, R>(&self, query: Q) -> Result<R, ProfileError>
    where
        Q: 'static + Send + Sync,
        R: 'static,
    {
        let handlers = self.handlers.read().await;
        let handler = handlers.get(&TypeId::of::<Q>()).ok_or_else(|| {
            ProfileError::Dispatch(format!(
                "No handler registered for query type: {}",
                type_name::<Q>()
            ))
        })?;

        let result = handler.handle(Box::new(query)).await?;
        result
            .downcast::<R>()
            .map(|r| *r)
            .map_err(|_| ProfileError::Dispatch(format!("Unexpected result for {}", type_name::<Q>())))
    }
}

/// Wrapper for query handlers to enable type erasure
struct QueryHandlerWrapper<Q, H> {
    handler: H,
    _phantom: std::marker::PhantomData<fn(Q)>,
}

impl<Q, H> QueryHandlerWrapper<Q, H> {
    fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<Q, H> QueryHandlerBox for QueryHandlerWrapper<Q, H>
where
    Q: 'static + Send + Sync,
    H: QueryHandler<Q>,
    H::Result: 'static,
{
    async fn handle(&self, query: AnyValue) -> Result<AnyValue, ProfileError> {
        let query = query
            .downcast::<Q>()
            .map_err(|_| ProfileError::Dispatch(format!("Failed to downcast query {}", type_name::<Q>())))?;
        let result = self.handler.handle(*query).await?;
        Ok(Box::new(result))
    }
}
