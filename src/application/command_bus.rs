use crate::domain::error::ProfileError;
use async_trait::async_trait;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use tokio::sync::RwLock;

type AnyValue = Box<dyn Any + Send + Sync>;

/// Command handler trait
#[async_trait]
pub trait CommandHandler<C>: Send + Sync {
    type Result: Send + Sync;

    async fn handle(&self, command: C) -> Result<Self::Result, ProfileError>;
}

/// Command bus routing each command type to its registered handler
pub struct CommandBus {
    handlers: RwLock<HashMap<TypeId, Box<dyn CommandHandlerBox>>>,
}

/// Boxed command handler for type erasure
#[async_trait]
trait CommandHandlerBox: Send + Sync {
    async fn handle(&self, command: AnyValue) -> Result<AnyValue, ProfileError>;
}

impl CommandBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a command handler, replacing any previous one for `C`
    pub async fn register_handler<C, H>(&self, handler: H)
    where
        C: 'static + Send + Sync,
        H: CommandHandler<C> + 'static,
        H::Result: 'static,
    {
        let boxed_handler: Box<dyn CommandHandlerBox> = Box::new(HandlerWrapper::new(handler));
        let mut handlers = self.handlers.write().await;
        handlers.insert(TypeId::of::<C>(), boxed_handler);
    }

    pub async fn has_handler<C: 'static>(&self) -> bool {
        self.handlers.read().await.contains_key(&TypeId::of::<C>())
    }

    /// Execute a command and return the handler's result as `R`
    pub async fn execute<C, R>(&self, command: C) -> Result<R, ProfileError>
    where
        C: 'static + Send + Sync,
        R: 'static,
    {
        let handlers = self.handlers.read().await;
        let handler = handlers.get(&TypeId::of::<C>()).ok_or_else(|| {
            ProfileError::Dispatch(format!(
                "No handler registered for command type: {}",
                type_name::<C>()
            ))
        })?;

        let result = handler.handle(Box::new(command)).await?;
        result.downcast::<R>().map(|r| *r).map_err(|_| {
            ProfileError::Dispatch(format!(
                "Handler for {} did not return {}",
                type_name::<C>(),
                type_name::<R>()
            ))
        })
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapper for command handlers to enable type erasure
struct HandlerWrapper<C, H> {
    handler: H,
    _phantom: std::marker::PhantomData<fn(C)>,
}

impl<C, H> HandlerWrapper<C, H> {
    fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<C, H> CommandHandlerBox for HandlerWrapper<C, H>
where
    C: 'static + Send + Sync,
    H: CommandHandler<C>,
    H::Result: 'static,
{
    async fn handle(&self, command: AnyValue) -> Result<AnyValue, ProfileError> {
        let command = command.downcast::<C>().map_err(|_| {
            ProfileError::Dispatch(format!("Failed to downcast command {}", type_name::<C>()))
        })?;
        let result = self.handler.handle(*command).await?;
        Ok(Box::new(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping(u32);

    struct PingHandler;

    #[async_trait]
    impl CommandHandler<Ping> for PingHandler {
        type Result = u32;

        async fn handle(&self, command: Ping) -> Result<Self::Result, ProfileError> {
            if command.0 == 0 {
                return Err(ProfileError::EmptyName);
            }
            Ok(command.0 + 1)
        }
    }

    #[tokio::test]
    async fn test_command_bus_registration_and_execution() {
        let bus = CommandBus::new();
        bus.register_handler::<Ping, _>(PingHandler).await;

        assert!(bus.has_handler::<Ping>().await);
        assert_eq!(bus.execute::<_, u32>(Ping(41)).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_command_bus_propagates_handler_errors() {
        let bus = CommandBus::new();
        bus.register_handler::<Ping, _>(PingHandler).await;

        let err = bus.execute::<_, u32>(Ping(0)).await.unwrap_err();
        assert_eq!(err, ProfileError::EmptyName);
    }

    #[tokio::test]
    async fn test_command_bus_no_handler() {
        let bus = CommandBus::new();
        let err = bus.execute::<_, u32>(Ping(1)).await.unwrap_err();
        assert!(matches!(err, ProfileError::Dispatch(_)));
    }

    #[tokio::test]
    async fn test_command_bus_result_type_mismatch() {
        let bus = CommandBus::new();
        bus.register_handler::<Ping, _>(PingHandler).await;
        let err = bus.execute::<_, String>(Ping(1)).await.unwrap_err();
        assert!(matches!(err, ProfileError::Dispatch(_)));
    }
}
