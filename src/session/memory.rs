use crate::error::TxirimiriError;
use crate::session::SessionId;

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::collections::HashMap;
use tracing::debug;

/// Messages handled by the in-memory session actor.
#[derive(Debug)]
pub enum SessionActorMessage {
    /// Read a live payload; an expired one is dropped and reported as absent.
    Load(SessionId, String, i64, RpcReplyPort<Option<String>>),
    Store {
        id: SessionId,
        key: String,
        payload: String,
        expires_at: i64,
    },
    Remove { id: SessionId, key: String },
    /// Drop entries expired at the given instant, replying with the count.
    Purge(i64, RpcReplyPort<u64>),
}

#[derive(Debug)]
struct Entry {
    payload: String,
    expires_at: i64,
}

type SessionMap = HashMap<(SessionId, String), Entry>;

/// Handle for interacting with the session actor.
#[derive(Clone)]
pub struct MemorySessionHandle {
    actor: ActorRef<SessionActorMessage>,
}

impl MemorySessionHandle {
    pub async fn load(
        &self,
        id: &SessionId,
        key: &str,
        now: i64,
    ) -> Result<Option<String>, TxirimiriError> {
        ractor::call!(
            self.actor,
            SessionActorMessage::Load,
            id.clone(),
            key.to_string(),
            now
        )
        .map_err(|e| TxirimiriError::SessionError(format!("Load RPC failed: {e}")))
    }

    pub fn store(
        &self,
        id: &SessionId,
        key: &str,
        payload: String,
        expires_at: i64,
    ) -> Result<(), TxirimiriError> {
        ractor::cast!(
            self.actor,
            SessionActorMessage::Store {
                id: id.clone(),
                key: key.to_string(),
                payload,
                expires_at,
            }
        )
        .map_err(|e| TxirimiriError::SessionError(format!("Store cast failed: {e}")))
    }

    pub fn remove(&self, id: &SessionId, key: &str) -> Result<(), TxirimiriError> {
        ractor::cast!(
            self.actor,
            SessionActorMessage::Remove {
                id: id.clone(),
                key: key.to_string(),
            }
        )
        .map_err(|e| TxirimiriError::SessionError(format!("Remove cast failed: {e}")))
    }

    pub async fn purge(&self, now: i64) -> Result<u64, TxirimiriError> {
        ractor::call!(self.actor, SessionActorMessage::Purge, now)
            .map_err(|e| TxirimiriError::SessionError(format!("Purge RPC failed: {e}")))
    }
}

struct SessionActor;

#[ractor::async_trait]
impl Actor for SessionActor {
    type Msg = SessionActorMessage;
    type State = SessionMap;
    type Arguments = ();

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        _arguments: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(HashMap::new())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SessionActorMessage::Load(id, key, now, rp) => {
                let slot = (id, key);
                if state.get(&slot).is_some_and(|e| e.expires_at <= now) {
                    state.remove(&slot);
                }
                let _ = rp.send(state.get(&slot).map(|e| e.payload.clone()));
            }
            SessionActorMessage::Store {
                id,
                key,
                payload,
                expires_at,
            } => {
                state.insert(
                    (id, key),
                    Entry {
                        payload,
                        expires_at,
                    },
                );
            }
            SessionActorMessage::Remove { id, key } => {
                state.remove(&(id, key));
            }
            SessionActorMessage::Purge(now, rp) => {
                let before = state.len();
                state.retain(|_, entry| entry.expires_at > now);
                let removed = (before - state.len()) as u64;
                debug!(removed, remaining = state.len(), "memory session purge");
                let _ = rp.send(removed);
            }
        }
        Ok(())
    }
}

/// Spawn an unnamed session actor and return a handle.
pub async fn spawn() -> Result<MemorySessionHandle, TxirimiriError> {
    let (actor, _jh) = Actor::spawn(None, SessionActor, ())
        .await
        .map_err(|e| TxirimiriError::SessionError(format!("spawn session actor failed: {e}")))?;
    Ok(MemorySessionHandle { actor })
}
