// Test doubles shared by the service and router tests.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    config::Config,
    db::memory::MemoryStore,
    service::{
        error::ServiceError,
        identity::{IdentityError, IdentityVerifier, VerifiedIdentity},
        push_provider::{PushProvider, SendOutcome, SendResponse},
    },
    AppState,
};

enum MessageIds {
    Unique,
    Fixed(String),
}

/// A push provider that answers from a script and records what it was
/// asked to send.
pub struct ScriptedPush {
    message_ids: MessageIds,
    overrides: HashMap<String, SendOutcome>,
    fail_all: bool,
    counter: AtomicUsize,
    sent: Mutex<Vec<(Vec<String>, String, String)>>,
}

impl ScriptedPush {
    fn build(message_ids: MessageIds, fail_all: bool) -> Self {
        Self {
            message_ids,
            overrides: HashMap::new(),
            fail_all,
            counter: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every token is delivered under a fresh message name.
    pub fn delivering() -> Self {
        Self::build(MessageIds::Unique, false)
    }

    /// Every delivery reports the same message name.
    pub fn with_fixed_message_id(message_id: &str) -> Self {
        Self::build(MessageIds::Fixed(message_id.to_string()), false)
    }

    /// The provider itself is unreachable.
    pub fn erroring() -> Self {
        Self::build(MessageIds::Unique, true)
    }

    pub fn with_outcome(mut self, token: &str, outcome: SendOutcome) -> Self {
        self.overrides.insert(token.to_string(), outcome);
        self
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Titles and bodies of every multicast, in call order.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, title, body)| (title.clone(), body.clone()))
            .collect()
    }

    pub fn recipients_of_call(&self, index: usize) -> Vec<String> {
        self.sent.lock().unwrap()[index].0.clone()
    }

    /// Background dispatch runs on spawned tasks; poll until it caught up.
    pub async fn wait_for_calls(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.call_count() < expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("push provider was not called in time");
    }

    fn next_message_id(&self) -> String {
        match &self.message_ids {
            MessageIds::Fixed(id) => id.clone(),
            MessageIds::Unique => format!(
                "projects/skillswap-test/messages/{}",
                self.counter.fetch_add(1, Ordering::SeqCst)
            ),
        }
    }
}

#[async_trait]
impl PushProvider for ScriptedPush {
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> Result<Vec<SendResponse>, ServiceError> {
        self.sent
            .lock()
            .unwrap()
            .push((tokens.to_vec(), title.to_string(), body.to_string()));

        if self.fail_all {
            return Err(ServiceError::Push("provider unreachable".to_string()));
        }

        Ok(tokens
            .iter()
            .map(|token| SendResponse {
                token: token.clone(),
                outcome: self
                    .overrides
                    .get(token)
                    .cloned()
                    .unwrap_or_else(|| SendOutcome::Delivered {
                        message_id: self.next_message_id(),
                    }),
            })
            .collect())
    }
}

/// Accepts `token-<uid>` and nothing else.
pub struct FakeVerifier;

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        match token.strip_prefix("token-") {
            Some(uid) if !uid.is_empty() => Ok(VerifiedIdentity {
                uid: uid.to_string(),
                email: Some(format!("{}@example.com", uid)),
            }),
            _ => Err(IdentityError::Malformed("unknown test token".to_string())),
        }
    }
}

pub fn test_state(store: Arc<MemoryStore>, push: Arc<ScriptedPush>) -> Arc<AppState> {
    Arc::new(AppState::new(
        Config::for_tests(),
        store,
        Arc::new(FakeVerifier),
        push,
    ))
}
