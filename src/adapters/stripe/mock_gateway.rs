//! Mock payment gateway for tests.
//!
//! Records every session request, mints deterministic sessions, and can be
//! told to fail or to answer payment-intent lookups.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::ports::{
    CreateSessionRequest, GatewayError, GatewayErrorCode, GatewaySession, PaymentGateway,
};

/// Recording mock of the `PaymentGateway` port.
#[derive(Default)]
pub struct MockGateway {
    requests: Mutex<Vec<CreateSessionRequest>>,
    sessions_by_intent: Mutex<HashMap<String, GatewaySession>>,
    fail_with: Mutex<Option<GatewayErrorCode>>,
    counter: AtomicU32,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with the given error code.
    pub fn fail_with(&self, code: GatewayErrorCode) {
        *self.fail_with.lock().expect("mock lock poisoned") = Some(code);
    }

    /// Registers a session to be found by payment-intent lookup.
    pub fn register_intent(&self, payment_intent_id: impl Into<String>, session: GatewaySession) {
        self.sessions_by_intent
            .lock()
            .expect("mock lock poisoned")
            .insert(payment_intent_id.into(), session);
    }

    /// All session-creation requests seen so far.
    pub fn session_requests(&self) -> Vec<CreateSessionRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    /// Number of session-creation calls.
    pub fn session_call_count(&self) -> usize {
        self.requests.lock().expect("mock lock poisoned").len()
    }

    fn maybe_fail(&self) -> Result<(), GatewayError> {
        if let Some(code) = *self.fail_with.lock().expect("mock lock poisoned") {
            return Err(GatewayError::new(code, "simulated gateway failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        self.maybe_fail()?;
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let session = GatewaySession {
            id: format!("cs_mock_{}", n),
            url: format!("https://checkout.gateway.test/{}", n),
            purchase_id: Some(request.purchase_id),
        };
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);
        Ok(session)
    }

    async fn find_session_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<GatewaySession>, GatewayError> {
        self.maybe_fail()?;
        Ok(self
            .sessions_by_intent
            .lock()
            .expect("mock lock poisoned")
            .get(payment_intent_id)
            .cloned())
    }
}
