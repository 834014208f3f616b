//! In-memory implementations of the store ports.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, DomainError, PurchaseId, UserId};
use crate::domain::purchase::{Purchase, PurchaseStatus};
use crate::domain::user::UserProfile;
use crate::ports::{
    Authorizer, Capability, CourseRepository, EnrollmentOutcome, EnrollmentStore,
    ProcessedWebhookStore, PurchaseRepository, ReceiptInsert, TransitionOutcome, UserRepository,
    WebhookReceipt,
};

/// In-memory purchase ledger.
///
/// The conditional transition runs inside one write-lock critical section,
/// which makes it atomic with respect to concurrent invocations.
#[derive(Default)]
pub struct InMemoryPurchaseStore {
    records: RwLock<HashMap<PurchaseId, Purchase>>,
}

impl InMemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ledger records (for test assertions).
    pub fn len(&self) -> usize {
        self.records.read().expect("purchase lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchaseStore {
    async fn create(&self, purchase: &Purchase) -> Result<(), DomainError> {
        let mut records = self.records.write().expect("purchase lock poisoned");
        records.insert(purchase.id, purchase.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>, DomainError> {
        let records = self.records.read().expect("purchase lock poisoned");
        Ok(records.get(id).cloned())
    }

    async fn find_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Purchase>, DomainError> {
        let records = self.records.read().expect("purchase lock poisoned");
        Ok(records
            .values()
            .find(|p| &p.user_id == user_id && &p.course_id == course_id)
            .cloned())
    }

    async fn transition(
        &self,
        id: &PurchaseId,
        to: PurchaseStatus,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut records = self.records.write().expect("purchase lock poisoned");
        let Some(record) = records.get_mut(id) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if record.is_terminal() {
            return Ok(TransitionOutcome::AlreadyTerminal(record.status));
        }
        record
            .settle(to)
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(TransitionOutcome::Applied(record.clone()))
    }
}

/// In-memory enrollment relation.
///
/// One mutex guards the whole set, so the check-and-insert in
/// `add_if_absent` is atomic regardless of how callers race.
#[derive(Default)]
pub struct InMemoryEnrollmentStore {
    pairs: Mutex<HashSet<(UserId, CourseId)>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of enrolled pairs (for test assertions).
    pub fn pair_count(&self) -> usize {
        self.pairs.lock().expect("enrollment lock poisoned").len()
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn add_if_absent(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<EnrollmentOutcome, DomainError> {
        let mut pairs = self.pairs.lock().expect("enrollment lock poisoned");
        if pairs.insert((user_id.clone(), *course_id)) {
            Ok(EnrollmentOutcome::Inserted)
        } else {
            Ok(EnrollmentOutcome::AlreadyEnrolled)
        }
    }

    async fn is_enrolled(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        let pairs = self.pairs.lock().expect("enrollment lock poisoned");
        Ok(pairs.contains(&(user_id.clone(), *course_id)))
    }

    async fn courses_of(&self, user_id: &UserId) -> Result<Vec<CourseId>, DomainError> {
        let pairs = self.pairs.lock().expect("enrollment lock poisoned");
        Ok(pairs
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, c)| *c)
            .collect())
    }

    async fn students_of(&self, course_id: &CourseId) -> Result<Vec<UserId>, DomainError> {
        let pairs = self.pairs.lock().expect("enrollment lock poisoned");
        Ok(pairs
            .iter()
            .filter(|(_, c)| c == course_id)
            .map(|(u, _)| u.clone())
            .collect())
    }
}

/// In-memory course catalog.
#[derive(Default)]
pub struct InMemoryCourseStore {
    courses: RwLock<HashMap<CourseId, Course>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a course directly (for test setup).
    pub fn seed(&self, course: Course) {
        self.courses
            .write()
            .expect("course lock poisoned")
            .insert(course.id, course);
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseStore {
    async fn create(&self, course: &Course) -> Result<(), DomainError> {
        let mut courses = self.courses.write().expect("course lock poisoned");
        courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), DomainError> {
        let mut courses = self.courses.write().expect("course lock poisoned");
        courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let courses = self.courses.read().expect("course lock poisoned");
        Ok(courses.get(id).cloned())
    }

    async fn list_published(&self) -> Result<Vec<Course>, DomainError> {
        let courses = self.courses.read().expect("course lock poisoned");
        Ok(courses.values().filter(|c| c.is_published).cloned().collect())
    }
}

/// In-memory user profiles.
#[derive(Default)]
pub struct InMemoryUserStore {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles (for test assertions).
    pub fn len(&self) -> usize {
        self.profiles.read().expect("user lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn upsert(&self, profile: &UserProfile) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().expect("user lock poisoned");
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let profiles = self.profiles.read().expect("user lock poisoned");
        Ok(profiles.get(id).cloned())
    }

    async fn upsert_default(&self, id: &UserId) -> Result<UserProfile, DomainError> {
        let mut profiles = self.profiles.write().expect("user lock poisoned");
        Ok(profiles
            .entry(id.clone())
            .or_insert_with(|| UserProfile::placeholder(id.clone()))
            .clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().expect("user lock poisoned");
        profiles.remove(id);
        Ok(())
    }
}

/// In-memory receipt trail.
#[derive(Default)]
pub struct InMemoryWebhookReceipts {
    receipts: Mutex<HashMap<String, WebhookReceipt>>,
}

impl InMemoryWebhookReceipts {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded receipts (for test assertions).
    pub fn all(&self) -> Vec<WebhookReceipt> {
        self.receipts
            .lock()
            .expect("receipt lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Number of recorded receipts.
    pub fn len(&self) -> usize {
        self.receipts.lock().expect("receipt lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProcessedWebhookStore for InMemoryWebhookReceipts {
    async fn find(&self, event_id: &str) -> Result<Option<WebhookReceipt>, DomainError> {
        let receipts = self.receipts.lock().expect("receipt lock poisoned");
        Ok(receipts.get(event_id).cloned())
    }

    async fn record(&self, receipt: WebhookReceipt) -> Result<ReceiptInsert, DomainError> {
        let mut receipts = self.receipts.lock().expect("receipt lock poisoned");
        if receipts.contains_key(&receipt.event_id) {
            Ok(ReceiptInsert::Duplicate)
        } else {
            receipts.insert(receipt.event_id.clone(), receipt);
            Ok(ReceiptInsert::Recorded)
        }
    }
}

/// In-memory authorizer with an explicit grant list.
#[derive(Default)]
pub struct InMemoryAuthorizer {
    educators: RwLock<HashSet<UserId>>,
}

impl InMemoryAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants the educator capability to a user.
    pub fn grant_educator(&self, user_id: UserId) {
        self.educators
            .write()
            .expect("authorizer lock poisoned")
            .insert(user_id);
    }
}

#[async_trait]
impl Authorizer for InMemoryAuthorizer {
    async fn allows(&self, user_id: &UserId, capability: Capability) -> Result<bool, DomainError> {
        match capability {
            Capability::PublishCourses => Ok(self
                .educators
                .read()
                .expect("authorizer lock poisoned")
                .contains(user_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn purchase_transition_applies_once() {
        let store = InMemoryPurchaseStore::new();
        let purchase = Purchase::pending(
            PurchaseId::new(),
            user("u1"),
            CourseId::new(),
            Money::from_major(10),
        );
        store.create(&purchase).await.unwrap();

        let first = store
            .transition(&purchase.id, PurchaseStatus::Success)
            .await
            .unwrap();
        assert!(matches!(first, TransitionOutcome::Applied(_)));

        let second = store
            .transition(&purchase.id, PurchaseStatus::Expired)
            .await
            .unwrap();
        assert_eq!(
            second,
            TransitionOutcome::AlreadyTerminal(PurchaseStatus::Success)
        );
    }

    #[tokio::test]
    async fn purchase_transition_reports_missing_record() {
        let store = InMemoryPurchaseStore::new();
        let outcome = store
            .transition(&PurchaseId::new(), PurchaseStatus::Success)
            .await
            .unwrap();
        assert_eq!(outcome, TransitionOutcome::NotFound);
    }

    #[tokio::test]
    async fn enrollment_add_if_absent_is_idempotent() {
        let store = InMemoryEnrollmentStore::new();
        let (u, c) = (user("u1"), CourseId::new());

        assert_eq!(
            store.add_if_absent(&u, &c).await.unwrap(),
            EnrollmentOutcome::Inserted
        );
        assert_eq!(
            store.add_if_absent(&u, &c).await.unwrap(),
            EnrollmentOutcome::AlreadyEnrolled
        );
        assert_eq!(store.pair_count(), 1);
        assert!(store.is_enrolled(&u, &c).await.unwrap());
    }

    #[tokio::test]
    async fn enrollment_projections_mirror_each_other() {
        let store = InMemoryEnrollmentStore::new();
        let (u, c) = (user("u1"), CourseId::new());
        store.add_if_absent(&u, &c).await.unwrap();

        assert_eq!(store.courses_of(&u).await.unwrap(), vec![c]);
        assert_eq!(store.students_of(&c).await.unwrap(), vec![u]);
    }

    #[tokio::test]
    async fn upsert_default_returns_existing_profile() {
        let store = InMemoryUserStore::new();
        let id = user("u1");

        let mut profile = UserProfile::placeholder(id.clone());
        profile.name = Some("Ada".to_string());
        store.upsert(&profile).await.unwrap();

        let found = store.upsert_default(&id).await.unwrap();
        assert_eq!(found.name.as_deref(), Some("Ada"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn receipts_deduplicate_by_event_id() {
        let store = InMemoryWebhookReceipts::new();
        let receipt =
            WebhookReceipt::processed("evt_1", "checkout.session.completed", serde_json::json!({}));

        assert_eq!(
            store.record(receipt.clone()).await.unwrap(),
            ReceiptInsert::Recorded
        );
        assert_eq!(
            store.record(receipt).await.unwrap(),
            ReceiptInsert::Duplicate
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn authorizer_only_allows_granted_users() {
        let auth = InMemoryAuthorizer::new();
        auth.grant_educator(user("edu"));

        assert!(auth
            .allows(&user("edu"), Capability::PublishCourses)
            .await
            .unwrap());
        assert!(!auth
            .allows(&user("student"), Capability::PublishCourses)
            .await
            .unwrap());
    }
}
