//! Who is using the editor, and how much of their allowance is left.
//!
//! The session is an explicit value handed to the editor rather than
//! ambient global state. It only informs the client-side quota pre-check;
//! the store makes the binding decision.

use hotspot_core::error::CoreError;
use hotspot_core::quota::{usage_or_zero, ActorClass, PlanType, QuotaPolicy};
use hotspot_core::types::DbId;

use crate::model::UsageSummary;

/// The signed-in user as the editor needs to know them.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user_id: DbId,
    pub email: String,
    pub plan: PlanType,
}

#[derive(Debug, Clone)]
struct SignedIn {
    user: SessionUser,
    /// Last usage the store reported; `None` until the first refresh.
    usage: Option<UsageSummary>,
}

#[derive(Debug, Clone)]
pub struct Session {
    signed_in: Option<SignedIn>,
    policy: QuotaPolicy,
}

impl Session {
    pub fn anonymous(policy: QuotaPolicy) -> Self {
        Self {
            signed_in: None,
            policy,
        }
    }

    pub fn signed_in(user: SessionUser, usage: Option<UsageSummary>, policy: QuotaPolicy) -> Self {
        Self {
            signed_in: Some(SignedIn { user, usage }),
            policy,
        }
    }

    /// Forget the signed-in user and their usage.
    pub fn sign_out(&mut self) {
        if let Some(signed_in) = self.signed_in.take() {
            tracing::debug!(user_id = signed_in.user.user_id, "Signed out");
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.signed_in.as_ref().map(|s| &s.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.is_some()
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    pub fn actor(&self) -> ActorClass {
        ActorClass::from_plan(self.user().map(|u| u.plan))
    }

    /// Hotspots the signed-in user owns, as last reported. Unknown is zero.
    pub fn hotspot_usage(&self) -> i64 {
        usage_or_zero(
            self.signed_in
                .as_ref()
                .and_then(|s| s.usage.as_ref())
                .map(|u| u.total_hotspots),
        )
    }

    /// Record a usage report. The plan in the report wins over the one the
    /// session was opened with, since upgrades happen out of band.
    pub fn apply_usage(&mut self, usage: UsageSummary) {
        if let Some(signed_in) = &mut self.signed_in {
            signed_in.user.plan = usage.plan;
            signed_in.usage = Some(usage);
        }
    }

    /// Count that the policy needs for this actor.
    ///
    /// `hotspots_on_page` is used for anonymous actors; signed-in free
    /// actors are measured by their reported usage across all pages.
    fn current_count(&self, hotspots_on_page: i64) -> i64 {
        match self.actor() {
            ActorClass::Anonymous => hotspots_on_page,
            ActorClass::SignedInFree | ActorClass::SignedInPro => self.hotspot_usage(),
        }
    }

    /// Client-side pre-check before an optimistic create.
    pub fn can_create_hotspot(&self, hotspots_on_page: i64) -> Result<(), CoreError> {
        self.policy
            .check(self.actor(), self.current_count(hotspots_on_page))
    }

    /// `None` when unbounded.
    pub fn remaining_hotspots(&self, hotspots_on_page: i64) -> Option<i64> {
        self.policy
            .remaining(self.actor(), self.current_count(hotspots_on_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hotspot_core::quota::QuotaReason;

    fn user(plan: PlanType) -> SessionUser {
        SessionUser {
            user_id: 7,
            email: "user@example.com".into(),
            plan,
        }
    }

    fn usage(plan: PlanType, total_hotspots: i64) -> UsageSummary {
        UsageSummary {
            plan,
            total_hotspots,
            total_pages: 1,
            limit: Some(10),
            remaining: Some(10 - total_hotspots),
        }
    }

    #[test]
    fn anonymous_is_measured_per_page() {
        let session = Session::anonymous(QuotaPolicy::new(10));
        assert!(session.can_create_hotspot(9).is_ok());
        assert_matches!(
            session.can_create_hotspot(10),
            Err(CoreError::QuotaExceeded {
                reason: QuotaReason::AnonymousLimit,
                ..
            })
        );
        assert_eq!(session.remaining_hotspots(4), Some(6));
    }

    #[test]
    fn free_user_is_measured_by_reported_usage() {
        let session = Session::signed_in(
            user(PlanType::Free),
            Some(usage(PlanType::Free, 10)),
            QuotaPolicy::new(10),
        );
        // The page itself is empty, but the account is full.
        assert_matches!(
            session.can_create_hotspot(0),
            Err(CoreError::QuotaExceeded {
                reason: QuotaReason::FreePlanLimit,
                ..
            })
        );
    }

    #[test]
    fn missing_usage_counts_as_zero() {
        let session = Session::signed_in(user(PlanType::Free), None, QuotaPolicy::new(10));
        assert_eq!(session.hotspot_usage(), 0);
        assert!(session.can_create_hotspot(50).is_ok());
        assert_eq!(session.remaining_hotspots(0), Some(10));
    }

    #[test]
    fn pro_is_unbounded() {
        let session = Session::signed_in(
            user(PlanType::Pro),
            Some(usage(PlanType::Pro, 500)),
            QuotaPolicy::new(10),
        );
        assert!(session.can_create_hotspot(500).is_ok());
        assert_eq!(session.remaining_hotspots(500), None);
    }

    #[test]
    fn usage_report_updates_plan() {
        let mut session = Session::signed_in(user(PlanType::Free), None, QuotaPolicy::new(10));
        session.apply_usage(usage(PlanType::Pro, 3));
        assert_eq!(session.actor(), ActorClass::SignedInPro);
        assert_eq!(session.hotspot_usage(), 3);
    }

    #[test]
    fn sign_out_returns_to_anonymous() {
        let mut session = Session::signed_in(
            user(PlanType::Free),
            Some(usage(PlanType::Free, 10)),
            QuotaPolicy::new(10),
        );
        session.sign_out();
        assert!(!session.is_signed_in());
        assert_eq!(session.actor(), ActorClass::Anonymous);
        assert!(session.can_create_hotspot(0).is_ok());
    }
}
