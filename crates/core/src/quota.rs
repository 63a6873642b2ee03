//! Hotspot quota policy.
//!
//! Anonymous actors are limited per page; signed-in free actors are limited
//! across every page they own; pro actors are unbounded. The same policy is
//! evaluated twice: once by the editor to skip a doomed round trip, and once
//! by the store inside the create transaction, which is the binding check.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hotspot cap shared by anonymous and free-plan actors.
pub const DEFAULT_HOTSPOT_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Plan type
// ---------------------------------------------------------------------------

/// Subscription plan of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Free,
    Pro,
}

const VALID_PLAN_STRINGS: &[&str] = &["free", "pro"];

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    /// Parse a plan name as stored in `user_profiles.plan_type`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            _ => Err(CoreError::Validation(format!(
                "Invalid plan type '{s}'. Must be one of: {}",
                VALID_PLAN_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Actor classification
// ---------------------------------------------------------------------------

/// Who is asking to create a hotspot, as far as quota is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorClass {
    Anonymous,
    SignedInFree,
    SignedInPro,
}

/// Which hotspots count toward an actor's limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaScope {
    /// Hotspots on the page being edited.
    Page,
    /// Hotspots on every page the signed-in user owns.
    Owner,
}

impl ActorClass {
    /// Classify from the signed-in user's plan; `None` means anonymous.
    pub fn from_plan(plan: Option<PlanType>) -> Self {
        match plan {
            None => Self::Anonymous,
            Some(PlanType::Free) => Self::SignedInFree,
            Some(PlanType::Pro) => Self::SignedInPro,
        }
    }

    /// The count the policy needs for this actor, or `None` if unbounded.
    pub fn scope(&self) -> Option<QuotaScope> {
        match self {
            Self::Anonymous => Some(QuotaScope::Page),
            Self::SignedInFree => Some(QuotaScope::Owner),
            Self::SignedInPro => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

// ---------------------------------------------------------------------------
// Denial reason
// ---------------------------------------------------------------------------

/// Machine-readable reason attached to a quota denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaReason {
    AnonymousLimit,
    FreePlanLimit,
}

impl QuotaReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnonymousLimit => "anonymous_limit",
            Self::FreePlanLimit => "free_plan_limit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "anonymous_limit" => Some(Self::AnonymousLimit),
            "free_plan_limit" => Some(Self::FreePlanLimit),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The quota rule set. The limit is configurable so deployments can tune it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub limit: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HOTSPOT_LIMIT,
        }
    }
}

impl QuotaPolicy {
    pub fn new(limit: i64) -> Self {
        Self { limit }
    }

    /// Decide whether `actor` may create one more hotspot given `current`
    /// hotspots in its scope.
    pub fn check(&self, actor: ActorClass, current: i64) -> Result<(), CoreError> {
        let reason = match actor {
            ActorClass::SignedInPro => return Ok(()),
            ActorClass::Anonymous => QuotaReason::AnonymousLimit,
            ActorClass::SignedInFree => QuotaReason::FreePlanLimit,
        };
        if current >= self.limit {
            return Err(CoreError::QuotaExceeded {
                reason,
                used: current,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// How many more hotspots `actor` may create, or `None` when unbounded.
    pub fn remaining(&self, actor: ActorClass, current: i64) -> Option<i64> {
        match actor {
            ActorClass::SignedInPro => None,
            _ => Some((self.limit - current).max(0)),
        }
    }
}

/// Usage from a possibly missing cached aggregate. Absent means zero.
pub fn usage_or_zero(cached: Option<i64>) -> i64 {
    cached.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
