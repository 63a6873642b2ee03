//! User-facing notifications and confirmation prompts.
//!
//! The editor queues [`Notice`]s; the UI drains and renders them. Every
//! failed mutation queues exactly one.

use hotspot_core::quota::QuotaReason;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
    /// A create was refused by the quota; the UI should offer an upgrade.
    UpgradePrompt {
        reason: QuotaReason,
        used: i64,
        limit: i64,
    },
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// The notice for a failed store call: an upgrade prompt for quota
    /// denials, `fallback` for everything else.
    pub fn for_failure(err: &StoreError, fallback: &str) -> Self {
        match err {
            StoreError::QuotaExceeded {
                reason,
                used,
                limit,
            } => Self::UpgradePrompt {
                reason: *reason,
                used: *used,
                limit: *limit,
            },
            _ => Self::Error(fallback.to_string()),
        }
    }

    /// Human-readable text.
    pub fn message(&self) -> String {
        match self {
            Self::Success(msg) | Self::Error(msg) => msg.clone(),
            Self::UpgradePrompt {
                reason: QuotaReason::AnonymousLimit,
                limit,
                ..
            } => format!(
                "This page has reached the limit of {limit} hotspots. Sign up to keep adding more."
            ),
            Self::UpgradePrompt {
                reason: QuotaReason::FreePlanLimit,
                limit,
                ..
            } => format!(
                "You have used all {limit} hotspots on the free plan. Upgrade to Pro for unlimited hotspots."
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Success(_))
    }
}

/// Severity of a confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmVariant {
    #[default]
    Default,
    Warning,
    Danger,
}

/// Parameters for a confirmation dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub variant: ConfirmVariant,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
            variant: ConfirmVariant::Default,
        }
    }

    pub fn variant(mut self, variant: ConfirmVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }

    /// The prompt shown before deleting a hotspot.
    pub fn delete_hotspot() -> Self {
        Self::new(
            "Delete hotspot",
            "Are you sure you want to delete this hotspot? This action cannot be undone.",
        )
        .confirm_label("Delete")
        .variant(ConfirmVariant::Danger)
    }
}
