//! Deterministic template story generator.
//!
//! Last stage of the orchestrator chain: when no backend is usable, a
//! rule-based classifier infers an actor role, a priority, and a complexity
//! tier from the raw prompt, and a fixed-structure story document is
//! rendered from those three values. This path never fails.
//!
//! The rule tables are ordered data, not branching logic: matching is
//! case-insensitive substring search, first matching rule wins, and the
//! listed order (role admin → dev → customer, priority high → low, size
//! small → large) is preserved from the behavior this replaces. Keyword
//! lists carry both English and Vietnamese terms because prompts arrive in
//! either language.

use storyloom_core::defaults::{
    HOURS_PER_POINT, POINTS_LARGE, POINTS_MEDIUM, POINTS_SMALL, TEMPLATE_DESC_CHARS,
    TEMPLATE_TITLE_CHARS,
};
use storyloom_core::truncate_chars;

// =============================================================================
// INFERRED VALUES
// =============================================================================

/// Actor role inferred from the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Administrator,
    Developer,
    Customer,
    /// Default when no role keyword matches.
    EndUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Developer => "developer",
            Role::Customer => "customer",
            Role::EndUser => "end user",
        }
    }
}

/// Priority inferred from the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Complexity tier inferred from the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Small,
    Medium,
    Large,
}

impl SizeTier {
    /// Story points assigned to this tier.
    pub fn points(&self) -> u32 {
        match self {
            SizeTier::Small => POINTS_SMALL,
            SizeTier::Medium => POINTS_MEDIUM,
            SizeTier::Large => POINTS_LARGE,
        }
    }
}

// =============================================================================
// RULE TABLES
// =============================================================================

/// One ordered classifier rule: any keyword hit applies the effect.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T: Copy> {
    pub keywords: &'static [&'static str],
    pub effect: T,
}

/// Role rules, checked in order; first match wins.
pub const ROLE_RULES: &[KeywordRule<Role>] = &[
    KeywordRule {
        keywords: &["admin", "quản trị", "quan tri", "manager"],
        effect: Role::Administrator,
    },
    KeywordRule {
        keywords: &["dev", "developer", "lập trình", "lap trinh"],
        effect: Role::Developer,
    },
    KeywordRule {
        keywords: &["khách hàng", "khach hang", "customer", "client"],
        effect: Role::Customer,
    },
];

/// Priority rules. High is listed before Low, so a prompt carrying keywords
/// from both sets resolves High.
pub const PRIORITY_RULES: &[KeywordRule<Priority>] = &[
    KeywordRule {
        keywords: &["khẩn cấp", "khan cap", "urgent", "gấp", "quan trọng", "critical"],
        effect: Priority::High,
    },
    KeywordRule {
        keywords: &["không gấp", "khong gap", "not urgent", "bình thường", "low priority", "minor"],
        effect: Priority::Low,
    },
];

/// Size rules. Small is listed before Large.
pub const SIZE_RULES: &[KeywordRule<SizeTier>] = &[
    KeywordRule {
        keywords: &["đơn giản", "don gian", "simple", "dễ", "easy", "trivial"],
        effect: SizeTier::Small,
    },
    KeywordRule {
        keywords: &[
            "phức tạp",
            "phuc tap",
            "complex",
            "khó",
            "tích hợp",
            "tich hop",
            "integration",
            "difficult",
        ],
        effect: SizeTier::Large,
    },
];

/// First matching rule in listed order, or `default` when nothing matches.
/// Matching is case-insensitive substring search on the whole prompt.
pub fn classify<T: Copy>(prompt: &str, rules: &[KeywordRule<T>], default: T) -> T {
    let haystack = prompt.to_lowercase();
    for rule in rules {
        if rule.keywords.iter().any(|k| haystack.contains(k)) {
            return rule.effect;
        }
    }
    default
}

/// Infer the actor role from a raw prompt.
pub fn infer_role(prompt: &str) -> Role {
    classify(prompt, ROLE_RULES, Role::EndUser)
}

/// Infer the priority from a raw prompt.
pub fn infer_priority(prompt: &str) -> Priority {
    classify(prompt, PRIORITY_RULES, Priority::Medium)
}

/// Infer the complexity tier from a raw prompt.
pub fn infer_size(prompt: &str) -> SizeTier {
    classify(prompt, SIZE_RULES, SizeTier::Medium)
}

// =============================================================================
// TEMPLATE RENDERING
// =============================================================================

/// Render the fixed-structure story document. Never fails, for any prompt.
pub fn render_story(prompt: &str) -> String {
    let role = infer_role(prompt);
    let priority = infer_priority(prompt);
    let size = infer_size(prompt);
    render_with(prompt, role, priority, size)
}

fn render_with(prompt: &str, role: Role, priority: Priority, size: SizeTier) -> String {
    let title = truncate_chars(prompt, TEMPLATE_TITLE_CHARS).trim_end();
    let goal = truncate_chars(prompt, TEMPLATE_DESC_CHARS).trim_end();
    let points = size.points();
    let role = role.as_str();

    format!(
        "## USER STORY\n\
         As a **{role}**, I want **{title}** so that my workflow and \
         experience improve.\n\
         \n\
         ## DESCRIPTION\n\
         This capability lets a {role} accomplish \"{goal}\" efficiently and \
         reliably. The solution must stay secure, perform well, and present \
         a clear interface.\n\
         \n\
         ## BUSINESS VALUE\n\
         - **Efficiency:** reduces time spent on this task\n\
         - **Experience:** improves user satisfaction\n\
         - **Process:** simplifies the steps involved\n\
         - **Safety:** keeps sensitive data protected\n\
         \n\
         ## ACCEPTANCE CRITERIA\n\
         - [ ] **Given** a signed-in {role}, **When** the feature is used, \
         **Then** the system responds within 2 seconds\n\
         - [ ] **Given** user-entered data, **When** it is validated, \
         **Then** clear errors are shown for invalid input\n\
         - [ ] **Given** the feature is active, **When** a failure occurs, \
         **Then** the system recovers or reports the error\n\
         - [ ] **Given** the finished feature, **When** exercised on desktop \
         and mobile, **Then** behavior is stable on both\n\
         \n\
         ## ESTIMATION\n\
         - **Story Points:** {points}\n\
         - **Priority:** {prio}\n\
         - **Estimated Time:** {hours} hours\n\
         \n\
         > Drafted offline by the template generator; start the local model \
         service for a richer draft.\n",
        role = role,
        title = title,
        goal = goal,
        points = points,
        prio = priority.as_str(),
        hours = points * HOURS_PER_POINT,
    )
}
