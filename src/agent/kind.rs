// ABOUTME: SubAgentType - the closed set of subagent archetypes.
// ABOUTME: Each variant maps to one static profile: description, system prompt, tool policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Whether a subagent may see the host's tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPolicy {
    /// No tool schema is ever attached to the request.
    NoTools,
    /// Every tool of the executor's registry is attached, except `task`.
    FullToolSet,
}

/// Static data for one subagent type.
#[derive(Debug)]
pub struct Profile {
    /// Wire name used in tool calls and configuration.
    pub name: &'static str,

    /// One-line purpose shown in reports.
    pub description: &'static str,

    /// Prepended to the conversation as a system message, if present.
    pub system_prompt: Option<&'static str>,

    pub tool_policy: ToolPolicy,
}

pub static GENERAL_PURPOSE: Profile = Profile {
    name: "general-purpose",
    description: "General-purpose agent for complex tasks",
    system_prompt: None,
    tool_policy: ToolPolicy::FullToolSet,
};

pub static EXPLORE: Profile = Profile {
    name: "explore",
    description: "Fast agent for exploring codebases",
    system_prompt: Some(
        "You are a codebase exploration agent. Your goal is to quickly find files, \
         search code, and answer questions about the codebase structure. \
         Be thorough but efficient in your exploration.",
    ),
    tool_policy: ToolPolicy::FullToolSet,
};

pub static PLAN: Profile = Profile {
    name: "plan",
    description: "Software architect agent for designing implementation plans",
    system_prompt: Some(
        "You are a software architect agent. Your goal is to design implementation plans \
         by exploring the codebase and providing step-by-step plans. Focus on: \
         1) Understanding existing patterns, 2) Identifying critical files, \
         3) Considering architectural trade-offs.",
    ),
    tool_policy: ToolPolicy::NoTools,
};

pub static CODE_REVIEW: Profile = Profile {
    name: "code-review",
    description: "Code reviewer agent for analyzing code quality",
    system_prompt: Some(
        "You are a code reviewer agent. Your goal is to analyze code quality, \
         identify potential bugs, suggest improvements, and ensure best practices. \
         Focus on: correctness, performance, security, and maintainability.",
    ),
    tool_policy: ToolPolicy::FullToolSet,
};

pub static TEST_RUNNER: Profile = Profile {
    name: "test-runner",
    description: "Test runner agent for testing and validation",
    system_prompt: Some(
        "You are a test runner agent. Your goal is to design and execute tests, \
         validate functionality, and report issues. Be thorough in testing edge cases \
         and providing actionable feedback.",
    ),
    tool_policy: ToolPolicy::FullToolSet,
};

/// Types of subagents that can be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubAgentType {
    /// General-purpose agent for complex tasks.
    GeneralPurpose,
    /// Fast agent for exploring codebases.
    Explore,
    /// Software architect agent; never gets tools.
    Plan,
    /// Code reviewer agent.
    CodeReview,
    /// Test runner agent.
    TestRunner,
}

impl SubAgentType {
    /// Every variant, in declaration order.
    pub const ALL: [SubAgentType; 5] = [
        SubAgentType::GeneralPurpose,
        SubAgentType::Explore,
        SubAgentType::Plan,
        SubAgentType::CodeReview,
        SubAgentType::TestRunner,
    ];

    /// The static profile for this type.
    pub fn profile(self) -> &'static Profile {
        match self {
            SubAgentType::GeneralPurpose => &GENERAL_PURPOSE,
            SubAgentType::Explore => &EXPLORE,
            SubAgentType::Plan => &PLAN,
            SubAgentType::CodeReview => &CODE_REVIEW,
            SubAgentType::TestRunner => &TEST_RUNNER,
        }
    }

    /// Wire name, e.g. `general-purpose`.
    pub fn as_str(self) -> &'static str {
        self.profile().name
    }

    pub fn description(self) -> &'static str {
        self.profile().description
    }

    pub fn system_prompt(self) -> Option<&'static str> {
        self.profile().system_prompt
    }

    pub fn tool_policy(self) -> ToolPolicy {
        self.profile().tool_policy
    }

    /// Comma-separated wire names, for error messages and tool schemas.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SubAgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drop separators and case so `general-purpose`, `general_purpose` and
/// `GeneralPurpose` compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for SubAgentType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|t| normalize(t.as_str()) == wanted)
            .ok_or_else(|| {
                TaskError::InvalidRequest(format!(
                    "Unknown subagent type '{}'. Valid types are: {}",
                    s,
                    Self::valid_names()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert!(SubAgentType::GeneralPurpose.description().contains("General-purpose"));
        assert!(SubAgentType::Explore.description().contains("exploring"));
        assert_eq!(
            SubAgentType::Plan.description(),
            "Software architect agent for designing implementation plans"
        );
        assert!(SubAgentType::CodeReview.description().contains("reviewer"));
        assert!(SubAgentType::TestRunner.description().contains("testing"));
    }

    #[test]
    fn test_profile_lookups_are_stable() {
        for t in SubAgentType::ALL {
            assert_eq!(t.description(), t.description());
            assert_eq!(t.tool_policy(), t.tool_policy());
            assert_eq!(t.system_prompt(), t.system_prompt());
            assert!(std::ptr::eq(t.profile(), t.profile()));
        }
    }

    #[test]
    fn test_system_prompts() {
        assert!(SubAgentType::GeneralPurpose.system_prompt().is_none());
        assert!(SubAgentType::Explore.system_prompt().unwrap().contains("exploration agent"));
        assert!(SubAgentType::Plan.system_prompt().unwrap().contains("architect agent"));
        assert!(SubAgentType::CodeReview.system_prompt().unwrap().contains("code reviewer"));
        assert!(SubAgentType::TestRunner.system_prompt().unwrap().contains("test runner"));
    }

    #[test]
    fn test_system_prompt_text() {
        assert_eq!(
            SubAgentType::Explore.system_prompt(),
            Some(
                "You are a codebase exploration agent. Your goal is to quickly find files, \
                 search code, and answer questions about the codebase structure. \
                 Be thorough but efficient in your exploration."
            )
        );
        assert_eq!(
            SubAgentType::Plan.system_prompt(),
            Some(
                "You are a software architect agent. Your goal is to design implementation \
                 plans by exploring the codebase and providing step-by-step plans. Focus on: \
                 1) Understanding existing patterns, 2) Identifying critical files, \
                 3) Considering architectural trade-offs."
            )
        );
        assert_eq!(
            SubAgentType::CodeReview.system_prompt(),
            Some(
                "You are a code reviewer agent. Your goal is to analyze code quality, \
                 identify potential bugs, suggest improvements, and ensure best practices. \
                 Focus on: correctness, performance, security, and maintainability."
            )
        );
        assert_eq!(
            SubAgentType::TestRunner.system_prompt(),
            Some(
                "You are a test runner agent. Your goal is to design and execute tests, \
                 validate functionality, and report issues. Be thorough in testing edge \
                 cases and providing actionable feedback."
            )
        );
    }

    #[test]
    fn test_tool_policies() {
        assert_eq!(SubAgentType::Plan.tool_policy(), ToolPolicy::NoTools);
        for t in [
            SubAgentType::GeneralPurpose,
            SubAgentType::Explore,
            SubAgentType::CodeReview,
            SubAgentType::TestRunner,
        ] {
            assert_eq!(t.tool_policy(), ToolPolicy::FullToolSet, "{t}");
        }
    }

    #[test]
    fn test_parse_wire_names() {
        for t in SubAgentType::ALL {
            assert_eq!(t.to_string().parse::<SubAgentType>().unwrap(), t);
        }
    }

    #[test]
    fn test_parse_lenient_spellings() {
        assert_eq!("Explore".parse::<SubAgentType>().unwrap(), SubAgentType::Explore);
        assert_eq!("PLAN".parse::<SubAgentType>().unwrap(), SubAgentType::Plan);
        assert_eq!(
            "GeneralPurpose".parse::<SubAgentType>().unwrap(),
            SubAgentType::GeneralPurpose
        );
        assert_eq!(
            "code_review".parse::<SubAgentType>().unwrap(),
            SubAgentType::CodeReview
        );
    }

    #[test]
    fn test_parse_unknown() {
        let err = "invalid-type".parse::<SubAgentType>().unwrap_err();
        match err {
            TaskError::InvalidRequest(msg) => {
                assert!(msg.contains("Unknown subagent type 'invalid-type'"));
                assert!(msg.contains("general-purpose, explore, plan, code-review, test-runner"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!("".parse::<SubAgentType>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&SubAgentType::CodeReview).unwrap();
        assert_eq!(json, "\"code-review\"");
        let back: SubAgentType = serde_json::from_str("\"test-runner\"").unwrap();
        assert_eq!(back, SubAgentType::TestRunner);
    }
}
