//! Analysis report shared by the `file` and `feed` commands

use std::io::Write;

use serde::Serialize;

use sridm_analyzer::{AnalyzerError, MsgAnalyzer};
use sridm_core::config::AnalyzerSection;
use sridm_core::types::LogMsg;

use crate::cli::MatchArgs;

/// Separator printed after every reproduced debug message.
const MSG_SEPARATOR: &str = "-------";

/// Effective matching options after applying CLI flags over the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    pub idi_pattern: String,
    pub show_eps: bool,
    pub show_msgs: bool,
}

impl MatchSettings {
    /// CLI flags win over `[analyzer]` values.
    pub fn resolve(section: &AnalyzerSection, args: &MatchArgs) -> Self {
        Self {
            idi_pattern: args
                .idi_pattern
                .clone()
                .unwrap_or_else(|| section.idi_pattern.clone()),
            show_eps: args.show_eps.unwrap_or(section.show_eps),
            show_msgs: args.show_msgs.unwrap_or(section.show_msgs),
        }
    }
}

/// Matched tunnel endpoint.
#[derive(Debug, Serialize)]
pub struct MatchedTunnel {
    pub idi: String,
    pub endpoint: String,
}

/// Result of one analysis run.
///
/// `endpoints` and `messages` are present only when the corresponding
/// display option is enabled.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Input the messages came from (file path or recording)
    pub source: String,
    pub idi_pattern: String,
    /// Number of debug messages extracted
    pub total_messages: usize,
    /// Number of distinct IDi seen
    pub total_identities: usize,
    /// Number of IDi matching the pattern
    pub matched_identities: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<MatchedTunnel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<LogMsg>>,
    /// Pre-rendered "N matched out of total M" summary
    #[serde(skip)]
    pub eps_summary: String,
}

impl AnalysisReport {
    /// Build the report from a finished analyzer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::InvalidPattern`] if the pattern does not compile.
    pub fn build(
        source: impl Into<String>,
        engine: &MsgAnalyzer,
        settings: &MatchSettings,
    ) -> Result<Self, AnalyzerError> {
        let pattern = settings.idi_pattern.as_str();
        let matched = engine.matched_endpoints(pattern)?;

        let endpoints = settings.show_eps.then(|| {
            matched
                .iter()
                .map(|(idi, ep)| MatchedTunnel {
                    idi: idi.clone(),
                    endpoint: ep.to_string(),
                })
                .collect()
        });

        let messages = if settings.show_msgs {
            Some(
                engine
                    .matched_messages(pattern)?
                    .into_iter()
                    .cloned()
                    .collect(),
            )
        } else {
            None
        };

        Ok(Self {
            source: source.into(),
            idi_pattern: settings.idi_pattern.clone(),
            total_messages: engine.message_count(),
            total_identities: engine.identity_count(),
            matched_identities: matched.len(),
            endpoints,
            messages,
            eps_summary: engine.eps_summary(pattern)?,
        })
    }
}

impl crate::output::Render for AnalysisReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.endpoints.is_some() {
            writeln!(w, "Found following matched tunnel EPs:")?;
            writeln!(w, "{}", self.eps_summary)?;
        }

        if let Some(ref messages) = self.messages {
            for msg in messages {
                writeln!(w, "{} {}\n{}\n{}", msg.id, msg.timestamp, msg.body, MSG_SEPARATOR)?;
            }
        }

        Ok(())
    }
}
