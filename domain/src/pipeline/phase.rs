/// Stage of the expert-panel pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// LLM query analysis
    Analyze,
    /// Candidate retrieval (GraphRAG with relational fallbacks)
    Retrieve,
    /// Candidate scoring
    Rank,
    /// Best-agent selection
    Select,
    /// Panel members answering the question
    Generate,
    /// Merging panel answers into one
    Synthesize,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Analyze => "analyze",
            Phase::Retrieve => "retrieve",
            Phase::Rank => "rank",
            Phase::Select => "select",
            Phase::Generate => "generate",
            Phase::Synthesize => "synthesize",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Analyze => "Query Analysis",
            Phase::Retrieve => "Candidate Retrieval",
            Phase::Rank => "Ranking",
            Phase::Select => "Selection",
            Phase::Generate => "Panel Answers",
            Phase::Synthesize => "Synthesis",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
