//! Heuristic reading of detected equations.
//!
//! An ordered rule table maps an equation, plus the prose around it, to a
//! short meaning and a likely impact. The first rule that applies wins.
//! Term checks look at both the equation and the surrounding text.

use lazy_static::lazy_static;
use regex::Regex;

/// Characters of context taken on each side of an equation.
pub const CONTEXT_CHARS: usize = 240;

lazy_static! {
    static ref CROSS_ENTROPY_SUM: Regex =
        Regex::new(r"(?:\\sum|∑|\bsum\b).*\by[\w{}^]*\s*\\?log\s*\(?\s*p").unwrap();
    static ref KL_CALL: Regex = Regex::new(r"\bkl\s*\(").unwrap();
    static ref ARG_OPT: Regex = Regex::new(r"arg\s*\\?_?(?:min|max)").unwrap();
    static ref SOFTMAX_FORM: Regex = Regex::new(r"e\^[^/]+/\s*(?:\\sum|∑)").unwrap();
    static ref DERIVATIVE: Regex = Regex::new(r"\bd\S/d\S").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquationReading {
    pub meaning: &'static str,
    pub impact: &'static str,
}

/// Lower-cased views of the equation and its context.
struct Subject {
    eq: String,
    nearby: String,
}

impl Subject {
    fn new(equation: &str, nearby: &str) -> Self {
        Self { eq: equation.to_lowercase(), nearby: nearby.to_lowercase() }
    }

    /// Any term appears in the equation or the surrounding text.
    fn mentions(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| has_term(&self.eq, t) || has_term(&self.nearby, t))
    }

    /// Any term appears in the equation itself.
    fn eq_has(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| has_term(&self.eq, t))
    }

    fn is_definition(&self) -> bool {
        self.eq.contains('=')
    }
}

struct ReadingRule {
    name: &'static str,
    applies: fn(&Subject) -> bool,
    meaning: &'static str,
    impact: &'static str,
}

const RULES: &[ReadingRule] = &[
    ReadingRule {
        name: "cross_entropy",
        applies: |s: &Subject| {
            s.mentions(&["cross-entropy", "cross entropy", "log-likelihood", "log likelihood"])
                || CROSS_ENTROPY_SUM.is_match(&s.eq)
        },
        meaning: "Cross-entropy/log-likelihood objective for fitting predicted distributions.",
        impact: "Improves classification performance and calibration by maximizing probability of true labels.",
    },
    ReadingRule {
        name: "kl_divergence",
        applies: |s: &Subject| s.mentions(&["kl", "d_kl", "d_{kl}", "dkl"]) || KL_CALL.is_match(&s.eq),
        meaning: "KL-divergence regularizer aligning two distributions.",
        impact: "Stabilizes training and steers solutions toward desired priors; improves generalization.",
    },
    ReadingRule {
        name: "arg_optimum",
        applies: |s: &Subject| ARG_OPT.is_match(&s.eq),
        meaning: "Optimization objective defining the best parameters under the stated criterion.",
        impact: "Determines the learned solution; directly impacts accuracy and robustness.",
    },
    ReadingRule {
        name: "regularized_risk",
        applies: |s: &Subject| {
            s.eq_has(&["\\sum", "∑", "sum"]) && s.eq_has(&["||", "\\|", "l2", "λ", "\\lambda", "lambda"])
        },
        meaning: "Empirical risk with regularization (trade-off between fit and complexity).",
        impact: "Reduces overfitting, improving test performance at potential cost of bias.",
    },
    ReadingRule {
        name: "softmax",
        applies: |s: &Subject| s.mentions(&["softmax"]) || SOFTMAX_FORM.is_match(&s.eq),
        meaning: "Softmax-based scoring/attention to weight alternatives.",
        impact: "Focuses the model on salient features; often boosts performance on structured tasks.",
    },
    ReadingRule {
        name: "attention",
        applies: |s: &Subject| s.mentions(&["qk", "q·k", "qk^t", "qk^\\top", "attention"]),
        meaning: "Attention mechanism computing relevance between query and key to weight values.",
        impact: "Improves representation of long-range dependencies; enhances accuracy and interpretability.",
    },
    ReadingRule {
        name: "gradient",
        applies: |s: &Subject| {
            s.mentions(&["∇", "\\nabla", "nabla", "gradient", "∂", "\\partial", "partial"])
                || DERIVATIVE.is_match(&s.eq)
        },
        meaning: "Gradient/derivative relation governing parameter updates or sensitivities.",
        impact: "Affects convergence speed and stability; critical for achieving reported results.",
    },
    ReadingRule {
        name: "constraint",
        applies: |s: &Subject| {
            s.eq_has(&["≤", "≥", ">=", "<=", "<", ">", "\\le", "\\ge", "\\leq", "\\geq"])
                || s.mentions(&["constraint", "subject to", "s.t."])
        },
        meaning: "Constraint or bound restricting feasible solutions or establishing guarantees.",
        impact: "Improves robustness and safety; clarifies validity regime of the method.",
    },
    ReadingRule {
        name: "metric",
        applies: |s: &Subject| s.mentions(&["f1", "precision", "recall", "auc", "iou", "bleu", "rouge"]),
        meaning: "Evaluation metric defining how performance is measured.",
        impact: "Shapes optimization focus and reported improvements.",
    },
    ReadingRule {
        name: "probabilistic",
        applies: |s: &Subject| s.eq_has(&["p("]) || s.mentions(&["posterior", "prior", "bayes"]),
        meaning: "Probabilistic relation modeling uncertainty or conditional dependence.",
        impact: "Improves calibration and decision-making under uncertainty.",
    },
    ReadingRule {
        name: "norm_penalty",
        applies: |s: &Subject| s.mentions(&["||", "\\|", "norm", "l1", "l2", "λ", "\\lambda", "lambda"]),
        meaning: "Regularization term controlling parameter magnitude/complexity.",
        impact: "Reduces overfitting and improves generalization stability.",
    },
    ReadingRule {
        name: "convolution",
        applies: |s: &Subject| s.mentions(&["conv", "convolution", "kernel"]),
        meaning: "Convolution/kernel operation extracting structured features.",
        impact: "Enables learning of spatial/temporal patterns; boosts representation quality.",
    },
    ReadingRule {
        name: "summation",
        applies: |s: &Subject| s.is_definition() && s.eq_has(&["\\sum", "∑", "sum"]),
        meaning: "Summation-based definition or objective over data or components.",
        impact: "Aggregates evidence across samples/parts; influences final scores and training.",
    },
    ReadingRule {
        name: "optimization",
        applies: |s: &Subject| s.is_definition() && s.eq_has(&["arg", "min", "max"]),
        meaning: "Optimization statement defining the learned solution.",
        impact: "Determines the final model parameters and results.",
    },
];

const GENERIC: EquationReading = EquationReading {
    meaning: "Defines a key relationship used by the method.",
    impact: "Guides the model's behavior and influences reported results.",
};

/// Read `equation` in the light of the prose `nearby` it.
pub fn interpret(equation: &str, nearby: &str) -> EquationReading {
    let subject = Subject::new(equation, nearby);
    RULES
        .iter()
        .find(|rule| (rule.applies)(&subject))
        .map(|rule| EquationReading { meaning: rule.meaning, impact: rule.impact })
        .unwrap_or(GENERIC)
}

/// Name of the first rule that applies, for diagnostics and tests.
pub fn rule_name(equation: &str, nearby: &str) -> Option<&'static str> {
    let subject = Subject::new(equation, nearby);
    RULES.iter().find(|rule| (rule.applies)(&subject)).map(|rule| rule.name)
}

/// Up to `radius` characters either side of the byte span `start..end`.
pub fn nearby_text(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let before = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let after = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    &text[before..after]
}

/// Alphanumeric terms must stand alone; symbolic terms match anywhere.
fn has_term(haystack: &str, term: &str) -> bool {
    if !term.chars().all(char::is_alphanumeric) {
        return haystack.contains(term);
    }
    haystack.match_indices(term).any(|(i, _)| {
        let left = haystack[..i].chars().next_back();
        let right = haystack[i + term.len()..].chars().next();
        !left.is_some_and(char::is_alphanumeric) && !right.is_some_and(char::is_alphanumeric)
    })
}
