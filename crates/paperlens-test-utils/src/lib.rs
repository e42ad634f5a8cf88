//! Shared fixtures for Paperlens tests.
//!
//! The reference fixture is a short but complete machine-learning paper with
//! every essential section, author-year and numbered citations, a resolvable
//! reference list, captions, and equations. Variants drop one section so
//! tests can compare "complete" against "all else equal" documents.

use paperlens_common::document::RawDocument;

pub use pretty_assertions;

pub const TITLE: &str = "Graph Neural Networks for Molecular Property Prediction";
pub const AUTHORS: &str = "Alex Doe, Sam Roe";

pub const ABSTRACT: &str = "\
This paper addresses the problem of predicting molecular properties from structure. \
We propose a message passing graph neural network and evaluate it on three public benchmarks. \
Our results show that the method improves accuracy by 4% over strong baselines while remaining efficient to train.";

pub const INTRODUCTION: &str = "\
Predicting the properties of molecules is a central challenge in drug discovery, and the need for \
accurate yet fast predictors motivates this work. Classical descriptors capture local chemistry but \
miss long-range structure, a gap noted by Gilmer et al. (2017) and by Smith (2020).
Graph neural networks [1, 2] learn directly from molecular graphs. Our main contribution is a message \
passing architecture with edge-aware attention, together with a careful evaluation protocol.";

pub const METHODOLOGY: &str = "\
We use the QM9 dataset and two further public datasets, with a random split into training, validation \
and test data. Each molecule is encoded as a graph whose nodes are atoms and whose edges are bonds.
The training procedure minimises the loss
L = mean(abs(y - p)) (1)
with the Adam algorithm [3]. Hyperparameters were selected on the validation split, and the \
implementation details are listed in Table 1. We measure accuracy and mean absolute error as the \
evaluation metrics. Attention weights follow $a_{ij} = softmax(e_{ij})$ over neighbouring atoms.
Table 1: Hyperparameters used in all experiments.";

pub const RESULTS: &str = "\
Table 2: Mean absolute error on the three benchmarks.
Our model outperforms all baselines on every benchmark, improving accuracy by 4% on average compared \
with the strongest prior work [4]. The improvement is significant (p < 0.01) across five random seeds, \
with a standard deviation below 0.3%. An ablation study shows that removing edge-aware attention loses \
most of the gain.
Figure 1: Validation error over training epochs for all models.";

pub const DISCUSSION: &str = "\
These findings suggest that long-range interactions matter for molecular property prediction, and they \
indicate that attention over edges is an efficient way to capture them. One limitation is that the \
benchmarks contain only small organic molecules, so the results may not transfer to proteins [5].";

pub const CONCLUSION: &str = "\
In summary, we presented a message passing graph neural network for molecular property prediction and \
showed consistent gains over strong baselines. Future work will extend the approach to larger molecules \
and to protein-ligand complexes.";

pub const REFERENCES: &str = "\
[1] J. Gilmer, S. Schoenholz, P. Riley. Neural message passing for quantum chemistry. ICML, 2017.
[2] T. Kipf and M. Welling. Semi-supervised classification with graph convolutional networks. ICLR, 2017.
[3] D. Kingma and J. Ba. Adam: A method for stochastic optimization. ICLR, 2015.
[4] K. Yang et al. Analyzing learned molecular representations for property prediction. JCIM, 2019.
[5] J. Jumper et al. Highly accurate protein structure prediction with AlphaFold. Nature, 2021.";

/// Heading/body pairs of the reference fixture, in document order.
pub const PARTS: [(&str, &str); 7] = [
    ("Abstract", ABSTRACT),
    ("1 Introduction", INTRODUCTION),
    ("2 Methodology", METHODOLOGY),
    ("3 Results", RESULTS),
    ("4 Discussion", DISCUSSION),
    ("5 Conclusion", CONCLUSION),
    ("References", REFERENCES),
];

fn render<'a>(parts: impl IntoIterator<Item = &'a (&'a str, &'a str)>) -> String {
    let mut out = format!("{TITLE}\n{AUTHORS}\n\n");
    for (heading, body) in parts {
        out.push_str(heading);
        out.push('\n');
        out.push_str(body);
        out.push_str("\n\n");
    }
    out
}

/// The full reference fixture as one string.
pub fn complete_paper() -> String {
    render(PARTS.iter())
}

/// The reference fixture without the part whose heading contains `heading`.
pub fn paper_without(heading: &str) -> String {
    render(PARTS.iter().filter(|(h, _)| !h.contains(heading)))
}

/// The reference fixture split over three pages: front matter and
/// introduction, then methods and results, then the rest.
pub fn paper_pages() -> Vec<String> {
    let complete = complete_paper();
    let methods = complete.find("2 Methodology").unwrap_or(0);
    let discussion = complete.find("4 Discussion").unwrap_or(complete.len());
    vec![
        complete[..methods].to_string(),
        complete[methods..discussion].to_string(),
        complete[discussion..].to_string(),
    ]
}

pub fn complete_document() -> RawDocument {
    RawDocument::from_text(complete_paper())
}

/// Assert two scores agree to within floating-point noise.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
