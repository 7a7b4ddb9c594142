use std::collections::{BTreeMap, BTreeSet, HashSet};

/// English stop words removed before weighting
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Sparse weight vector: (term index, weight), sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

/// Split a document into lower-cased word tokens of at least two characters,
/// dropping English stop words
pub fn tokenize(document: &str, stop_words: &HashSet<&str>) -> Vec<String> {
    document
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(|token| token.to_lowercase())
        .filter(|token| !stop_words.contains(token.as_str()))
        .collect()
}

/// Square, symmetric matrix of pairwise document similarity
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        Some(self.values[i * self.size + j])
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.size {
            return None;
        }
        Some(&self.values[i * self.size..(i + 1) * self.size])
    }
}

/// TF-IDF vector space fitted over one corpus snapshot
///
/// Weights are raw term count times smoothed IDF `ln((1 + n) / (1 + df)) + 1`,
/// L2-normalized per document. Vocabulary indices follow lexical order so the
/// fit is deterministic for identical input. The model is not incrementally
/// updatable; refit when the corpus changes.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl TfidfModel {
    /// Fit the model with the English stop-word list
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let stop_words: HashSet<&str> = ENGLISH_STOP_WORDS.iter().copied().collect();
        Self::fit_with_stop_words(documents, &stop_words)
    }

    pub fn fit_with_stop_words<S: AsRef<str>>(documents: &[S], stop_words: &HashSet<&str>) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenize(doc.as_ref(), stop_words))
            .collect();

        let terms: BTreeSet<&str> = tokenized.iter().flatten().map(String::as_str).collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        let mut counts: Vec<BTreeMap<usize, usize>> = Vec::with_capacity(tokenized.len());
        for tokens in &tokenized {
            let mut doc_counts = BTreeMap::new();
            for token in tokens {
                if let Some(&index) = vocabulary.get(token) {
                    *doc_counts.entry(index).or_insert(0) += 1;
                }
            }
            for &index in doc_counts.keys() {
                document_frequency[index] += 1;
            }
            counts.push(doc_counts);
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let vectors = counts
            .into_iter()
            .map(|doc_counts| {
                let mut vector: SparseVector = doc_counts
                    .into_iter()
                    .map(|(index, count)| (index, count as f64 * idf[index]))
                    .collect();
                normalize(&mut vector);
                vector
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Fitted TF-IDF over {} documents ({} terms)",
            vectors.len(),
            vocabulary.len()
        );

        Self {
            vocabulary,
            idf,
            vectors,
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&index| self.idf[index])
    }

    pub fn vector(&self, i: usize) -> Option<&[(usize, f64)]> {
        self.vectors.get(i).map(Vec::as_slice)
    }

    /// Cosine similarity of documents `i` and `j`, in `[0, 1]`
    ///
    /// The diagonal is 1 by convention, including for empty documents.
    /// Zero vectors score 0 against everything else. Out-of-range indices
    /// score 0.
    pub fn similarity(&self, i: usize, j: usize) -> f64 {
        let (Some(a), Some(b)) = (self.vectors.get(i), self.vectors.get(j)) else {
            return 0.0;
        };
        if i == j {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        dot(a, b).clamp(0.0, 1.0)
    }

    /// Similarity of document `i` against every document, in corpus order
    pub fn similarity_row(&self, i: usize) -> Vec<f64> {
        (0..self.len()).map(|j| self.similarity(i, j)).collect()
    }

    /// Full pairwise similarity matrix
    pub fn similarity_matrix(&self) -> SimilarityMatrix {
        let size = self.len();
        let mut values = vec![0.0; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let sim = self.similarity(i, j);
                values[i * size + j] = sim;
                values[j * size + i] = sim;
            }
        }
        SimilarityMatrix { size, values }
    }
}

fn normalize(vector: &mut SparseVector) {
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in vector.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of two index-sorted sparse vectors
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
