//! # Modelo de Tokens, Sentenças e Documentos
//!
//! Representação em memória de um documento anotado, independente do
//! analisador usado. Cada token pertence a exatamente uma sentença e cada
//! sentença a exatamente um documento: tudo é possuído, nada é compartilhado.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ud::{Features, UdPos};

/// Identificador estável de um documento (inteiro positivo).
///
/// É a chave compartilhada por todos os artefatos do documento
/// (`{id}_raw.txt`, `{id}_meta.json`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u32);

impl DocumentId {
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .ok()
            .and_then(DocumentId::new)
            .ok_or_else(|| s.to_string())
    }
}

/// Parâmetros morfológicos de um token.
///
/// Imutável depois de anexado; pode ser substituído por inteiro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphologicalAnnotation {
    pub lemma: String,
    pub pos: UdPos,
    pub features: Features,
}

impl MorphologicalAnnotation {
    pub fn new(lemma: impl Into<String>, pos: UdPos, features: Features) -> Self {
        Self {
            lemma: lemma.into(),
            pos,
            features,
        }
    }

    /// Anotação sem features (fallbacks e pontuação sintética).
    pub fn bare(lemma: impl Into<String>, pos: UdPos) -> Self {
        Self::new(lemma, pos, Features::new())
    }
}

/// Um token anotado. A posição começa em 1; 0 é reservado para "sem head".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConlluToken {
    text: String,
    position: usize,
    annotation: MorphologicalAnnotation,
}

impl ConlluToken {
    pub fn new(text: impl Into<String>, position: usize, annotation: MorphologicalAnnotation) -> Self {
        Self {
            text: text.into(),
            position,
            annotation,
        }
    }

    /// Ponto final sintético acrescentado ao fim de cada sentença.
    pub fn terminal(position: usize) -> Self {
        Self::new(".", position, MorphologicalAnnotation::bare(".", UdPos::Punct))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn annotation(&self) -> &MorphologicalAnnotation {
        &self.annotation
    }

    /// Substitui a anotação inteira (sem mesclar).
    pub fn set_annotation(&mut self, annotation: MorphologicalAnnotation) {
        self.annotation = annotation;
    }
}

/// Uma sentença com seus tokens em ordem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConlluSentence {
    position: usize,
    text: String,
    tokens: Vec<ConlluToken>,
}

impl ConlluSentence {
    pub fn new(position: usize, text: impl Into<String>, tokens: Vec<ConlluToken>) -> Self {
        Self {
            position,
            text: text.into(),
            tokens,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[ConlluToken] {
        &self.tokens
    }
}

/// Documento do corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    raw_text: String,
    sentences: Vec<ConlluSentence>,
    pos_frequency: BTreeMap<UdPos, usize>,
}

impl Document {
    pub fn new(id: DocumentId, raw_text: impl Into<String>) -> Self {
        Self {
            id,
            raw_text: raw_text.into(),
            sentences: Vec::new(),
            pos_frequency: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn sentences(&self) -> &[ConlluSentence] {
        &self.sentences
    }

    /// Substitui todas as sentenças (uma nova execução não mescla).
    pub fn set_sentences(&mut self, sentences: Vec<ConlluSentence>) {
        self.sentences = sentences;
    }

    pub fn pos_frequency(&self) -> &BTreeMap<UdPos, usize> {
        &self.pos_frequency
    }

    pub fn set_pos_frequency(&mut self, frequency: BTreeMap<UdPos, usize>) {
        self.pos_frequency = frequency;
    }

    /// Conta as classes gramaticais de todos os tokens, sintéticos inclusive.
    pub fn count_pos(&self) -> BTreeMap<UdPos, usize> {
        let mut frequency = BTreeMap::new();
        for token in self.sentences.iter().flat_map(|s| s.tokens()) {
            *frequency.entry(token.annotation().pos).or_insert(0) += 1;
        }
        frequency
    }
}

/// Todos os documentos carregados, por id.
pub type Corpus = BTreeMap<DocumentId, Document>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence() -> ConlluSentence {
        ConlluSentence::new(
            1,
            "Мама мыла раму.",
            vec![
                ConlluToken::new("Мама", 1, MorphologicalAnnotation::bare("мама", UdPos::Noun)),
                ConlluToken::new("мыла", 2, MorphologicalAnnotation::bare("мыть", UdPos::Verb)),
                ConlluToken::new("раму", 3, MorphologicalAnnotation::bare("рама", UdPos::Noun)),
                ConlluToken::terminal(4),
            ],
        )
    }

    #[test]
    fn test_document_id_must_be_positive() {
        assert!(DocumentId::new(0).is_none());
        assert_eq!("05".parse::<DocumentId>().unwrap().get(), 5);
        assert!("-1".parse::<DocumentId>().is_err());
        assert!("abc".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_terminal_token() {
        let token = ConlluToken::terminal(7);
        assert_eq!(token.text(), ".");
        assert_eq!(token.position(), 7);
        assert_eq!(token.annotation().pos, UdPos::Punct);
        assert!(token.annotation().features.is_empty());
    }

    #[test]
    fn test_annotation_replaced_wholesale() {
        let mut features = Features::new();
        features.insert("Case", "Nom");
        let mut token = ConlluToken::new("мир", 1, MorphologicalAnnotation::new("мир", UdPos::Noun, features));
        token.set_annotation(MorphologicalAnnotation::bare("мир", UdPos::X));
        assert_eq!(token.annotation().pos, UdPos::X);
        assert!(token.annotation().features.is_empty());
    }

    #[test]
    fn test_count_pos_includes_terminal() {
        let mut doc = Document::new(DocumentId::new(1).unwrap(), "Мама мыла раму.");
        doc.set_sentences(vec![sentence()]);
        let freq = doc.count_pos();
        assert_eq!(freq.get(&UdPos::Noun), Some(&2));
        assert_eq!(freq.get(&UdPos::Verb), Some(&1));
        assert_eq!(freq.get(&UdPos::Punct), Some(&1));
    }

    #[test]
    fn test_set_sentences_replaces() {
        let mut doc = Document::new(DocumentId::new(2).unwrap(), "x");
        doc.set_sentences(vec![sentence(), sentence()]);
        doc.set_sentences(vec![sentence()]);
        assert_eq!(doc.sentences().len(), 1);
    }
}
