//! # Motor de Alinhamento
//!
//! Casa a segmentação independente ([`crate::tokenizer`]) com o fluxo plano de
//! registros do analisador, que pode separar, juntar ou pular tokens de um
//! jeito diferente.
//!
//! ## Algoritmo
//!
//! Um único [`StreamCursor`] percorre o fluxo e **nunca volta**, nem na troca
//! de sentença. Para cada palavra da segmentação independente:
//!
//! 1. Enquanto o registro no cursor não for alfanumérico (separador,
//!    pontuação), avança sem consumir vaga de palavra.
//! 2. Consome o registro como análise da palavra e avança.
//! 3. Resolve a anotação por prioridade:
//!    - primeira análise candidata → conversor de tags;
//!    - palavra só de dígitos → `NUM`, lema = texto;
//!    - caso contrário → `X`, lema = texto.
//! 4. Anexa o token na próxima posição.
//!
//! Ao fim de cada sentença entra um ponto final sintético (`PUNCT`).
//!
//! Como o cursor é compartilhado entre sentenças, pontuação que atravessa a
//! fronteira (aspas antes do ponto, por exemplo) é consumida como separador em
//! vez de ser atribuída à primeira palavra da sentença seguinte.

use tracing::{debug, warn};

use crate::analyzer::AnalyzerRecord;
use crate::converter::TagConverter;
use crate::document::{ConlluSentence, ConlluToken, MorphologicalAnnotation};
use crate::error::{Error, Result};
use crate::tokenizer::{self, split_by_sentence};
use crate::ud::UdPos;

/// Posição no fluxo de registros do analisador.
///
/// É devolvido por [`AlignmentEngine::align_sentence`] e repassado à chamada
/// seguinte; só anda para frente.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct StreamCursor(usize);

impl StreamCursor {
    pub fn start() -> Self {
        Self(0)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    fn advance(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Alinha sentenças ao fluxo do analisador usando um conversor de tags.
#[derive(Debug, Clone)]
pub struct AlignmentEngine<C> {
    converter: C,
}

impl<C: TagConverter> AlignmentEngine<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Alinha o documento inteiro, sentença por sentença.
    ///
    /// Falha se o fluxo acabar antes da última palavra; nada é truncado.
    pub fn align_document(
        &self,
        text: &str,
        records: &[AnalyzerRecord<C::Tag>],
    ) -> Result<Vec<ConlluSentence>> {
        let mut cursor = StreamCursor::start();
        let mut sentences = Vec::new();

        for (index, sentence) in split_by_sentence(text).into_iter().enumerate() {
            let (aligned, next) = self.align_sentence(index + 1, &sentence, records, cursor)?;
            cursor = next;
            sentences.push(aligned);
        }

        debug!(
            sentences = sentences.len(),
            consumed = cursor.index(),
            records = records.len(),
            "documento alinhado"
        );
        Ok(sentences)
    }

    /// Alinha uma sentença a partir de `cursor` e devolve o cursor seguinte.
    pub fn align_sentence(
        &self,
        position: usize,
        sentence: &str,
        records: &[AnalyzerRecord<C::Tag>],
        cursor: StreamCursor,
    ) -> Result<(ConlluSentence, StreamCursor)> {
        let mut cursor = cursor;
        let mut tokens = Vec::new();

        for word in tokenizer::words(sentence) {
            let record = loop {
                let record = records.get(cursor.index()).ok_or_else(|| Error::AnalyzerExhausted {
                    sentence: position,
                    word: word.to_string(),
                })?;
                if record.is_alphanumeric() {
                    break record;
                }
                cursor = cursor.advance();
            };
            cursor = cursor.advance();

            let annotation = self.annotate(record);
            tokens.push(ConlluToken::new(record.text.clone(), tokens.len() + 1, annotation));
        }

        tokens.push(ConlluToken::terminal(tokens.len() + 1));
        Ok((ConlluSentence::new(position, sentence, tokens), cursor))
    }

    /// Política de três níveis; nunca falha.
    fn annotate(&self, record: &AnalyzerRecord<C::Tag>) -> MorphologicalAnnotation {
        if let Some(candidate) = record.first_candidate() {
            return match self.converter.convert_pos(&candidate.tag) {
                Ok(pos) => MorphologicalAnnotation::new(
                    candidate.lemma.clone(),
                    pos,
                    self.converter.convert_features(&candidate.tag),
                ),
                Err(error) => {
                    warn!(word = %record.text, %error, "tag não convertida, usando X");
                    MorphologicalAnnotation::bare(candidate.lemma.clone(), UdPos::X)
                }
            };
        }

        if tokenizer::is_numeric(&record.text) {
            MorphologicalAnnotation::bare(record.text.clone(), UdPos::Num)
        } else {
            MorphologicalAnnotation::bare(record.text.clone(), UdPos::X)
        }
    }
}
