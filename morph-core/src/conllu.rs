//! # Serialização CONLL-U
//!
//! Renderizadores puros sobre o modelo de [`crate::document`]:
//!
//! - **Tabular**: dois comentários por sentença (`# sent_id = N`, `# text = ...`)
//!   e uma linha de 10 colunas por token. Com `include_features = false` a
//!   coluna FEATS é sempre `_` (variante "POS"); com `true` traz as features
//!   (variante "morfológica").
//! - **Texto limpo**: tokens em minúsculas, sem caracteres não-palavra,
//!   separados por um único espaço.
//!
//! E o caminho inverso, [`parse_conllu`], usado pela fase de frequências.
//!
//! ```text
//! # sent_id = 1
//! # text = Мама мыла раму.
//! 1	Мама	мама	NOUN	_	Animacy=Anim|Case=Nom|Gender=Fem|Number=Sing	0	root	_	_
//! ```

use crate::document::{ConlluSentence, ConlluToken, MorphologicalAnnotation};
use crate::error::ConlluError;
use crate::tokenizer::clean_word;
use crate::ud::{Features, UdPos};

/// Número de colunas de uma linha de token.
const COLUMNS: usize = 10;

impl ConlluToken {
    /// Linha tabular do token.
    pub fn conllu_line(&self, include_features: bool) -> String {
        let annotation = self.annotation();
        let feats = if include_features {
            annotation.features.to_string()
        } else {
            "_".to_string()
        };
        [
            self.position().to_string(),
            self.text().to_string(),
            annotation.lemma.clone(),
            annotation.pos.to_string(),
            "_".to_string(),
            feats,
            "0".to_string(),
            "root".to_string(),
            "_".to_string(),
            "_".to_string(),
        ]
        .join("\t")
    }

    /// Forma limpa: sem caracteres não-palavra, em minúsculas.
    pub fn cleaned(&self) -> String {
        clean_word(self.text())
    }
}

impl ConlluSentence {
    /// Bloco tabular da sentença (cabeçalhos + tokens), terminado em `\n`.
    pub fn to_conllu(&self, include_features: bool) -> String {
        let mut out = format!("# sent_id = {}\n# text = {}\n", self.position(), self.text());
        for token in self.tokens() {
            out.push_str(&token.conllu_line(include_features));
            out.push('\n');
        }
        out
    }

    /// Tokens limpos unidos por espaço; pontuação pura não contribui.
    pub fn cleaned(&self) -> String {
        self.tokens()
            .iter()
            .map(ConlluToken::cleaned)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Renderiza todas as sentenças, um bloco após o outro.
pub fn render_conllu(sentences: &[ConlluSentence], include_features: bool) -> String {
    sentences
        .iter()
        .map(|s| s.to_conllu(include_features))
        .collect()
}

/// Texto limpo do documento inteiro.
pub fn render_cleaned(sentences: &[ConlluSentence]) -> String {
    sentences
        .iter()
        .map(ConlluSentence::cleaned)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lê um artefato tabular de volta para sentenças.
pub fn parse_conllu(text: &str) -> Result<Vec<ConlluSentence>, ConlluError> {
    if text.trim().is_empty() {
        return Err(ConlluError::EmptyFile);
    }

    let mut sentences = Vec::new();
    let mut current: Option<(usize, String, Vec<ConlluToken>)> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        if let Some(id) = line.strip_prefix("# sent_id = ") {
            if let Some((position, text, tokens)) = current.take() {
                sentences.push(ConlluSentence::new(position, text, tokens));
            }
            let position = id.trim().parse().map_err(|_| ConlluError::Malformed {
                line: line_no,
                reason: format!("sent_id inválido: {id:?}"),
            })?;
            current = Some((position, String::new(), Vec::new()));
            continue;
        }

        let Some((_, sentence_text, tokens)) = current.as_mut() else {
            return Err(ConlluError::Malformed {
                line: line_no,
                reason: "conteúdo antes de '# sent_id'".to_string(),
            });
        };

        if let Some(raw) = line.strip_prefix("# text = ") {
            *sentence_text = raw.to_string();
        } else if line.starts_with('#') {
            continue;
        } else {
            tokens.push(parse_token_line(line, line_no)?);
        }
    }

    if let Some((position, text, tokens)) = current.take() {
        sentences.push(ConlluSentence::new(position, text, tokens));
    }
    Ok(sentences)
}

fn parse_token_line(line: &str, line_no: usize) -> Result<ConlluToken, ConlluError> {
    let malformed = |reason: String| ConlluError::Malformed { line: line_no, reason };

    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != COLUMNS {
        return Err(malformed(format!("esperava {COLUMNS} colunas, achou {}", columns.len())));
    }

    let position: usize = columns[0]
        .parse()
        .map_err(|_| malformed(format!("posição inválida: {:?}", columns[0])))?;
    let pos: UdPos = columns[3]
        .parse()
        .map_err(|raw| malformed(format!("UPOS desconhecida: {raw:?}")))?;
    let features = Features::parse(columns[5]).map_err(|e| match e {
        ConlluError::Malformed { reason, .. } => malformed(reason),
        other => other,
    })?;

    Ok(ConlluToken::new(
        columns[1],
        position,
        MorphologicalAnnotation::new(columns[2], pos, features),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(pairs: &[(&str, &str)]) -> Features {
        let mut f = Features::new();
        for (k, v) in pairs {
            f.insert(*k, *v);
        }
        f
    }

    fn sample() -> ConlluSentence {
        ConlluSentence::new(
            1,
            "Мама мыла раму.",
            vec![
                ConlluToken::new(
                    "Мама",
                    1,
                    MorphologicalAnnotation::new(
                        "мама",
                        UdPos::Noun,
                        features(&[("Number", "Sing"), ("Case", "Nom"), ("Gender", "Fem")]),
                    ),
                ),
                ConlluToken::new("мыла", 2, MorphologicalAnnotation::bare("мыть", UdPos::Verb)),
                ConlluToken::new("раму", 3, MorphologicalAnnotation::bare("рама", UdPos::Noun)),
                ConlluToken::terminal(4),
            ],
        )
    }

    #[test]
    fn test_token_line_with_and_without_features() {
        let sentence = sample();
        let token = &sentence.tokens()[0];
        assert_eq!(
            token.conllu_line(true),
            "1\tМама\tмама\tNOUN\t_\tCase=Nom|Gender=Fem|Number=Sing\t0\troot\t_\t_"
        );
        assert_eq!(token.conllu_line(false), "1\tМама\tмама\tNOUN\t_\t_\t0\troot\t_\t_");
    }

    #[test]
    fn test_sentence_block_layout() {
        let text = sample().to_conllu(false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# sent_id = 1");
        assert_eq!(lines[1], "# text = Мама мыла раму.");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "4\t.\t.\tPUNCT\t_\t_\t0\troot\t_\t_");
        assert!(text.ends_with('\n'));
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_renderer_is_idempotent() {
        let sentence = sample();
        assert_eq!(sentence.to_conllu(true), sentence.to_conllu(true));
        assert_eq!(sentence.to_conllu(false), sentence.to_conllu(false));
    }

    #[test]
    fn test_cleaned_skips_punctuation_tokens() {
        let sentence = ConlluSentence::new(
            1,
            "Привет, мир!",
            vec![
                ConlluToken::new("Привет,", 1, MorphologicalAnnotation::bare("привет", UdPos::Intj)),
                ConlluToken::new("мир", 2, MorphologicalAnnotation::bare("мир", UdPos::Noun)),
                ConlluToken::new("!", 3, MorphologicalAnnotation::bare("!", UdPos::Punct)),
            ],
        );
        assert_eq!(sentence.cleaned(), "привет мир");
    }

    #[test]
    fn test_render_cleaned_document() {
        let sentences = vec![sample(), sample()];
        assert_eq!(render_cleaned(&sentences), "мама мыла раму мама мыла раму");
    }

    #[test]
    fn test_round_trip_without_features() {
        let original = vec![sample()];
        let rendered = render_conllu(&original, false);
        let parsed = parse_conllu(&rendered).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].position(), 1);
        assert_eq!(parsed[0].text(), "Мама мыла раму.");
        for (a, b) in parsed[0].tokens().iter().zip(original[0].tokens()) {
            assert_eq!(a.position(), b.position());
            assert_eq!(a.text(), b.text());
            assert_eq!(a.annotation().lemma, b.annotation().lemma);
            assert_eq!(a.annotation().pos, b.annotation().pos);
        }
        assert_eq!(render_conllu(&parsed, false), rendered);
    }

    #[test]
    fn test_round_trip_keeps_features() {
        let rendered = render_conllu(&[sample()], true);
        let parsed = parse_conllu(&rendered).unwrap();
        assert_eq!(parsed, vec![sample()]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_conllu(""), Err(ConlluError::EmptyFile));
        assert!(matches!(
            parse_conllu("1\tx\tx\tNOUN\t_\t_\t0\troot\t_\t_\n"),
            Err(ConlluError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            parse_conllu("# sent_id = 1\n# text = x\n1\tx\tx\tNOUN\n"),
            Err(ConlluError::Malformed { line: 3, .. })
        ));
        assert!(matches!(
            parse_conllu("# sent_id = 1\n1\tx\tx\tFOO\t_\t_\t0\troot\t_\t_\n"),
            Err(ConlluError::Malformed { line: 2, .. })
        ));
    }
}
