//! # Segmentação Independente do Analisador
//!
//! Divide o texto bruto em sentenças e palavras com regras próprias, sem
//! depender do analisador. O motor de alinhamento ([`crate::align`]) depois
//! casa esta segmentação com o fluxo de registros do analisador.
//!
//! ## Regras
//!
//! - **Sentença**: termina em `.`, `!` ou `?` seguido de espaço em branco e de
//!   uma letra maiúscula ou dígito, ou no fim do documento.
//! - **Palavra**: sequência máxima de caracteres de palavra (`\w+`).
//! - **Entrada do analisador**: o texto inteiro com cada sequência de
//!   caracteres não-palavra reduzida a um único espaço.
//!
//! ```rust
//! use morph_core::tokenizer::{split_by_sentence, words};
//!
//! let sentences = split_by_sentence("Мама мыла раму. Папа читал газету!");
//! assert_eq!(sentences, vec!["Мама мыла раму.", "Папа читал газету!"]);
//! assert_eq!(words(&sentences[0]), vec!["Мама", "мыла", "раму"]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("regex válida"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("regex válida"));

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Divide o texto em sentenças.
///
/// Quebras de linha e espaços repetidos dentro de uma sentença viram um único
/// espaço, para que o cabeçalho `# text =` caiba numa linha.
pub fn split_by_sentence(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut current_start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (byte_pos, ch) = chars[i];
        if !is_terminator(ch) {
            i += 1;
            continue;
        }

        // Precisa de pelo menos um espaço depois do terminador
        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        let has_gap = j > i + 1;
        let next_opens_sentence = chars
            .get(j)
            .map(|(_, c)| c.is_uppercase() || c.is_numeric())
            .unwrap_or(false);

        if has_gap && next_opens_sentence {
            let end = byte_pos + ch.len_utf8();
            flush_sentence(&mut sentences, &text[current_start..end]);
            current_start = chars[j].0;
            i = j;
        } else {
            i += 1;
        }
    }

    flush_sentence(&mut sentences, &text[current_start..]);
    sentences
}

/// Normaliza e adiciona a sentença (se não vazia)
fn flush_sentence(sentences: &mut Vec<String>, raw: &str) {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        sentences.push(normalized);
    }
}

/// Palavras da sentença, na ordem em que aparecem.
pub fn words(sentence: &str) -> Vec<&str> {
    WORD.find_iter(sentence).map(|m| m.as_str()).collect()
}

/// Texto enviado ao analisador: só caracteres de palavra e separadores simples.
pub fn normalize_for_analyzer(text: &str) -> String {
    NON_WORD.replace_all(text, " ").into_owned()
}

/// Remove caracteres não-palavra e passa para minúsculas.
pub fn clean_word(text: &str) -> String {
    NON_WORD.replace_all(text, "").to_lowercase()
}

/// `true` para texto não vazio composto só de letras e dígitos.
pub fn is_alphanumeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_alphanumeric)
}

/// `true` para texto não vazio composto só de dígitos decimais `0-9`.
///
/// Numerais romanos (`Ⅻ`) casam com `\w` mas não contam.
pub fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}
